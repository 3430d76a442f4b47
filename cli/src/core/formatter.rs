use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Human-readable rendering used by the text output format.
pub trait TextReport {
    fn render_text(&self) -> String;
}

pub struct Formatter {
    engine: OutputFormat,
}

impl Formatter {
    pub fn new(engine: OutputFormat) -> Self {
        Self { engine }
    }

    pub fn format<T: Serialize + TextReport>(&self, model: &T) -> String {
        match self.engine {
            OutputFormat::Text => model.render_text(),
            OutputFormat::Json => serde_json::to_string_pretty(model).unwrap_or_default(),
        }
    }
}

/// Renders a JSON value as an indented outline, one scalar per line.
pub fn render_value(value: &Value, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match value {
        Value::Null => format!("{pad}null\n"),
        Value::Bool(b) => format!("{pad}{b}\n"),
        Value::Number(n) => format!("{pad}{n}\n"),
        Value::String(s) => s.lines().map(|line| format!("{pad}{line}\n")).collect(),
        Value::Array(arr) => {
            let mut s = String::new();
            for item in arr {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        s.push_str(&format!("{pad}-\n"));
                        s.push_str(&render_value(item, indent + 2));
                    }
                    _ => {
                        let rendered = render_value(item, 0);
                        s.push_str(&format!("{}- {}\n", pad, rendered.trim_end()));
                    }
                }
            }
            s
        }
        Value::Object(map) => {
            let mut s = String::new();
            for (k, v) in map {
                match v {
                    Value::Array(_) | Value::Object(_) => {
                        s.push_str(&format!("{pad}{k}:\n"));
                        s.push_str(&render_value(v, indent + 2));
                    }
                    Value::String(str_val) => s.push_str(&format!("{pad}{k}: {str_val}\n")),
                    value => s.push_str(&format!("{pad}{k}: {value}\n")),
                }
            }
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        name: String,
    }

    impl TextReport for Sample {
        fn render_text(&self) -> String {
            format!("Sample {}\n", self.name)
        }
    }

    #[test]
    fn test_format_text_and_json() {
        let sample = Sample {
            name: "canvas".to_string(),
        };
        assert_eq!(
            Formatter::new(OutputFormat::Text).format(&sample),
            "Sample canvas\n"
        );
        let json: Value =
            serde_json::from_str(&Formatter::new(OutputFormat::Json).format(&sample)).unwrap();
        assert_eq!(json, json!({"name": "canvas"}));
    }

    #[test]
    fn test_render_value_outline() {
        let value = json!({"id": 1, "tags": ["a", "b"], "owner": {"name": "x"}});
        let text = render_value(&value, 2);
        assert!(text.contains("  id: 1\n"));
        assert!(text.contains("  tags:\n    - a\n    - b\n"));
        assert!(text.contains("  owner:\n    name: x\n"));
    }
}
