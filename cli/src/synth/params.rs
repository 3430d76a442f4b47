use crate::model::naming::{sanitize_identifier, NameAllocator};
use crate::model::{ApiEndpoint, BodyExample};
use mcpgen_proxy::{BodySpec, ParamSpec, ParamType, ToolDefinition};
use serde_json::Value;

const MAX_LISTED_FIELDS: usize = 8;

/// Argument names shared by every parameter of one tool.
struct ArgumentNames {
    names: NameAllocator,
}

impl ArgumentNames {
    fn new() -> Self {
        Self {
            names: NameAllocator::new(),
        }
    }

    /// Sanitized wire name, or `<prefix>_<name>` when another category
    /// already uses it.
    fn claim(&mut self, wire_name: &str, prefix: Option<&str>) -> String {
        let base = sanitize_identifier(wire_name);
        match prefix {
            Some(prefix) if self.names.is_taken(&base) => {
                self.names.allocate(&format!("{prefix}_{base}"))
            }
            _ => self.names.allocate(&base),
        }
    }
}

/// Runtime tool definition for an endpoint.
pub fn tool_definition(endpoint: &ApiEndpoint) -> ToolDefinition {
    let mut names = ArgumentNames::new();
    let mut tool = ToolDefinition::new(&endpoint.tool_name, endpoint.method, &endpoint.path)
        .describe(&describe(endpoint));

    for param in &endpoint.path_parameters {
        let name = names.claim(&param.name, None);
        let description = format!("{} (example: {})", param.kind.describe(), param.example);
        tool = tool.path_param(ParamSpec::required(&name, ParamType::String, &description).wire(&param.name));
    }

    for (wire_name, examples) in &endpoint.query_parameters {
        let name = names.claim(wire_name, Some("query"));
        tool = tool.query_param(
            ParamSpec::optional(&name, infer_type(examples), &query_description(wire_name, examples))
                .wire(wire_name),
        );
    }

    if let Some(body) = endpoint.request_body.as_ref().filter(|_| endpoint.has_request_body) {
        tool = tool.body(body_spec(body, &mut names));
    }

    tool
}

fn describe(endpoint: &ApiEndpoint) -> String {
    let mut description = format!("{} {}", endpoint.method, endpoint.path);
    if let Some(Value::Object(fields)) = &endpoint.response_example {
        if !fields.is_empty() {
            let listed: Vec<&str> = fields.keys().take(MAX_LISTED_FIELDS).map(String::as_str).collect();
            let more = if fields.len() > MAX_LISTED_FIELDS { ", ..." } else { "" };
            description.push_str(&format!(". Returns an object with {}{more}", listed.join(", ")));
        }
    } else if let Some(Value::Array(_)) = &endpoint.response_example {
        description.push_str(". Returns a list");
    }
    description
}

fn query_description(wire_name: &str, examples: &[String]) -> String {
    if examples.is_empty() {
        format!("Query parameter {wire_name}")
    } else {
        format!("Query parameter {wire_name} (examples: {})", examples.join(", "))
    }
}

/// Number when every example is numeric, boolean when every example is
/// `true`/`false`, otherwise string.
pub fn infer_type(examples: &[String]) -> ParamType {
    let non_empty: Vec<&str> = examples
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if non_empty.is_empty() {
        ParamType::String
    } else if non_empty.iter().all(|e| e.parse::<f64>().is_ok_and(f64::is_finite)) {
        ParamType::Number
    } else if non_empty
        .iter()
        .all(|e| e.eq_ignore_ascii_case("true") || e.eq_ignore_ascii_case("false"))
    {
        ParamType::Boolean
    } else {
        ParamType::String
    }
}

fn body_spec(body: &BodyExample, names: &mut ArgumentNames) -> BodySpec {
    match body {
        BodyExample::Json(Value::Object(fields)) => BodySpec::json(
            fields
                .iter()
                .map(|(field, value)| json_field(field, value, names))
                .collect(),
        ),
        BodyExample::Form(fields) => {
            let mut params: Vec<ParamSpec> = Vec::new();
            for (field, _) in fields {
                if params.iter().any(|p| &p.wire_name == field) {
                    continue;
                }
                let name = names.claim(field, Some("body"));
                params.push(
                    ParamSpec::optional(&name, ParamType::String, &format!("Form field {field}"))
                        .wire(field),
                );
            }
            BodySpec::form(params)
        }
        BodyExample::Json(_) | BodyExample::Raw(_) => {
            let name = names.claim("body", Some("body"));
            BodySpec::raw(
                ParamSpec::required(&name, ParamType::String, "Raw request body").wire("body"),
            )
        }
    }
}

fn json_field(field: &str, value: &Value, names: &mut ArgumentNames) -> ParamSpec {
    let name = names.claim(field, Some("body"));
    let (param_type, nested) = match value {
        Value::Number(_) => (ParamType::Number, false),
        Value::Bool(_) => (ParamType::Boolean, false),
        Value::String(_) | Value::Null => (ParamType::String, false),
        Value::Array(_) | Value::Object(_) => (ParamType::String, true),
    };
    if nested {
        ParamSpec::optional(&name, param_type, &format!("Body field {field}, as a JSON-encoded string"))
            .wire(field)
            .json_encoded()
    } else {
        ParamSpec::optional(&name, param_type, &format!("Body field {field}")).wire(field)
    }
}
