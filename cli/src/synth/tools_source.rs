use mcpgen_proxy::{BodyEncoding, ParamSpec, ParamType, ToolDefinition};

const INDENT: &str = "    ";

/// Renders `src/tools.rs`: one builder chain per tool, in endpoint order.
pub fn render(tools: &[ToolDefinition]) -> String {
    let uses_params = tools.iter().any(|t| t.all_params().next().is_some());
    let uses_body = tools.iter().any(|t| t.body.is_some());

    let mut tool_imports = Vec::new();
    if uses_body {
        tool_imports.push("BodySpec");
    }
    if uses_params {
        tool_imports.push("ParamSpec");
        tool_imports.push("ParamType");
    }
    tool_imports.push("ToolDefinition");

    let mut out = String::new();
    out.push_str("use crate::http_method::HttpMethod;\n");
    if tool_imports.len() == 1 {
        out.push_str("use crate::tool::ToolDefinition;\n");
    } else {
        out.push_str(&format!("use crate::tool::{{{}}};\n", tool_imports.join(", ")));
    }
    out.push('\n');
    out.push_str("pub fn all() -> Vec<ToolDefinition> {\n");
    out.push_str(&format!("{INDENT}vec![\n"));
    for tool in tools {
        out.push_str(&render_tool(tool));
    }
    out.push_str(&format!("{INDENT}]\n"));
    out.push_str("}\n");
    out
}

fn render_tool(tool: &ToolDefinition) -> String {
    let outer = INDENT.repeat(2);
    let inner = INDENT.repeat(3);

    let mut out = format!(
        "{outer}ToolDefinition::new({:?}, HttpMethod::{}, {:?})\n",
        tool.name,
        tool.method.as_str(),
        tool.path_template
    );
    out.push_str(&format!("{inner}.describe({:?})\n", tool.description));
    for param in &tool.path_params {
        out.push_str(&format!("{inner}.path_param({})\n", render_param(param)));
    }
    for param in &tool.query_params {
        out.push_str(&format!("{inner}.query_param({})\n", render_param(param)));
    }
    if let Some(body) = &tool.body {
        let params: Vec<String> = body.params.iter().map(render_param).collect();
        let spec = match body.encoding {
            BodyEncoding::Json => format!("BodySpec::json(vec![{}])", params.join(", ")),
            BodyEncoding::Form => format!("BodySpec::form(vec![{}])", params.join(", ")),
            BodyEncoding::Raw => format!("BodySpec::raw({})", params.join(", ")),
        };
        out.push_str(&format!("{inner}.body({spec})\n"));
    }
    // Drop the trailing newline so the comma closes the chain.
    out.pop();
    out.push_str(",\n");
    out
}

fn render_param(param: &ParamSpec) -> String {
    let constructor = if param.required { "required" } else { "optional" };
    let mut out = format!(
        "ParamSpec::{constructor}({:?}, ParamType::{}, {:?})",
        param.name,
        param_type(param.param_type),
        param.description
    );
    if param.wire_name != param.name {
        out.push_str(&format!(".wire({:?})", param.wire_name));
    }
    if param.json_encoded {
        out.push_str(".json_encoded()");
    }
    out
}

fn param_type(param_type: ParamType) -> &'static str {
    match param_type {
        ParamType::String => "String",
        ParamType::Number => "Number",
        ParamType::Boolean => "Boolean",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgen_proxy::{BodySpec, HttpMethod};

    #[test]
    fn test_render_without_params() {
        let source = render(&[ToolDefinition::new("get_health", HttpMethod::GET, "/health")]);
        assert_eq!(
            source,
            "use crate::http_method::HttpMethod;\n\
             use crate::tool::ToolDefinition;\n\
             \n\
             pub fn all() -> Vec<ToolDefinition> {\n    vec![\n        \
             ToolDefinition::new(\"get_health\", HttpMethod::GET, \"/health\")\n            \
             .describe(\"GET /health\"),\n    ]\n}\n"
        );
    }

    #[test]
    fn test_render_params_and_body() {
        let tool = ToolDefinition::new("create_api_notes", HttpMethod::POST, "/api/notes/{id}")
            .path_param(ParamSpec::required("id", ParamType::String, "Numeric identifier"))
            .query_param(
                ParamSpec::optional("include", ParamType::String, "Query \"include\"").wire("include[]"),
            )
            .body(BodySpec::json(vec![ParamSpec::optional(
                "tags",
                ParamType::String,
                "Body field tags",
            )
            .json_encoded()]));
        let source = render(&[tool]);
        assert!(source.contains("use crate::tool::{BodySpec, ParamSpec, ParamType, ToolDefinition};"));
        assert!(source.contains(
            ".path_param(ParamSpec::required(\"id\", ParamType::String, \"Numeric identifier\"))"
        ));
        assert!(source.contains(".wire(\"include[]\")"));
        assert!(source.contains("\"Query \\\"include\\\"\""));
        assert!(source.contains(
            ".body(BodySpec::json(vec![ParamSpec::optional(\"tags\", ParamType::String, \"Body field tags\").json_encoded()])),"
        ));
    }
}
