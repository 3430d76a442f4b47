use crate::http_method::HttpMethod;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// One tool argument. `name` is what the assistant sends, `wire_name` is what
/// goes on the wire (path placeholder, query key or body field).
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub wire_name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
    pub json_encoded: bool,
}

impl ParamSpec {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            wire_name: name.to_string(),
            param_type,
            required: true,
            description: description.to_string(),
            json_encoded: false,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn wire(mut self, wire_name: &str) -> Self {
        self.wire_name = wire_name.to_string();
        self
    }

    /// The string argument carries JSON that is decoded before it is sent.
    pub fn json_encoded(mut self) -> Self {
        self.json_encoded = true;
        self
    }

    fn schema(&self) -> Value {
        json!({
            "type": self.param_type.as_str(),
            "description": self.description,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub encoding: BodyEncoding,
    pub params: Vec<ParamSpec>,
}

impl BodySpec {
    pub fn json(params: Vec<ParamSpec>) -> Self {
        Self {
            encoding: BodyEncoding::Json,
            params,
        }
    }

    pub fn form(params: Vec<ParamSpec>) -> Self {
        Self {
            encoding: BodyEncoding::Form,
            params,
        }
    }

    pub fn raw(param: ParamSpec) -> Self {
        Self {
            encoding: BodyEncoding::Raw,
            params: vec![param],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub method: HttpMethod,
    pub path_template: String,
    pub path_params: Vec<ParamSpec>,
    pub query_params: Vec<ParamSpec>,
    pub body: Option<BodySpec>,
}

impl ToolDefinition {
    pub fn new(name: &str, method: HttpMethod, path_template: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{} {}", method.as_str(), path_template),
            method,
            path_template: path_template.to_string(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn path_param(mut self, param: ParamSpec) -> Self {
        self.path_params.push(param);
        self
    }

    pub fn query_param(mut self, param: ParamSpec) -> Self {
        self.query_params.push(param);
        self
    }

    pub fn body(mut self, body: BodySpec) -> Self {
        self.body = Some(body);
        self
    }

    pub fn all_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.path_params
            .iter()
            .chain(self.query_params.iter())
            .chain(self.body.iter().flat_map(|b| b.params.iter()))
    }

    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in self.all_params() {
            properties.insert(param.name.clone(), param.schema());
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn list_payload(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }
}
