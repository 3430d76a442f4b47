use crate::config::ServerConfig;
use crate::error::{ConfigError, ForwardError};
use crate::tool::{BodyEncoding, BodySpec, ParamSpec, ParamType, ToolDefinition};
use serde_json::{json, Map, Value};

/// Result of one tool invocation as the assistant sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub text: String,
    pub structured: Option<Value>,
    pub is_error: bool,
}

impl ToolReply {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            structured: None,
            is_error: true,
        }
    }

    fn success(status: reqwest::StatusCode, body: String) -> Self {
        if body.trim().is_empty() {
            return Self {
                text: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
                structured: None,
                is_error: false,
            };
        }

        let structured = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Some(Value::Object(map)),
            Ok(other) => Some(json!({ "result": other })),
            Err(_) => None,
        };

        Self {
            text: body,
            structured,
            is_error: false,
        }
    }
}

enum Payload {
    Json(Value),
    Form(Vec<(String, String)>),
    Raw(String),
}

pub struct Forwarder {
    http: reqwest::Client,
    config: ServerConfig,
}

impl Forwarder {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Performs exactly one upstream request. Every failure is folded into an
    /// error reply carrying a readable message.
    pub async fn invoke(&self, tool: &ToolDefinition, args: &Map<String, Value>) -> ToolReply {
        match self.execute(tool, args).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {e}", tool.name);
                ToolReply::failure(e.to_string())
            }
        }
    }

    async fn execute(
        &self,
        tool: &ToolDefinition,
        args: &Map<String, Value>,
    ) -> Result<ToolReply, ForwardError> {
        let base_url = self.config.base_url.clone()?;
        let timeout = self.config.timeout.clone()?;
        let credentials = self.config.credentials.as_ref().map_err(ConfigError::clone)?;

        validate_arguments(tool, args)?;

        let mut url = build_url(&base_url, tool, args)?;
        {
            let mut pairs = url.query_pairs_mut();
            for param in &tool.query_params {
                let Some(value) = present(args, param) else {
                    continue;
                };
                match value {
                    Value::Array(items) => {
                        for item in items {
                            pairs.append_pair(&param.wire_name, &scalar_text(item));
                        }
                    }
                    other => {
                        pairs.append_pair(&param.wire_name, &scalar_text(other));
                    }
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let payload = match &tool.body {
            Some(body) => Some(build_payload(body, args)?),
            None => None,
        };

        let headers = vec![(
            reqwest::header::ACCEPT.as_str().to_string(),
            "application/json".to_string(),
        )];
        let (url, headers) = credentials.configure(&self.http, url, headers).await?;

        tracing::debug!("Forwarding tool '{}' as {} {}", tool.name, tool.method, url);

        let mut request = self
            .http
            .request(tool.method.to_reqwest_method(), url)
            .header(
                reqwest::header::USER_AGENT,
                format!("{}/{}", self.config.service_name, self.config.version),
            )
            .timeout(timeout);

        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }

        request = match payload {
            Some(Payload::Json(value)) => request.json(&value),
            Some(Payload::Form(fields)) => request.form(&fields),
            Some(Payload::Raw(text)) => {
                let request = if serde_json::from_str::<Value>(&text).is_ok() {
                    request.header(reqwest::header::CONTENT_TYPE, "application/json")
                } else {
                    request
                };
                request.body(text)
            }
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Tool '{}' received HTTP {}", tool.name, status.as_u16());

        if !status.is_success() {
            return Err(ForwardError::from_status(status, &body));
        }

        Ok(ToolReply::success(status, body))
    }
}

fn present<'a>(args: &'a Map<String, Value>, param: &ParamSpec) -> Option<&'a Value> {
    args.get(&param.name).filter(|v| !v.is_null())
}

fn validate_arguments(tool: &ToolDefinition, args: &Map<String, Value>) -> Result<(), ForwardError> {
    for param in tool.all_params() {
        match present(args, param) {
            None if param.required => {
                return Err(ForwardError::MissingParameter(param.name.clone()));
            }
            None => {}
            Some(value) => check_type(param, value)?,
        }
    }
    Ok(())
}

fn check_type(param: &ParamSpec, value: &Value) -> Result<(), ForwardError> {
    let ok = match (param.param_type, value) {
        (ParamType::Number, Value::Number(_)) => true,
        (ParamType::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
        (ParamType::Boolean, Value::Bool(_)) => true,
        (ParamType::Boolean, Value::String(s)) => matches!(s.as_str(), "true" | "false"),
        (ParamType::String, Value::Object(_)) => false,
        (ParamType::String, _) => true,
        (_, Value::Array(items)) => items.iter().all(|item| {
            check_type(param, item).is_ok() && !matches!(item, Value::Array(_))
        }),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ForwardError::InvalidParameter {
            name: param.name.clone(),
            expected: param.param_type.as_str(),
        })
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Appends the template's segments to the base URL path, substituting
/// `{placeholder}` segments from the path parameters in order.
fn build_url(
    base_url: &reqwest::Url,
    tool: &ToolDefinition,
    args: &Map<String, Value>,
) -> Result<reqwest::Url, ForwardError> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);

    let mut path_params = tool.path_params.iter();
    let mut segments = Vec::new();
    for segment in tool.path_template.split('/').skip(1) {
        if segment.starts_with('{') && segment.ends_with('}') {
            let param = path_params
                .next()
                .ok_or_else(|| ForwardError::InvalidUrl(tool.path_template.clone()))?;
            let value = present(args, param)
                .ok_or_else(|| ForwardError::MissingParameter(param.name.clone()))?;
            segments.push(scalar_text(value));
        } else {
            // Template literals arrive percent-encoded; `extend` encodes again.
            let literal = urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            segments.push(literal);
        }
    }

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ForwardError::InvalidUrl(base_url.to_string()))?;
        path.pop_if_empty();
        path.extend(segments.iter().map(String::as_str));
    }

    Ok(url)
}

fn build_payload(body: &BodySpec, args: &Map<String, Value>) -> Result<Payload, ForwardError> {
    match body.encoding {
        BodyEncoding::Json => {
            let mut object = Map::new();
            for param in &body.params {
                let Some(value) = present(args, param) else {
                    continue;
                };
                object.insert(param.wire_name.clone(), json_value(param, value)?);
            }
            Ok(Payload::Json(Value::Object(object)))
        }
        BodyEncoding::Form => Ok(Payload::Form(
            body.params
                .iter()
                .filter_map(|param| {
                    present(args, param).map(|v| (param.wire_name.clone(), scalar_text(v)))
                })
                .collect(),
        )),
        BodyEncoding::Raw => Ok(Payload::Raw(
            body.params
                .first()
                .and_then(|param| present(args, param))
                .map(scalar_text)
                .unwrap_or_default(),
        )),
    }
}

fn json_value(param: &ParamSpec, value: &Value) -> Result<Value, ForwardError> {
    match (param.param_type, value) {
        (ParamType::String, Value::String(s)) if param.json_encoded => serde_json::from_str(s)
            .map_err(|_| ForwardError::InvalidParameter {
                name: param.name.clone(),
                expected: "JSON-encoded string",
            }),
        (ParamType::Number, Value::String(s)) => Ok(s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| s.trim().parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| value.clone())),
        (ParamType::Boolean, Value::String(s)) => Ok(Value::Bool(s == "true")),
        _ => Ok(value.clone()),
    }
}
