use crate::error::ForwardError;
use crate::forward::{Forwarder, ToolReply};
use crate::tool::ToolRegistry;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// MCP server speaking newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    registry: ToolRegistry,
    forwarder: Forwarder,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, forwarder: Forwarder) -> Self {
        for problem in forwarder.config().problems() {
            tracing::warn!("{problem}; tool calls will fail until this is fixed");
        }
        Self {
            registry,
            forwarder,
        }
    }

    pub async fn serve_stdio(self: Arc<Self>) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Reads one message per line. Each request runs on its own task and
    /// responses are written as they complete.
    pub async fn serve<R, W>(self: Arc<Self>, input: R, output: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!(
            "Serving {} tools for {}",
            self.registry.len(),
            self.forwarder.config().service_name
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let writer = tokio::spawn(async move {
            let mut output = output;
            while let Some(message) = rx.recv().await {
                let mut line = message.to_string();
                line.push('\n');
                output.write_all(line.as_bytes()).await?;
                output.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(input).lines();
        let mut tasks = JoinSet::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = Arc::clone(&self);
            let tx = tx.clone();
            tasks.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    let _ = tx.send(response);
                }
            });
            reap_finished(&mut tasks);
        }

        while tasks.join_next().await.is_some() {}
        drop(tx);

        writer.await.map_err(std::io::Error::other)?
    }

    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => Some(error_response(
                Value::Null,
                RpcError::parse_error(format!("Parse error: {e}")),
            )),
        }
    }

    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        if let Some(batch) = message.as_array() {
            if batch.is_empty() {
                return Some(error_response(
                    Value::Null,
                    RpcError::invalid_request("Batch request must not be empty"),
                ));
            }
            let mut responses = Vec::new();
            for item in batch {
                if let Some(response) = self.handle_single(item.clone()).await {
                    responses.push(response);
                }
            }
            return (!responses.is_empty()).then_some(Value::Array(responses));
        }
        self.handle_single(message).await
    }

    async fn handle_single(&self, message: Value) -> Option<Value> {
        let Some(obj) = message.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        let id = obj.get("id").cloned();
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        // Responses to requests we never send.
        let method = obj.get("method").and_then(Value::as_str)?;

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        let Some(id) = id else {
            tracing::debug!("Ignoring notification {method}");
            return None;
        };

        Some(match self.handle_request(method, params).await {
            Ok(result) => success_response(id, result),
            Err(error) => error_response(id, error),
        })
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.registry.list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        let config = self.forwarder.config();
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": config.service_name,
                "version": config.version,
            }
        })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let CallParams { name, arguments } = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("Invalid tools/call params: {e}")))?;

        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        let reply = match self.registry.get(&name) {
            Some(tool) => self.forwarder.invoke(tool, &args).await,
            None => ToolReply::failure(ForwardError::UnknownTool(name).to_string()),
        };

        Ok(call_result(reply))
    }
}

/// Drops completed request tasks so a long session does not accumulate them.
fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while tasks.try_join_next().is_some() {
        reaped += 1;
    }
    reaped
}

fn call_result(reply: ToolReply) -> Value {
    let mut result = json!({
        "content": [{ "type": "text", "text": reply.text }],
        "isError": reply.is_error,
    });
    if let Some(structured) = reply.structured {
        result["structuredContent"] = structured;
    }
    result
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthDefaults;
    use crate::config::{ServerConfig, ServiceDescriptor};
    use crate::http_method::HttpMethod;
    use crate::tool::ToolDefinition;

    const SERVICE: ServiceDescriptor = ServiceDescriptor {
        name: "api-example-com",
        version: "0.1.0",
        env_prefix: "API_EXAMPLE_COM",
        default_base_url: "http://127.0.0.1:9",
        auth: AuthDefaults::NONE,
    };

    fn server() -> McpServer {
        let config = ServerConfig::from_lookup(&SERVICE, |_| None);
        McpServer::new(
            ToolRegistry::new(vec![ToolDefinition::new(
                "get_health",
                HttpMethod::GET,
                "/health",
            )]),
            Forwarder::new(config),
        )
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_initialize() {
        let response = block_on(server().handle_line(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        ))
        .unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "api-example-com");
    }

    #[test]
    fn test_tools_list() {
        let response = block_on(
            server().handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#),
        )
        .unwrap();
        assert_eq!(response["result"]["tools"][0]["name"], "get_health");
    }

    #[test]
    fn test_notification_has_no_response() {
        let response = block_on(
            server().handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
        );
        assert!(response.is_none());
    }

    #[test]
    fn test_unknown_method_and_parse_error() {
        let response = block_on(
            server().handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#),
        )
        .unwrap();
        assert_eq!(response["error"]["code"], -32601);

        let response = block_on(server().handle_line("{not json")).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);
    }

    #[test]
    fn test_unknown_tool_is_tool_error() {
        let response = block_on(server().handle_line(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope"}}"#,
        ))
        .unwrap();
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(response["result"]["content"][0]["text"], "Unknown tool: nope");
    }

    #[test]
    fn test_finished_tasks_are_reaped() {
        block_on(async {
            let mut tasks = JoinSet::new();
            for _ in 0..3 {
                tasks.spawn(async {});
            }
            let mut reaped = 0;
            while reaped < 3 {
                tokio::task::yield_now().await;
                reaped += reap_finished(&mut tasks);
            }
            assert_eq!(reaped, 3);
            assert!(tasks.is_empty());

            let (release, wait) = tokio::sync::oneshot::channel::<()>();
            tasks.spawn(async move {
                let _ = wait.await;
            });
            assert_eq!(reap_finished(&mut tasks), 0);
            assert_eq!(tasks.len(), 1);
            let _ = release.send(());
            while tasks.join_next().await.is_some() {}
        });
    }

    #[test]
    fn test_bad_arguments_are_invalid_params() {
        let response = block_on(server().handle_line(
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"get_health","arguments":[1]}}"#,
        ))
        .unwrap();
        assert_eq!(response["error"]["code"], -32602);
    }
}
