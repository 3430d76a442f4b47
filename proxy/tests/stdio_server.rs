use mcpgen_proxy::{
    AuthDefaults, Forwarder, HttpMethod, McpServer, ParamSpec, ParamType, ServerConfig,
    ServiceDescriptor, ToolDefinition, ToolRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE: ServiceDescriptor = ServiceDescriptor {
    name: "api-example-com",
    version: "0.1.0",
    env_prefix: "API_EXAMPLE_COM",
    default_base_url: "http://127.0.0.1:9",
    auth: AuthDefaults::NONE,
};

fn server(base_url: String) -> Arc<McpServer> {
    let config = ServerConfig::from_lookup(&SERVICE, move |name| {
        (name == "API_EXAMPLE_COM_BASE_URL").then(|| base_url.clone())
    });
    let registry = ToolRegistry::new(vec![
        ToolDefinition::new("get_api_items_id", HttpMethod::GET, "/api/items/{id}").path_param(
            ParamSpec::required("id", ParamType::String, "Path parameter"),
        ),
    ]);
    Arc::new(McpServer::new(registry, Forwarder::new(config)))
}

async fn run_lines(server: Arc<McpServer>, requests: &[Value]) -> Vec<Value> {
    let mut input = Vec::new();
    for request in requests {
        input.extend_from_slice(request.to_string().as_bytes());
        input.push(b'\n');
    }

    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    server.serve(input.as_slice(), writer).await.unwrap();

    let mut output = String::new();
    reader.read_to_string(&mut output).await.unwrap();

    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("no response with id {id} in {responses:?}"))
}

#[tokio::test]
async fn test_stdio_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/items/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/items/8"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let responses = run_lines(
        server(mock_server.uri()),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "get_api_items_id", "arguments": {"id": "7"}}}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                   "params": {"name": "get_api_items_id", "arguments": {"id": "8"}}}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);

    let init = by_id(&responses, 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "api-example-com");

    let list = by_id(&responses, 2);
    assert_eq!(
        list["result"]["tools"][0]["inputSchema"]["required"],
        json!(["id"])
    );

    let ok = by_id(&responses, 3);
    assert_eq!(ok["result"]["isError"], false);
    assert_eq!(ok["result"]["structuredContent"], json!({"id": 7}));

    let failed = by_id(&responses, 4);
    assert_eq!(failed["result"]["isError"], true);
    let text = failed["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("500"), "got: {text}");
}
