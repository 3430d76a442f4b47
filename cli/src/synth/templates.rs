use crate::classify::AuthPattern;
use crate::core::version::generator_banner;
use crate::model::ServiceInfo;
use crate::synth::runtime;
use mcpgen_proxy::config::DEFAULT_TIMEOUT_SECS;
use mcpgen_proxy::{KeyLocation, ParamSpec, ToolDefinition};

/// One environment variable read by a generated server.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvVar {
    pub name: String,
    pub required: bool,
    pub default: Option<String>,
    pub description: &'static str,
}

impl EnvVar {
    fn required(prefix: &str, suffix: &str, description: &'static str) -> Self {
        Self {
            name: format!("{prefix}_{suffix}"),
            required: true,
            default: None,
            description,
        }
    }

    fn optional(prefix: &str, suffix: &str, default: Option<String>, description: &'static str) -> Self {
        Self {
            required: false,
            default,
            ..Self::required(prefix, suffix, description)
        }
    }
}

pub fn env_vars(service: &ServiceInfo) -> Vec<EnvVar> {
    let p = service.env_prefix();
    let mut vars = vec![
        EnvVar::optional(&p, "BASE_URL", service.base_url.clone(), "Upstream API base URL"),
        EnvVar::optional(
            &p,
            "TIMEOUT_SECS",
            Some(DEFAULT_TIMEOUT_SECS.to_string()),
            "Upstream request timeout in seconds",
        ),
        EnvVar::optional(
            &p,
            "AUTH_TYPE",
            Some(service.auth.kind().as_str().to_string()),
            "Authentication scheme",
        ),
    ];

    match &service.auth {
        AuthPattern::None => {}
        AuthPattern::ApiKey { name, location } => {
            vars.push(EnvVar::required(&p, "API_KEY", "API key value"));
            vars.push(EnvVar::optional(&p, "API_KEY_NAME", Some(name.clone()), "Header or query parameter carrying the key"));
            vars.push(EnvVar::optional(
                &p,
                "API_KEY_LOCATION",
                Some(location.as_str().to_string()),
                "Where the key is sent: header or query",
            ));
        }
        AuthPattern::Bearer => {
            vars.push(EnvVar::required(&p, "BEARER_TOKEN", "Bearer token"));
        }
        AuthPattern::Basic => {
            vars.push(EnvVar::required(&p, "BASIC_USERNAME", "Basic auth user name"));
            vars.push(EnvVar::required(&p, "BASIC_PASSWORD", "Basic auth password"));
        }
        AuthPattern::CustomHeader { name } => {
            vars.push(EnvVar::required(&p, "CUSTOM_HEADER_VALUE", "Credential header value"));
            vars.push(EnvVar::optional(&p, "CUSTOM_HEADER_NAME", Some(name.clone()), "Credential header name"));
        }
        AuthPattern::OAuth2ClientCredentials { token_url } => {
            vars.push(EnvVar::required(&p, "OAUTH2_CLIENT_ID", "OAuth2 client id"));
            vars.push(EnvVar::required(&p, "OAUTH2_CLIENT_SECRET", "OAuth2 client secret"));
            vars.push(EnvVar::optional(&p, "OAUTH2_TOKEN_URL", Some(token_url.clone()), "OAuth2 token endpoint"));
            vars.push(EnvVar::optional(&p, "OAUTH2_SCOPE", None, "OAuth2 scope"));
        }
    }
    vars
}

pub fn cargo_toml(service: &ServiceInfo) -> String {
    format!(
        r#"[package]
name = "{package}"
version = "0.1.0"
edition = "2021"
description = "MCP proxy server for {name}, generated by {banner}"

[dependencies]
reqwest = {{ version = "0.12", features = ["json", "native-tls"] }}
tokio = {{ version = "1.0", features = ["full"] }}
serde = {{ version = "1.0", features = ["derive"] }}
serde_json = "1.0"
base64 = "0.22.1"
thiserror = "2.0"
tracing = "0.1"
urlencoding = "2.1"
tracing-subscriber = {{ version = "0.3", features = ["env-filter"] }}

[workspace]
"#,
        package = service.package_name(),
        name = service.name,
        banner = generator_banner(),
    )
}

fn static_str(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("Some({value:?})"),
        None => "None".to_string(),
    }
}

fn auth_defaults(auth: &AuthPattern) -> String {
    let (key_name, key_location, header_name, token_url) = match auth {
        AuthPattern::ApiKey { name, location } => {
            (Some(name.as_str()), location.to_key_location(), None, None)
        }
        AuthPattern::CustomHeader { name } => (None, KeyLocation::Header, Some(name.as_str()), None),
        AuthPattern::OAuth2ClientCredentials { token_url } => {
            (None, KeyLocation::Header, None, Some(token_url.as_str()))
        }
        AuthPattern::None | AuthPattern::Bearer | AuthPattern::Basic => {
            (None, KeyLocation::Header, None, None)
        }
    };
    format!(
        "AuthDefaults {{\n        kind: AuthKind::{:?},\n        key_name: {},\n        key_location: KeyLocation::{:?},\n        header_name: {},\n        token_url: {},\n    }}",
        auth.kind(),
        static_str(key_name),
        key_location,
        static_str(header_name),
        static_str(token_url),
    )
}

pub fn main_rs(service: &ServiceInfo) -> String {
    let modules: String = runtime::module_names()
        .iter()
        .map(|name| format!("mod {name};\n"))
        .collect();

    format!(
        r#"#![allow(dead_code)]

{modules}
use auth::{{AuthDefaults, AuthKind, KeyLocation}};
use config::{{ServerConfig, ServiceDescriptor}};
use forward::Forwarder;
use server::McpServer;
use std::sync::Arc;
use tool::ToolRegistry;
use tracing_subscriber::EnvFilter;

const SERVICE: ServiceDescriptor = ServiceDescriptor {{
    name: {name:?},
    version: env!("CARGO_PKG_VERSION"),
    env_prefix: {prefix:?},
    default_base_url: {base_url:?},
    auth: {auth},
}};

#[tokio::main]
async fn main() -> std::io::Result<()> {{
    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = ServerConfig::from_env(&SERVICE);
    let server = McpServer::new(ToolRegistry::new(tools::all()), Forwarder::new(config));
    Arc::new(server).serve_stdio().await
}}
"#,
        name = service.name,
        prefix = service.env_prefix(),
        base_url = service.base_url.as_deref().unwrap_or_default(),
        auth = auth_defaults(&service.auth),
    )
}

pub fn env_example(service: &ServiceInfo) -> String {
    let mut out = format!(
        "# Environment for {} ({})\n# Fill in the empty values; commented lines show the defaults.\n",
        service.name,
        generator_banner()
    );
    for var in env_vars(service) {
        out.push_str(&format!("\n# {}\n", var.description));
        match (&var.default, var.required) {
            (_, true) => out.push_str(&format!("{}=\n", var.name)),
            (Some(default), false) => out.push_str(&format!("# {}={default}\n", var.name)),
            (None, false) => out.push_str(&format!("# {}=\n", var.name)),
        }
    }
    out
}

fn param_row(param: &ParamSpec) -> String {
    let wire = if param.wire_name != param.name {
        format!(" (sent as `{}`)", param.wire_name)
    } else {
        String::new()
    };
    format!(
        "| `{}` | {} | {} | {}{wire} |\n",
        param.name,
        param.param_type.as_str(),
        if param.required { "yes" } else { "no" },
        param.description.replace('|', "\\|"),
    )
}

pub fn readme(service: &ServiceInfo, tools: &[ToolDefinition], generated_at: Option<&str>) -> String {
    let base_url = service.base_url.as_deref().unwrap_or_default();
    let mut out = format!("# {}\n\n", service.name);
    out.push_str(&format!(
        "MCP server exposing {} tools that forward to `{base_url}`.\n\n",
        tools.len()
    ));
    match generated_at {
        Some(at) => out.push_str(&format!("Generated by {} at {at}.\n\n", generator_banner())),
        None => out.push_str(&format!("Generated by {}.\n\n", generator_banner())),
    }

    out.push_str("## Running\n\n```sh\ncargo build --release\n");
    out.push_str(&format!("./target/release/{}\n```\n\n", service.package_name()));
    out.push_str("The server speaks MCP over stdio. Logs go to stderr; set `RUST_LOG=debug` for more detail.\n\n");

    out.push_str("## Authentication\n\n");
    out.push_str(&format!("Inferred scheme: `{}`.\n\n", service.auth.describe()));

    out.push_str("## Configuration\n\n| Variable | Required | Default | Description |\n|---|---|---|---|\n");
    let vars = env_vars(service);
    for var in &vars {
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            var.name,
            if var.required { "yes" } else { "no" },
            var.default.as_deref().map(|d| format!("`{d}`")).unwrap_or_default(),
            var.description
        ));
    }

    out.push_str("\n## MCP host configuration\n\n```json\n");
    let env: serde_json::Map<String, serde_json::Value> = vars
        .iter()
        .filter(|v| v.required)
        .map(|v| (v.name.clone(), serde_json::Value::String("...".to_string())))
        .collect();
    let host_config = serde_json::json!({
        "mcpServers": {
            service.name.clone(): {
                "command": format!("/path/to/{}/target/release/{}", service.name, service.package_name()),
                "env": env,
            }
        }
    });
    out.push_str(&serde_json::to_string_pretty(&host_config).unwrap_or_default());
    out.push_str("\n```\n\n## Tools\n");

    for tool in tools {
        out.push_str(&format!("\n### `{}`\n\n{}\n", tool.name, tool.description));
        if tool.all_params().next().is_some() {
            out.push_str("\n| Argument | Type | Required | Description |\n|---|---|---|---|\n");
            for param in tool.all_params() {
                out.push_str(&param_row(param));
            }
        }
    }

    if !service.warnings.is_empty() {
        out.push_str("\n## Generation warnings\n\n");
        for warning in &service.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureStats;
    use crate::classify::CredentialLocation;
    use mcpgen_proxy::HttpMethod;

    fn service(auth: AuthPattern) -> ServiceInfo {
        ServiceInfo {
            name: "api-example-com".to_string(),
            base_url: Some("https://api.example.com".to_string()),
            auth,
            endpoints: Vec::new(),
            warnings: Vec::new(),
            skipped: Vec::new(),
            stats: CaptureStats::default(),
        }
    }

    #[test]
    fn test_env_vars_for_api_key() {
        let vars = env_vars(&service(AuthPattern::ApiKey {
            name: "X-Api-Key".to_string(),
            location: CredentialLocation::Header,
        }));
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "API_EXAMPLE_COM_BASE_URL",
                "API_EXAMPLE_COM_TIMEOUT_SECS",
                "API_EXAMPLE_COM_AUTH_TYPE",
                "API_EXAMPLE_COM_API_KEY",
                "API_EXAMPLE_COM_API_KEY_NAME",
                "API_EXAMPLE_COM_API_KEY_LOCATION",
            ]
        );
        assert!(vars[3].required);
        assert_eq!(vars[2].default.as_deref(), Some("api_key"));
    }

    #[test]
    fn test_main_rs_bakes_in_auth_defaults() {
        let source = main_rs(&service(AuthPattern::OAuth2ClientCredentials {
            token_url: "https://auth.example.com/oauth/token".to_string(),
        }));
        assert!(source.contains("kind: AuthKind::OAuth2ClientCredentials,"));
        assert!(source.contains("token_url: Some(\"https://auth.example.com/oauth/token\"),"));
        assert!(source.contains("env_prefix: \"API_EXAMPLE_COM\","));
        assert!(source.contains("mod tools;\n"));
        assert!(source.starts_with("#![allow(dead_code)]\n"));
    }

    #[test]
    fn test_env_example_leaves_secrets_empty() {
        let text = env_example(&service(AuthPattern::Bearer));
        assert!(text.contains("\nAPI_EXAMPLE_COM_BEARER_TOKEN=\n"));
        assert!(text.contains("# API_EXAMPLE_COM_BASE_URL=https://api.example.com\n"));
    }

    #[test]
    fn test_readme_lists_tools() {
        let tools = vec![ToolDefinition::new("get_api_items", HttpMethod::GET, "/api/items")
            .query_param(ParamSpec::optional("page", mcpgen_proxy::ParamType::Number, "Query parameter page"))];
        let text = readme(&service(AuthPattern::None), &tools, None);
        assert!(text.contains("### `get_api_items`"));
        assert!(text.contains("| `page` | number | no | Query parameter page |"));
        assert!(text.contains(&format!("Generated by {}.\n", generator_banner())));
        assert!(readme(&service(AuthPattern::None), &tools, Some("2024-01-01T00:00:00Z"))
            .contains("at 2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_cargo_toml_package_name() {
        let mut svc = service(AuthPattern::None);
        svc.name = "127-0-0-1".to_string();
        assert!(cargo_toml(&svc).contains("name = \"mcp-127-0-0-1\""));
    }
}
