//! Runtime shared by every generated MCP proxy server.
//!
//! These modules are copied verbatim into each generated server crate, so
//! they only refer to each other through `crate::`.

pub mod auth;
pub mod config;
pub mod error;
pub mod forward;
pub mod http_method;
pub mod server;
pub mod tool;

pub use auth::{AuthDefaults, AuthKind, Credentials, KeyLocation};
pub use config::{ServerConfig, ServiceDescriptor};
pub use error::{AuthError, ConfigError, ForwardError};
pub use forward::{Forwarder, ToolReply};
pub use http_method::HttpMethod;
pub use server::McpServer;
pub use tool::{BodyEncoding, BodySpec, ParamSpec, ParamType, ToolDefinition, ToolRegistry};
