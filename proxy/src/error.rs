use thiserror::Error;

const MAX_BODY_EXCERPT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Configuration error: environment variable {0} is not set")]
    MissingVariable(String),
    #[error("Configuration error: {name} has unsupported value '{value}'")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth error: token request to {url} failed: {message}")]
    TokenRequest { url: String, message: String },
    #[error("Auth error: token endpoint {url} returned HTTP {status}: {body}")]
    TokenStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Auth error: no access_token in response from {0}")]
    MissingAccessToken(String),
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),
    #[error("Parameter '{name}' must be a {expected}")]
    InvalidParameter { name: String, expected: &'static str },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Upstream returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
}

impl ForwardError {
    /// Builds the error for a non-2xx upstream response, keeping a bounded body excerpt.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        let body = body.trim();
        let detail = if body.is_empty() {
            reason.to_string()
        } else {
            format!("{reason} - {}", excerpt(body))
        };
        ForwardError::Status {
            status: status.as_u16(),
            detail,
        }
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ForwardError::Timeout(error.to_string())
        } else if error.is_connect() {
            ForwardError::Connection(error.to_string())
        } else {
            ForwardError::Transport(error.to_string())
        }
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{cut}...")
}
