use crate::error::{AuthError, ConfigError};
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub type ConfiguredRequest = (reqwest::Url, Vec<(String, String)>);

const DEFAULT_API_KEY_NAME: &str = "X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    None,
    ApiKey,
    Bearer,
    Basic,
    CustomHeader,
    OAuth2ClientCredentials,
}

impl AuthKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "api_key" | "apikey" => Some(Self::ApiKey),
            "bearer" => Some(Self::Bearer),
            "basic" => Some(Self::Basic),
            "custom_header" => Some(Self::CustomHeader),
            "oauth2_client_credentials" | "oauth2" => Some(Self::OAuth2ClientCredentials),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey => "api_key",
            Self::Bearer => "bearer",
            Self::Basic => "basic",
            Self::CustomHeader => "custom_header",
            Self::OAuth2ClientCredentials => "oauth2_client_credentials",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLocation {
    Header,
    Query,
}

impl KeyLocation {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "header" => Some(Self::Header),
            "query" => Some(Self::Query),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Query => "query",
        }
    }
}

/// Scheme and names inferred from the capture, used when the environment
/// does not say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthDefaults {
    pub kind: AuthKind,
    pub key_name: Option<&'static str>,
    pub key_location: KeyLocation,
    pub header_name: Option<&'static str>,
    pub token_url: Option<&'static str>,
}

impl AuthDefaults {
    pub const NONE: AuthDefaults = AuthDefaults {
        kind: AuthKind::None,
        key_name: None,
        key_location: KeyLocation::Header,
        header_name: None,
        token_url: None,
    };
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    ApiKey {
        name: String,
        value: String,
        location: KeyLocation,
    },
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    CustomHeader {
        name: String,
        value: String,
    },
    OAuth2ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: Option<String>,
    },
}

// Secrets stay out of logs and error output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => write!(f, "Credentials::None"),
            Credentials::ApiKey { name, location, .. } => {
                write!(f, "Credentials::ApiKey({name} in {})", location.as_str())
            }
            Credentials::Bearer { .. } => write!(f, "Credentials::Bearer"),
            Credentials::Basic { username, .. } => write!(f, "Credentials::Basic({username})"),
            Credentials::CustomHeader { name, .. } => write!(f, "Credentials::CustomHeader({name})"),
            Credentials::OAuth2ClientCredentials { token_url, .. } => {
                write!(f, "Credentials::OAuth2ClientCredentials({token_url})")
            }
        }
    }
}

struct EnvReader<'a, F> {
    prefix: &'a str,
    lookup: F,
}

impl<'a, F> EnvReader<'a, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn var_name(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.prefix)
    }

    fn optional(&self, suffix: &str) -> Option<String> {
        (self.lookup)(&self.var_name(suffix)).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, suffix: &str) -> Result<String, ConfigError> {
        self.optional(suffix)
            .ok_or_else(|| ConfigError::MissingVariable(self.var_name(suffix)))
    }

    fn or_default(&self, suffix: &str, default: Option<&str>) -> Result<String, ConfigError> {
        match self.optional(suffix) {
            Some(value) => Ok(value),
            None => default
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingVariable(self.var_name(suffix))),
        }
    }
}

impl Credentials {
    /// Reads `<prefix>_*` variables through `lookup`, falling back to the
    /// inferred defaults for scheme and names.
    pub fn resolve<F>(prefix: &str, defaults: &AuthDefaults, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { prefix, lookup };

        let kind = match env.optional("AUTH_TYPE") {
            Some(value) => AuthKind::from_str(&value).ok_or_else(|| ConfigError::InvalidValue {
                name: env.var_name("AUTH_TYPE"),
                value,
            })?,
            None => defaults.kind,
        };

        let credentials = match kind {
            AuthKind::None => Credentials::None,
            AuthKind::ApiKey => {
                let location = match env.optional("API_KEY_LOCATION") {
                    Some(value) => {
                        KeyLocation::from_str(&value).ok_or_else(|| ConfigError::InvalidValue {
                            name: env.var_name("API_KEY_LOCATION"),
                            value,
                        })?
                    }
                    None => defaults.key_location,
                };
                Credentials::ApiKey {
                    name: env
                        .optional("API_KEY_NAME")
                        .or_else(|| defaults.key_name.map(str::to_string))
                        .unwrap_or_else(|| DEFAULT_API_KEY_NAME.to_string()),
                    value: env.required("API_KEY")?,
                    location,
                }
            }
            AuthKind::Bearer => Credentials::Bearer {
                token: env.required("BEARER_TOKEN")?,
            },
            AuthKind::Basic => Credentials::Basic {
                username: env.required("BASIC_USERNAME")?,
                password: env.required("BASIC_PASSWORD")?,
            },
            AuthKind::CustomHeader => Credentials::CustomHeader {
                name: env.or_default("CUSTOM_HEADER_NAME", defaults.header_name)?,
                value: env.required("CUSTOM_HEADER_VALUE")?,
            },
            AuthKind::OAuth2ClientCredentials => Credentials::OAuth2ClientCredentials {
                client_id: env.required("OAUTH2_CLIENT_ID")?,
                client_secret: env.required("OAUTH2_CLIENT_SECRET")?,
                token_url: env.or_default("OAUTH2_TOKEN_URL", defaults.token_url)?,
                scope: env.optional("OAUTH2_SCOPE"),
            },
        };

        Ok(credentials)
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            Credentials::None => AuthKind::None,
            Credentials::ApiKey { .. } => AuthKind::ApiKey,
            Credentials::Bearer { .. } => AuthKind::Bearer,
            Credentials::Basic { .. } => AuthKind::Basic,
            Credentials::CustomHeader { .. } => AuthKind::CustomHeader,
            Credentials::OAuth2ClientCredentials { .. } => AuthKind::OAuth2ClientCredentials,
        }
    }

    /// Attaches the credential to an outgoing request.
    pub async fn configure(
        &self,
        http: &reqwest::Client,
        mut url: reqwest::Url,
        mut headers: Vec<(String, String)>,
    ) -> Result<ConfiguredRequest, AuthError> {
        match self {
            Credentials::ApiKey {
                name,
                value,
                location: KeyLocation::Query,
            } => {
                url.query_pairs_mut().append_pair(name, value);
            }
            Credentials::OAuth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scope,
            } => {
                let token =
                    fetch_token(http, token_url, client_id, client_secret, scope.as_deref())
                        .await?;
                headers.push(bearer_header(&token));
            }
            _ => {
                if let Some(header) = self.static_header() {
                    headers.push(header);
                }
            }
        }
        Ok((url, headers))
    }

    fn static_header(&self) -> Option<(String, String)> {
        match self {
            Credentials::ApiKey {
                name,
                value,
                location: KeyLocation::Header,
            } => Some((name.clone(), value.clone())),
            Credentials::Bearer { token } => Some(bearer_header(token)),
            Credentials::Basic { username, password } => Some((
                reqwest::header::AUTHORIZATION.as_str().to_string(),
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
            )),
            Credentials::CustomHeader { name, value } => Some((name.clone(), value.clone())),
            _ => None,
        }
    }
}

/// One client-credentials grant against the token endpoint. Tokens are never cached.
async fn fetch_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    scope: Option<&str>,
) -> Result<String, AuthError> {
    tracing::debug!("Requesting client-credentials token from {token_url}");

    let mut params = vec![
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];
    if let Some(scope) = scope {
        params.push(("scope", scope));
    }

    let request_error = |e: reqwest::Error| AuthError::TokenRequest {
        url: token_url.to_string(),
        message: e.to_string(),
    };

    let response = http
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenStatus {
            url: token_url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let token_response: serde_json::Value = response.json().await.map_err(request_error)?;
    token_response["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AuthError::MissingAccessToken(token_url.to_string()))
}

fn bearer_header(token: &str) -> (String, String) {
    (
        reqwest::header::AUTHORIZATION.as_str().to_string(),
        format!("Bearer {token}"),
    )
}
