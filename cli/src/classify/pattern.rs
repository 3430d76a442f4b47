use mcpgen_proxy::{AuthKind, KeyLocation};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialLocation {
    Header,
    Query,
}

impl CredentialLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialLocation::Header => "header",
            CredentialLocation::Query => "query",
        }
    }

    pub fn to_key_location(self) -> KeyLocation {
        match self {
            CredentialLocation::Header => KeyLocation::Header,
            CredentialLocation::Query => KeyLocation::Query,
        }
    }
}

/// The one authentication scheme inferred for a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthPattern {
    None,
    ApiKey {
        name: String,
        location: CredentialLocation,
    },
    Bearer,
    Basic,
    CustomHeader {
        name: String,
    },
    #[serde(rename = "oauth2_client_credentials")]
    OAuth2ClientCredentials {
        token_url: String,
    },
}

impl AuthPattern {
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthPattern::None => AuthKind::None,
            AuthPattern::ApiKey { .. } => AuthKind::ApiKey,
            AuthPattern::Bearer => AuthKind::Bearer,
            AuthPattern::Basic => AuthKind::Basic,
            AuthPattern::CustomHeader { .. } => AuthKind::CustomHeader,
            AuthPattern::OAuth2ClientCredentials { .. } => AuthKind::OAuth2ClientCredentials,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AuthPattern::None => "none".to_string(),
            AuthPattern::ApiKey { name, location } => {
                format!("api_key ({name} in {})", location.as_str())
            }
            AuthPattern::Bearer => "bearer".to_string(),
            AuthPattern::Basic => "basic".to_string(),
            AuthPattern::CustomHeader { name } => format!("custom_header ({name})"),
            AuthPattern::OAuth2ClientCredentials { token_url } => {
                format!("oauth2_client_credentials (token URL {token_url})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let pattern = AuthPattern::ApiKey {
            name: "X-API-Key".to_string(),
            location: CredentialLocation::Header,
        };
        assert_eq!(
            serde_json::to_value(&pattern).unwrap(),
            json!({"type": "api_key", "name": "X-API-Key", "location": "header"})
        );
        assert_eq!(
            serde_json::to_value(AuthPattern::Bearer).unwrap(),
            json!({"type": "bearer"})
        );
        assert_eq!(
            serde_json::to_value(AuthPattern::OAuth2ClientCredentials {
                token_url: "https://auth.example.com/oauth/token".to_string()
            })
            .unwrap()["type"],
            "oauth2_client_credentials"
        );
    }

    #[test]
    fn test_kind_and_description() {
        assert_eq!(AuthPattern::Basic.kind(), AuthKind::Basic);
        assert_eq!(
            AuthPattern::CustomHeader {
                name: "X-Session".to_string()
            }
            .describe(),
            "custom_header (X-Session)"
        );
    }
}
