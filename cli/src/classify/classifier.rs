use crate::capture::exchange::CapturedExchange;
use crate::classify::pattern::{AuthPattern, CredentialLocation};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use mcpgen_proxy::HttpMethod;
use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierSettings {
    /// Share of requests, counted from a name's first appearance, that must
    /// carry it for it to count as a credential.
    pub coverage_threshold: f64,
    pub token_path_suffixes: Vec<String>,
    pub ignored_headers: Vec<String>,
    pub ignored_header_prefixes: Vec<String>,
    pub credential_markers: Vec<String>,
    pub api_key_headers: Vec<String>,
    pub query_credential_names: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.9,
            token_path_suffixes: strings(&["token", "oauth/token", "oauth2/token", "connect/token"]),
            ignored_headers: strings(&[
                "accept",
                "accept-encoding",
                "accept-language",
                "authorization",
                "cache-control",
                "connection",
                "content-length",
                "content-type",
                "cookie",
                "dnt",
                "host",
                "if-modified-since",
                "if-none-match",
                "origin",
                "pragma",
                "priority",
                "referer",
                "te",
                "upgrade-insecure-requests",
                "user-agent",
                "x-requested-with",
                "x-csrf-token",
                "x-xsrf-token",
                "traceparent",
                "tracestate",
                "baggage",
                "sentry-trace",
                "x-request-id",
                "x-correlation-id",
            ]),
            ignored_header_prefixes: strings(&["sec-", ":", "x-forwarded-"]),
            credential_markers: strings(&["key", "token", "auth", "secret", "session", "signature"]),
            api_key_headers: strings(&["x-api-key", "api-key", "apikey", "x-apikey", "x-api-token"]),
            query_credential_names: strings(&[
                "api_key",
                "apikey",
                "key",
                "access_token",
                "token",
                "auth",
                "auth_token",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub pattern: AuthPattern,
    pub warnings: Vec<String>,
    /// Capture index of the detected client-credentials token request.
    pub token_exchange: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AuthorizationScheme {
    Bearer,
    Basic,
    Other,
}

impl AuthorizationScheme {
    fn of(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("bearer ") {
            AuthorizationScheme::Bearer
        } else if lower.starts_with("basic ") && is_basic_credential(&value[6..]) {
            AuthorizationScheme::Basic
        } else {
            AuthorizationScheme::Other
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AuthorizationScheme::Bearer => "bearer",
            AuthorizationScheme::Basic => "basic",
            AuthorizationScheme::Other => "other",
        }
    }

    fn pattern(&self) -> AuthPattern {
        match self {
            AuthorizationScheme::Bearer => AuthPattern::Bearer,
            AuthorizationScheme::Basic => AuthPattern::Basic,
            AuthorizationScheme::Other => AuthPattern::CustomHeader {
                name: "Authorization".to_string(),
            },
        }
    }
}

fn is_basic_credential(encoded: &str) -> bool {
    STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .is_some_and(|decoded| decoded.contains(':'))
}

/// How often a header or query name shows up across the capture.
#[derive(Debug, Clone)]
struct Presence {
    display_name: String,
    first: usize,
    count: usize,
    values: Vec<String>,
}

impl Presence {
    fn coverage(&self, total: usize) -> f64 {
        let window = total.saturating_sub(self.first);
        if window == 0 {
            0.0
        } else {
            self.count as f64 / window as f64
        }
    }
}

struct HeaderCandidate {
    presence: Presence,
    coverage: f64,
    api_key_named: bool,
    credential_named: bool,
}

pub struct AuthClassifier {
    settings: ClassifierSettings,
}

impl AuthClassifier {
    pub fn new(settings: &ClassifierSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Infers at most one scheme. Precedence: client-credentials token
    /// exchange, `Authorization`, custom headers, query credentials.
    pub fn classify(&self, exchanges: &[CapturedExchange]) -> Classification {
        let mut warnings = Vec::new();

        if let Some(exchange) = self.find_token_exchange(exchanges) {
            let mut token_url = exchange.url.clone();
            token_url.set_query(None);
            token_url.set_fragment(None);
            tracing::debug!("Found client-credentials token request at entry {}", exchange.index);
            return Classification {
                pattern: AuthPattern::OAuth2ClientCredentials {
                    token_url: token_url.to_string(),
                },
                warnings,
                token_exchange: Some(exchange.index),
            };
        }

        let pattern = self
            .authorization(exchanges, &mut warnings)
            .or_else(|| self.custom_header(exchanges, &mut warnings))
            .or_else(|| self.query_credential(exchanges))
            .unwrap_or(AuthPattern::None);

        Classification {
            pattern,
            warnings,
            token_exchange: None,
        }
    }

    fn find_token_exchange<'a>(
        &self,
        exchanges: &'a [CapturedExchange],
    ) -> Option<&'a CapturedExchange> {
        exchanges.iter().find(|exchange| {
            exchange.method == HttpMethod::POST
                && self.is_token_path(exchange.url.path())
                && exchange
                    .body
                    .as_ref()
                    .and_then(|body| body.field("grant_type"))
                    .is_some_and(|grant| grant.trim().eq_ignore_ascii_case("client_credentials"))
        })
    }

    fn is_token_path(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/').to_ascii_lowercase();
        self.settings.token_path_suffixes.iter().any(|suffix| {
            let suffix = suffix.trim_matches('/').to_ascii_lowercase();
            !suffix.is_empty() && path.ends_with(&format!("/{suffix}"))
        })
    }

    fn authorization(
        &self,
        exchanges: &[CapturedExchange],
        warnings: &mut Vec<String>,
    ) -> Option<AuthPattern> {
        let mut counts: IndexMap<AuthorizationScheme, usize> = IndexMap::new();
        for exchange in exchanges {
            if let Some(value) = exchange.request_headers.get("authorization") {
                *counts.entry(AuthorizationScheme::of(value)).or_default() += 1;
            }
        }
        if counts.is_empty() {
            return None;
        }

        let max = counts.values().copied().max().unwrap_or(0);
        let leaders: Vec<AuthorizationScheme> = counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(scheme, _)| *scheme)
            .collect();

        let summary = counts
            .iter()
            .map(|(scheme, count)| format!("{}: {count}", scheme.name()))
            .collect::<Vec<_>>()
            .join(", ");

        if leaders.len() > 1 {
            warnings.push(format!(
                "Authorization header uses conflicting schemes ({summary}); no auth scheme inferred"
            ));
            return Some(AuthPattern::None);
        }

        let winner = leaders[0];
        if counts.len() > 1 {
            warnings.push(format!(
                "Authorization header schemes are mixed ({summary}); using {}",
                winner.name()
            ));
        }
        Some(winner.pattern())
    }

    fn is_ignored_header(&self, name: &str) -> bool {
        self.settings.ignored_headers.iter().any(|h| h == name)
            || self
                .settings
                .ignored_header_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn is_api_key_name(&self, name: &str) -> bool {
        self.settings.api_key_headers.iter().any(|h| h == name)
            || name.replace(['-', '_'], "").contains("apikey")
    }

    fn is_credential_name(&self, name: &str) -> bool {
        self.settings
            .credential_markers
            .iter()
            .any(|marker| name.contains(marker.as_str()))
    }

    fn custom_header(
        &self,
        exchanges: &[CapturedExchange],
        warnings: &mut Vec<String>,
    ) -> Option<AuthPattern> {
        let total = exchanges.len();
        let presence = collect_presence(exchanges.iter().enumerate().flat_map(|(i, exchange)| {
            exchange
                .request_headers
                .iter()
                .map(move |(name, value)| (i, name.to_string(), value.to_string()))
        }));

        let mut candidates: Vec<HeaderCandidate> = presence
            .into_iter()
            .filter(|(key, _)| !self.is_ignored_header(key))
            .filter_map(|(key, presence)| {
                let coverage = presence.coverage(total);
                let api_key_named = self.is_api_key_name(&key);
                let credential_named = api_key_named || self.is_credential_name(&key);
                let stable_late_arrival = presence.first > 0 && presence.values.len() == 1;
                (coverage >= self.settings.coverage_threshold
                    && (credential_named || stable_late_arrival))
                    .then_some(HeaderCandidate {
                        presence,
                        coverage,
                        api_key_named,
                        credential_named,
                    })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.api_key_named
                .cmp(&a.api_key_named)
                .then(b.credential_named.cmp(&a.credential_named))
                .then(b.coverage.total_cmp(&a.coverage))
                .then(a.presence.first.cmp(&b.presence.first))
                .then_with(|| {
                    a.presence
                        .display_name
                        .to_ascii_lowercase()
                        .cmp(&b.presence.display_name.to_ascii_lowercase())
                })
        });

        let mut candidates = candidates.into_iter();
        let winner = candidates.next()?;
        let losers: Vec<String> = candidates.map(|c| c.presence.display_name).collect();
        if !losers.is_empty() {
            warnings.push(format!(
                "Several headers look like credentials ({}); using {}",
                losers.join(", "),
                winner.presence.display_name
            ));
        }

        let name = winner.presence.display_name;
        Some(if winner.api_key_named {
            AuthPattern::ApiKey {
                name,
                location: CredentialLocation::Header,
            }
        } else {
            AuthPattern::CustomHeader { name }
        })
    }

    fn query_credential(&self, exchanges: &[CapturedExchange]) -> Option<AuthPattern> {
        let total = exchanges.len();
        let presence = collect_presence(exchanges.iter().enumerate().flat_map(|(i, exchange)| {
            exchange
                .query
                .iter()
                .map(move |(name, value)| (i, name.clone(), value.clone()))
        }));

        presence
            .into_iter()
            .filter(|(key, _)| self.settings.query_credential_names.iter().any(|n| n == key))
            .filter(|(_, p)| p.coverage(total) >= self.settings.coverage_threshold)
            .min_by_key(|(_, p)| p.first)
            .map(|(_, p)| AuthPattern::ApiKey {
                name: p.display_name,
                location: CredentialLocation::Query,
            })
    }
}

/// Groups `(position, name, value)` observations by lowercased name,
/// counting each position once.
fn collect_presence(
    observations: impl Iterator<Item = (usize, String, String)>,
) -> IndexMap<String, Presence> {
    let mut presence: IndexMap<String, Presence> = IndexMap::new();
    let mut last_seen: IndexMap<String, usize> = IndexMap::new();

    for (position, name, value) in observations {
        let key = name.to_ascii_lowercase();
        let entry = presence.entry(key.clone()).or_insert_with(|| Presence {
            display_name: name.clone(),
            first: position,
            count: 0,
            values: Vec::new(),
        });
        if last_seen.get(&key) != Some(&position) {
            entry.count += 1;
            last_seen.insert(key, position);
        }
        if !entry.values.contains(&value) {
            entry.values.push(value);
        }
    }
    presence
}
