use crate::auth::{AuthDefaults, Credentials};
use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Constants baked into a generated server.
#[derive(Debug, Clone, Copy)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub version: &'static str,
    pub env_prefix: &'static str,
    pub default_base_url: &'static str,
    pub auth: AuthDefaults,
}

/// Snapshot of the environment taken once at startup. Problems are kept and
/// reported on the first tool invocation instead of aborting the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub service_name: String,
    pub version: String,
    pub base_url: Result<reqwest::Url, ConfigError>,
    pub timeout: Result<Duration, ConfigError>,
    pub credentials: Result<Credentials, ConfigError>,
}

impl ServerConfig {
    pub fn from_env(service: &ServiceDescriptor) -> Self {
        Self::from_lookup(service, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(service: &ServiceDescriptor, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| format!("{}_{suffix}", service.env_prefix);
        let value = |suffix: &str| lookup(&var(suffix)).filter(|v| !v.trim().is_empty());

        let raw_base = value("BASE_URL").unwrap_or_else(|| service.default_base_url.to_string());
        let base_url = reqwest::Url::parse(raw_base.trim()).map_err(|_| ConfigError::InvalidValue {
            name: var("BASE_URL"),
            value: raw_base.clone(),
        });

        let timeout = match value("TIMEOUT_SECS") {
            None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(secs) if secs > 0.0 => {
                    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
                        name: var("TIMEOUT_SECS"),
                        value: raw,
                    })
                }
                _ => Err(ConfigError::InvalidValue {
                    name: var("TIMEOUT_SECS"),
                    value: raw,
                }),
            },
        };

        let credentials = Credentials::resolve(service.env_prefix, &service.auth, &lookup);

        Self {
            service_name: service.name.to_string(),
            version: service.version.to_string(),
            base_url,
            timeout,
            credentials,
        }
    }

    pub fn problems(&self) -> Vec<&ConfigError> {
        let mut problems = Vec::new();
        if let Err(e) = &self.base_url {
            problems.push(e);
        }
        if let Err(e) = &self.timeout {
            problems.push(e);
        }
        if let Err(e) = &self.credentials {
            problems.push(e);
        }
        problems
    }
}
