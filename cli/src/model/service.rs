use crate::capture::{CapturedExchange, CaptureStats, ParsedCapture, SkippedEntry};
use crate::classify::{AuthPattern, Classification, CredentialLocation};
use crate::model::endpoint::ApiEndpoint;
use crate::model::naming::{self, NameAllocator};
use indexmap::IndexMap;
use mcpgen_proxy::HttpMethod;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderSettings {
    /// A runner-up host with at least this share of the primary host's
    /// traffic is reported as a warning.
    pub host_tie_ratio: f64,
    pub max_query_examples: usize,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            host_tie_ratio: 0.5,
            max_query_examples: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub base_url: Option<String>,
    pub auth: AuthPattern,
    pub endpoints: Vec<ApiEndpoint>,
    pub warnings: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    pub stats: CaptureStats,
}

impl ServiceInfo {
    pub fn env_prefix(&self) -> String {
        naming::env_prefix(&self.name)
    }

    pub fn package_name(&self) -> String {
        naming::package_name(&self.name)
    }
}

pub struct ServiceModelBuilder {
    settings: BuilderSettings,
    name_override: Option<String>,
}

impl ServiceModelBuilder {
    pub fn new(settings: &BuilderSettings) -> Self {
        Self {
            settings: settings.clone(),
            name_override: None,
        }
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name_override = name.map(str::to_string);
        self
    }

    pub fn build(&self, capture: ParsedCapture, classification: Classification) -> ServiceInfo {
        let Classification {
            pattern,
            mut warnings,
            token_exchange,
        } = classification;

        let candidates: Vec<&CapturedExchange> = capture
            .exchanges
            .iter()
            .filter(|exchange| Some(exchange.index) != token_exchange)
            .collect();

        let primary = self.primary_origin(&candidates, &mut warnings);

        let excluded_query = match &pattern {
            AuthPattern::ApiKey {
                name,
                location: CredentialLocation::Query,
            } => Some(name.as_str()),
            _ => None,
        };

        let mut grouped: IndexMap<(HttpMethod, String), ApiEndpoint> = IndexMap::new();
        let mut other_hosts = 0;
        for exchange in &candidates {
            if primary.as_ref().map(|(origin, _)| origin) != Some(&exchange.origin()) {
                other_hosts += 1;
                continue;
            }
            grouped
                .entry((exchange.method, exchange.path.template.clone()))
                .or_insert_with(|| ApiEndpoint::first_seen(exchange))
                .observe(exchange, self.settings.max_query_examples, excluded_query);
        }
        if other_hosts > 0 {
            warnings.push(format!(
                "Ignored {other_hosts} request(s) to hosts other than the primary host"
            ));
        }

        let mut names = NameAllocator::new();
        let endpoints: Vec<ApiEndpoint> = grouped
            .into_values()
            .map(|mut endpoint| {
                endpoint.tool_name = names.allocate(&naming::tool_name(endpoint.method, &endpoint.path));
                endpoint
            })
            .collect();

        let name = match (&self.name_override, &primary) {
            (Some(name), _) => naming::service_name(name),
            (None, Some((_, host))) => naming::service_name(host),
            (None, None) => naming::service_name(""),
        };

        tracing::debug!(
            "Service {name} has {} endpoints, auth {}",
            endpoints.len(),
            pattern.describe()
        );

        ServiceInfo {
            name,
            base_url: primary.map(|(origin, _)| origin),
            auth: pattern,
            endpoints,
            warnings,
            skipped: capture.skipped,
            stats: capture.stats,
        }
    }

    /// Most frequent `(origin, host)`; ties go to the first seen.
    fn primary_origin(
        &self,
        exchanges: &[&CapturedExchange],
        warnings: &mut Vec<String>,
    ) -> Option<(String, String)> {
        let mut counts: IndexMap<String, (String, usize)> = IndexMap::new();
        for exchange in exchanges {
            counts
                .entry(exchange.origin())
                .or_insert_with(|| (exchange.host().to_string(), 0))
                .1 += 1;
        }

        let mut ranked: Vec<(usize, &String, &(String, usize))> = counts
            .iter()
            .enumerate()
            .map(|(position, (origin, entry))| (position, origin, entry))
            .collect();
        ranked.sort_by(|a, b| b.2 .1.cmp(&a.2 .1).then(a.0.cmp(&b.0)));

        let (_, origin, (host, count)) = *ranked.first()?;
        if let Some((_, runner_up, (_, runner_count))) = ranked.get(1) {
            if *runner_count as f64 >= *count as f64 * self.settings.host_tie_ratio {
                warnings.push(format!(
                    "Several hosts have comparable traffic ({origin}: {count}, {runner_up}: {runner_count}); using {origin}"
                ));
            }
        }
        Some((origin.clone(), host.clone()))
    }
}
