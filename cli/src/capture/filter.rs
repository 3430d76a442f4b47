use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Lists deciding which captured requests count as API traffic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    pub static_extensions: Vec<String>,
    pub static_path_markers: Vec<String>,
    pub beacon_hosts: Vec<String>,
    pub accepted_content_types: Vec<String>,
    pub api_path_markers: Vec<String>,
    /// Framework query parameters never exposed as tool arguments. Names
    /// starting with `_` are always dropped.
    pub ignored_query_params: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            static_extensions: strings(&[
                ".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff",
                ".woff2", ".ttf", ".eot", ".map", ".webp", ".avif", ".mp4", ".webm",
            ]),
            static_path_markers: strings(&["/_next/static", "/static/", "/assets/", "/public/"]),
            beacon_hosts: strings(&[
                "google-analytics.com",
                "googletagmanager.com",
                "doubleclick.net",
                "segment.io",
                "mixpanel.com",
                "sentry.io",
                "hotjar.com",
                "clarity.ms",
            ]),
            accepted_content_types: strings(&["json", "text/plain", "xml", "form"]),
            api_path_markers: strings(&["/api/", "/v1/", "/v2/", "/v3/", "/graphql"]),
            ignored_query_params: strings(&["rsc", "callback", "jsonp"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Keep,
    StaticAsset,
    Beacon,
    ContentType,
}

/// Request facts the filter looks at.
pub struct FilterInput<'a> {
    pub host: &'a str,
    pub path: &'a str,
    pub request_accept: Option<&'a str>,
    pub request_content_type: Option<&'a str>,
    pub response_mime: Option<&'a str>,
}

pub struct TrafficFilter {
    settings: FilterSettings,
}

impl TrafficFilter {
    pub fn new(settings: &FilterSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn verdict(&self, input: &FilterInput) -> FilterVerdict {
        let host = input.host.to_ascii_lowercase();
        if self.is_beacon_host(&host) {
            return FilterVerdict::Beacon;
        }

        let path = input.path.to_ascii_lowercase();
        if self.is_static_path(&path) {
            return FilterVerdict::StaticAsset;
        }

        match input.response_mime.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) => {
                let mime = mime.to_ascii_lowercase();
                if self
                    .settings
                    .accepted_content_types
                    .iter()
                    .any(|accepted| mime.contains(accepted.as_str()))
                {
                    FilterVerdict::Keep
                } else {
                    FilterVerdict::ContentType
                }
            }
            None if self.looks_like_api(&path, input) => FilterVerdict::Keep,
            None => FilterVerdict::ContentType,
        }
    }

    pub fn keeps_query_param(&self, name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('_')
            && !self
                .settings
                .ignored_query_params
                .iter()
                .any(|ignored| ignored.eq_ignore_ascii_case(name))
    }

    fn is_beacon_host(&self, host: &str) -> bool {
        self.settings.beacon_hosts.iter().any(|beacon| {
            host == beacon || host.ends_with(&format!(".{beacon}"))
        })
    }

    fn is_static_path(&self, path: &str) -> bool {
        self.settings
            .static_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
            || self
                .settings
                .static_path_markers
                .iter()
                .any(|marker| path.contains(marker.as_str()))
    }

    fn looks_like_api(&self, path: &str, input: &FilterInput) -> bool {
        let mentions_json = |value: Option<&str>| {
            value.is_some_and(|v| crate::core::json::is_json_mime(v))
        };
        self.settings
            .api_path_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
            || mentions_json(input.request_accept)
            || mentions_json(input.request_content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(host: &'a str, path: &'a str, mime: Option<&'a str>) -> FilterInput<'a> {
        FilterInput {
            host,
            path,
            request_accept: None,
            request_content_type: None,
            response_mime: mime,
        }
    }

    fn filter() -> TrafficFilter {
        TrafficFilter::new(&FilterSettings::default())
    }

    #[test]
    fn test_json_api_is_kept() {
        assert_eq!(
            filter().verdict(&input("api.example.com", "/api/v1/courses", Some("application/json"))),
            FilterVerdict::Keep
        );
    }

    #[test]
    fn test_static_assets() {
        let f = filter();
        assert_eq!(
            f.verdict(&input("example.com", "/main.3f2a.js", Some("application/javascript"))),
            FilterVerdict::StaticAsset
        );
        assert_eq!(
            f.verdict(&input("example.com", "/_next/static/chunks/app", Some("text/plain"))),
            FilterVerdict::StaticAsset
        );
        assert_eq!(
            f.verdict(&input("example.com", "/logo.PNG", Some("image/png"))),
            FilterVerdict::StaticAsset
        );
    }

    #[test]
    fn test_beacons() {
        assert_eq!(
            filter().verdict(&input("www.google-analytics.com", "/g/collect", None)),
            FilterVerdict::Beacon
        );
        assert_eq!(
            filter().verdict(&input("o123.ingest.sentry.io", "/api/1/envelope/", Some("application/json"))),
            FilterVerdict::Beacon
        );
    }

    #[test]
    fn test_html_pages_are_dropped() {
        assert_eq!(
            filter().verdict(&input("example.com", "/courses", Some("text/html; charset=utf-8"))),
            FilterVerdict::ContentType
        );
    }

    #[test]
    fn test_query_param_filter() {
        let f = filter();
        assert!(f.keeps_query_param("per_page"));
        assert!(!f.keeps_query_param("_"));
        assert!(!f.keeps_query_param("_rsc"));
        assert!(!f.keeps_query_param("callback"));
    }

    #[test]
    fn test_missing_content_type_needs_api_shape() {
        let f = filter();
        assert_eq!(f.verdict(&input("example.com", "/api/items", None)), FilterVerdict::Keep);
        assert_eq!(f.verdict(&input("example.com", "/items", None)), FilterVerdict::ContentType);

        let with_accept = FilterInput {
            request_accept: Some("application/json"),
            ..input("example.com", "/items", Some(""))
        };
        assert_eq!(f.verdict(&with_accept), FilterVerdict::Keep);
    }
}
