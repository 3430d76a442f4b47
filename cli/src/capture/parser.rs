use crate::capture::exchange::{CapturedExchange, Headers, RequestBody};
use crate::capture::filter::{FilterInput, FilterVerdict, TrafficFilter};
use crate::capture::har::{HarDocument, HarEntry, HarNameValue};
use crate::capture::normalize::PathNormalizer;
use crate::core::error::GenError;
use crate::core::json::{self, ExampleLimits};
use crate::core::settings::Settings;
use mcpgen_proxy::HttpMethod;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture format error: {0}")]
    Format(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    pub total_entries: usize,
    pub kept: usize,
    pub skipped: usize,
    pub filtered_static: usize,
    pub filtered_beacon: usize,
    pub filtered_content_type: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCapture {
    pub exchanges: Vec<CapturedExchange>,
    pub skipped: Vec<SkippedEntry>,
    pub stats: CaptureStats,
}

enum EntryOutcome {
    Kept(Box<CapturedExchange>),
    Filtered(FilterVerdict),
}

pub struct CaptureParser {
    filter: TrafficFilter,
    normalizer: PathNormalizer,
    examples: ExampleLimits,
}

impl CaptureParser {
    pub fn new(settings: &Settings) -> Result<Self, GenError> {
        let normalizer = PathNormalizer::new(&settings.segments)
            .map_err(|e| GenError::Config(format!("invalid segment pattern: {e}")))?;
        Ok(Self {
            filter: TrafficFilter::new(&settings.filter),
            normalizer,
            examples: settings.examples.clone(),
        })
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedCapture, GenError> {
        tracing::debug!("Reading capture {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| GenError::file(path, e))?;
        Ok(self.parse_str(&text)?)
    }

    /// Parses a HAR document. Only a document that is not JSON or lacks
    /// `log.entries` fails; bad entries are skipped with a reason.
    pub fn parse_str(&self, text: &str) -> Result<ParsedCapture, CaptureError> {
        let document: HarDocument = serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                CaptureError::Format(format!("expected a HAR document with log.entries: {e}"))
            } else {
                CaptureError::Format(format!("capture is not valid JSON: {e}"))
            }
        })?;

        let mut parsed = ParsedCapture::default();
        parsed.stats.total_entries = document.log.entries.len();

        for (index, raw) in document.log.entries.into_iter().enumerate() {
            match self.entry(index, raw) {
                Ok(EntryOutcome::Kept(exchange)) => parsed.exchanges.push(*exchange),
                Ok(EntryOutcome::Filtered(verdict)) => match verdict {
                    FilterVerdict::StaticAsset => parsed.stats.filtered_static += 1,
                    FilterVerdict::Beacon => parsed.stats.filtered_beacon += 1,
                    FilterVerdict::ContentType => parsed.stats.filtered_content_type += 1,
                    FilterVerdict::Keep => {}
                },
                Err(reason) => {
                    tracing::debug!("Skipping entry {index}: {reason}");
                    parsed.skipped.push(SkippedEntry { index, reason });
                }
            }
        }

        parsed.stats.kept = parsed.exchanges.len();
        parsed.stats.skipped = parsed.skipped.len();
        tracing::debug!(
            "Capture has {} entries, kept {}, skipped {}",
            parsed.stats.total_entries,
            parsed.stats.kept,
            parsed.stats.skipped
        );
        Ok(parsed)
    }

    fn entry(&self, index: usize, raw: Value) -> Result<EntryOutcome, String> {
        let entry: HarEntry =
            serde_json::from_value(raw).map_err(|e| format!("malformed entry: {e}"))?;
        let request = entry.request;
        let response = entry.response;

        let method = HttpMethod::from_str(&request.method)
            .ok_or_else(|| format!("unsupported method '{}'", request.method))?;

        let url = url::Url::parse(&request.url)
            .map_err(|e| format!("invalid URL '{}': {e}", request.url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("unsupported scheme '{}'", url.scheme()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| format!("URL has no host: {}", request.url))?
            .to_string();

        let request_headers = headers(&request.headers);
        let response_headers = headers(&response.headers);
        let response_mime = response
            .content
            .mime_type
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| response_headers.get("content-type").map(str::to_string));

        let verdict = self.filter.verdict(&FilterInput {
            host: &host,
            path: url.path(),
            request_accept: request_headers.get("accept"),
            request_content_type: request_headers.get("content-type"),
            response_mime: response_mime.as_deref(),
        });
        if verdict != FilterVerdict::Keep {
            return Ok(EntryOutcome::Filtered(verdict));
        }

        let query = url
            .query_pairs()
            .filter(|(name, _)| self.filter.keeps_query_param(name))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let body = request.post_data.and_then(|post| {
            let body = RequestBody {
                mime_type: post.mime_type,
                text: post.text,
                form: post
                    .params
                    .into_iter()
                    .map(|p| (p.name, p.value.unwrap_or_default()))
                    .collect(),
            };
            (!body.is_empty()).then_some(body)
        });

        let response_example = response
            .content
            .decoded_text()
            .filter(|text| {
                response_mime.as_deref().is_some_and(json::is_json_mime)
                    || json::is_json_content(text)
            })
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .map(|value| json::truncate_example(&value, &self.examples));

        Ok(EntryOutcome::Kept(Box::new(CapturedExchange {
            index,
            method,
            path: self.normalizer.normalize(url.path()),
            url,
            request_headers,
            query,
            body,
            status: response.status,
            response_headers,
            response_mime,
            response_example,
        })))
    }
}

fn headers(list: &[HarNameValue]) -> Headers {
    Headers::new(
        list.iter()
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect(),
    )
}
