use regex::Regex;
use serde::{Deserialize, Serialize};

/// Knobs for deciding which path segments are identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentSettings {
    /// Minimum length of a mixed letter/digit token treated as an opaque id.
    pub opaque_min_length: usize,
    /// Extra regexes; a segment matching any of them becomes a parameter.
    pub extra_patterns: Vec<String>,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            opaque_min_length: 20,
            extra_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Numeric,
    Uuid,
    Opaque,
    Pattern,
}

impl SegmentKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SegmentKind::Numeric => "Numeric identifier",
            SegmentKind::Uuid => "UUID identifier",
            SegmentKind::Opaque => "Opaque identifier",
            SegmentKind::Pattern => "Identifier",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParam {
    pub name: String,
    pub example: String,
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPath {
    pub template: String,
    pub params: Vec<PathParam>,
}

#[derive(Debug, Clone)]
pub struct PathNormalizer {
    opaque_min_length: usize,
    extra: Vec<Regex>,
}

impl PathNormalizer {
    pub fn new(settings: &SegmentSettings) -> Result<Self, regex::Error> {
        let extra = settings
            .extra_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            opaque_min_length: settings.opaque_min_length,
            extra,
        })
    }

    pub fn classify(&self, segment: &str) -> Option<SegmentKind> {
        if segment.is_empty() {
            return None;
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            return Some(SegmentKind::Numeric);
        }
        if is_uuid(segment) {
            return Some(SegmentKind::Uuid);
        }
        if self.is_opaque(segment) {
            return Some(SegmentKind::Opaque);
        }
        if self.extra.iter().any(|re| re.is_match(segment)) {
            return Some(SegmentKind::Pattern);
        }
        None
    }

    fn is_opaque(&self, segment: &str) -> bool {
        segment.len() >= self.opaque_min_length
            && segment.bytes().all(|b| b.is_ascii_alphanumeric())
            && segment.bytes().any(|b| b.is_ascii_alphabetic())
            && segment.bytes().any(|b| b.is_ascii_digit())
    }

    /// Replaces identifier segments with `{id}`, `{id_1}`, ... in path order.
    /// Leading and trailing slashes are kept as they are.
    pub fn normalize(&self, path: &str) -> NormalizedPath {
        let mut params = Vec::new();
        let segments: Vec<String> = path
            .split('/')
            .map(|segment| match self.classify(segment) {
                Some(kind) => {
                    let name = placeholder_name(params.len());
                    let template = format!("{{{name}}}");
                    params.push(PathParam {
                        name,
                        example: segment.to_string(),
                        kind,
                    });
                    template
                }
                None => segment.to_string(),
            })
            .collect();

        let mut template = segments.join("/");
        if template.is_empty() {
            template.push('/');
        }
        NormalizedPath { template, params }
    }
}

fn placeholder_name(position: usize) -> String {
    if position == 0 {
        "id".to_string()
    } else {
        format!("id_{position}")
    }
}

fn is_uuid(segment: &str) -> bool {
    (segment.len() == 36 || segment.len() == 32) && uuid::Uuid::parse_str(segment).is_ok()
}
