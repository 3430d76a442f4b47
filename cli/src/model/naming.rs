use lazy_static::lazy_static;
use mcpgen_proxy::HttpMethod;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
    static ref NON_IDENT: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

const FALLBACK_SERVICE: &str = "service";

/// `get_api_v1_courses_id` for `GET /api/v1/courses/{id}`.
pub fn tool_name(method: HttpMethod, template: &str) -> String {
    let unwrapped = template.replace(['{', '}'], "");
    let rest = NON_ALNUM
        .replace_all(&unwrapped, "_")
        .trim_matches('_')
        .to_ascii_lowercase();
    if rest.is_empty() {
        method.tool_prefix().to_string()
    } else {
        format!("{}_{rest}", method.tool_prefix())
    }
}

/// Hands out names, suffixing `_2`, `_3`, ... on collision.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Lowercased, non-alphanumeric runs collapsed to `-`.
pub fn service_name(raw: &str) -> String {
    let name = NON_ALNUM
        .replace_all(&raw.to_ascii_lowercase(), "-")
        .trim_matches('-')
        .to_string();
    if name.is_empty() {
        FALLBACK_SERVICE.to_string()
    } else {
        name
    }
}

/// Prefix of the generated server's environment variables.
pub fn env_prefix(service: &str) -> String {
    let prefix = NON_ALNUM
        .replace_all(&service.to_ascii_uppercase(), "_")
        .trim_matches('_')
        .to_string();
    match prefix.chars().next() {
        None => "MCP".to_string(),
        Some(c) if c.is_ascii_digit() => format!("MCP_{prefix}"),
        Some(_) => prefix,
    }
}

/// Cargo package names must start with a letter.
pub fn package_name(service: &str) -> String {
    if service.starts_with(|c: char| c.is_ascii_alphabetic()) {
        service.to_string()
    } else {
        format!("mcp-{service}")
    }
}

/// Tool argument name for a wire name: `[A-Za-z0-9_]`, no leading digit,
/// never empty.
pub fn sanitize_identifier(raw: &str) -> String {
    let ident = NON_IDENT.replace_all(raw, "_").trim_matches('_').to_string();
    match ident.chars().next() {
        None => "value".to_string(),
        Some(c) if c.is_ascii_digit() => format!("p_{ident}"),
        Some(_) => ident,
    }
}
