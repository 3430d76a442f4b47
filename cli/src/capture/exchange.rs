use crate::capture::normalize::NormalizedPath;
use mcpgen_proxy::HttpMethod;
use serde_json::Value;

/// Header list with case-insensitive lookup. Names keep their captured case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub mime_type: String,
    pub text: Option<String>,
    pub form: Vec<(String, String)>,
}

impl RequestBody {
    pub fn is_json(&self) -> bool {
        crate::core::json::is_json_mime(&self.mime_type)
            || self
                .text
                .as_deref()
                .is_some_and(crate::core::json::is_json_content)
    }

    pub fn is_form(&self) -> bool {
        !self.form.is_empty() || self.mime_type.to_ascii_lowercase().contains("form")
    }

    pub fn json(&self) -> Option<Value> {
        if !self.is_json() {
            return None;
        }
        serde_json::from_str(self.text.as_deref()?).ok()
    }

    /// Form fields from the structured params, or parsed out of urlencoded text.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        if !self.form.is_empty() {
            return self.form.clone();
        }
        match self.text.as_deref() {
            Some(text) if self.is_form() => url::form_urlencoded::parse(text.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Looks a field up in form params, urlencoded text or a JSON object.
    pub fn field(&self, name: &str) -> Option<String> {
        if let Some((_, v)) = self.form_fields().into_iter().find(|(k, _)| k == name) {
            return Some(v);
        }
        match self.json()? {
            Value::Object(map) => map.get(name).and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_empty() && self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }
}

/// One request/response pair that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedExchange {
    /// Position of the entry in the capture's `log.entries`.
    pub index: usize,
    pub method: HttpMethod,
    pub url: url::Url,
    pub path: NormalizedPath,
    pub request_headers: Headers,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub status: i64,
    pub response_headers: Headers,
    pub response_mime: Option<String>,
    pub response_example: Option<Value>,
}

impl CapturedExchange {
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// `scheme://host[:port]` of the request.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}
