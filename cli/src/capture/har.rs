//! Serde model of the subset of HAR 1.2 the generator reads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct HarDocument {
    pub log: HarLog,
}

/// Entries stay raw so that one malformed entry does not reject the file.
#[derive(Debug, Deserialize)]
pub struct HarLog {
    pub entries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HarEntry {
    pub request: HarRequest,
    pub response: HarResponse,
}

#[derive(Debug, Deserialize)]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HarNameValue>,
    #[serde(rename = "postData")]
    pub post_data: Option<HarPostData>,
}

#[derive(Debug, Deserialize)]
pub struct HarNameValue {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct HarPostData {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    pub text: Option<String>,
    #[serde(default)]
    pub params: Vec<HarParam>,
}

#[derive(Debug, Deserialize)]
pub struct HarParam {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub headers: Vec<HarNameValue>,
    #[serde(default)]
    pub content: HarContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct HarContent {
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub text: Option<String>,
    pub encoding: Option<String>,
}

impl HarContent {
    /// Body text, decoding base64-encoded content. Binary bodies yield `None`.
    pub fn decoded_text(&self) -> Option<String> {
        let text = self.text.as_deref()?;
        match self.encoding.as_deref() {
            Some(encoding) if encoding.eq_ignore_ascii_case("base64") => STANDARD
                .decode(text.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok()),
            _ => Some(text.to_string()),
        }
    }
}
