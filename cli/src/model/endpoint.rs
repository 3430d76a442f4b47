use crate::capture::exchange::{CapturedExchange, RequestBody};
use crate::capture::normalize::PathParam;
use indexmap::IndexMap;
use mcpgen_proxy::HttpMethod;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Request body shape observed for an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "encoding", content = "example", rename_all = "snake_case")]
pub enum BodyExample {
    Json(Value),
    Form(Vec<(String, String)>),
    Raw(String),
}

impl BodyExample {
    pub fn from_body(body: &RequestBody) -> Self {
        if let Some(value) = body.json() {
            return BodyExample::Json(value);
        }
        let fields = body.form_fields();
        if body.is_form() && !fields.is_empty() {
            return BodyExample::Form(fields);
        }
        BodyExample::Raw(body.text.clone().unwrap_or_default())
    }

    fn is_json_object(&self) -> bool {
        matches!(self, BodyExample::Json(Value::Object(_)))
    }
}

fn method_name<S: Serializer>(method: &HttpMethod, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// One `(method, normalized path)` operation of the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEndpoint {
    pub tool_name: String,
    #[serde(serialize_with = "method_name")]
    pub method: HttpMethod,
    pub path: String,
    pub path_parameters: Vec<PathParam>,
    /// Query name to distinct example values, in first-seen order.
    pub query_parameters: IndexMap<String, Vec<String>>,
    pub has_request_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<BodyExample>,
    pub response_status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_example: Option<Value>,
    pub calls: usize,
}

fn is_success(status: i64) -> bool {
    (200..300).contains(&status)
}

impl ApiEndpoint {
    /// Starts an endpoint from its first exchange. The tool name is assigned
    /// once all endpoints are known.
    pub fn first_seen(exchange: &CapturedExchange) -> Self {
        Self {
            tool_name: String::new(),
            method: exchange.method,
            path: exchange.path.template.clone(),
            path_parameters: exchange.path.params.clone(),
            query_parameters: IndexMap::new(),
            has_request_body: false,
            request_body: None,
            response_status: exchange.status,
            response_example: None,
            calls: 0,
        }
    }

    pub fn observe(
        &mut self,
        exchange: &CapturedExchange,
        max_query_examples: usize,
        excluded_query: Option<&str>,
    ) {
        self.calls += 1;

        for (name, value) in &exchange.query {
            if excluded_query.is_some_and(|excluded| excluded.eq_ignore_ascii_case(name)) {
                continue;
            }
            let examples = self.query_parameters.entry(name.clone()).or_default();
            if examples.len() < max_query_examples && !examples.contains(value) {
                examples.push(value.clone());
            }
        }

        if let Some(body) = exchange.body.as_ref().filter(|_| exchange.has_body()) {
            self.has_request_body = true;
            let example = BodyExample::from_body(body);
            let replace = match &self.request_body {
                None => true,
                Some(current) => !current.is_json_object() && example.is_json_object(),
            };
            if replace {
                self.request_body = Some(example);
            }
        }

        let first_success = is_success(exchange.status) && !is_success(self.response_status);
        if first_success {
            self.response_status = exchange.status;
            self.response_example = None;
        }
        if self.response_example.is_none() && exchange.status == self.response_status {
            self.response_example = exchange.response_example.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::exchange::Headers;
    use crate::capture::normalize::{PathNormalizer, SegmentSettings};
    use serde_json::json;

    fn exchange(url: &str, status: i64, body: Option<(&str, &str)>, example: Option<Value>) -> CapturedExchange {
        let url = url::Url::parse(url).unwrap();
        CapturedExchange {
            index: 0,
            method: HttpMethod::POST,
            path: PathNormalizer::new(&SegmentSettings::default())
                .unwrap()
                .normalize(url.path()),
            query: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            url,
            request_headers: Headers::default(),
            body: body.map(|(mime, text)| RequestBody {
                mime_type: mime.to_string(),
                text: Some(text.to_string()),
                form: Vec::new(),
            }),
            status,
            response_headers: Headers::default(),
            response_mime: None,
            response_example: example,
        }
    }

    #[test]
    fn test_query_examples_are_distinct_and_bounded() {
        let mut endpoint = ApiEndpoint::first_seen(&exchange("https://x.io/api/items", 200, None, None));
        for page in ["1", "2", "2", "3"] {
            endpoint.observe(
                &exchange(&format!("https://x.io/api/items?page={page}&api_key=k"), 200, None, None),
                2,
                Some("API_KEY"),
            );
        }
        assert_eq!(endpoint.calls, 4);
        assert_eq!(endpoint.query_parameters.len(), 1);
        assert_eq!(endpoint.query_parameters["page"], vec!["1", "2"]);
    }

    #[test]
    fn test_json_object_body_is_preferred() {
        let mut endpoint = ApiEndpoint::first_seen(&exchange("https://x.io/api/notes", 201, None, None));
        endpoint.observe(&exchange("https://x.io/api/notes", 201, Some(("text/plain", "hello")), None), 5, None);
        endpoint.observe(
            &exchange("https://x.io/api/notes", 201, Some(("application/json", r#"{"title":"t"}"#)), None),
            5,
            None,
        );
        assert!(endpoint.has_request_body);
        assert_eq!(endpoint.request_body, Some(BodyExample::Json(json!({"title": "t"}))));
    }

    #[test]
    fn test_form_body() {
        let body = RequestBody {
            mime_type: "application/x-www-form-urlencoded".to_string(),
            text: Some("a=1&b=two".to_string()),
            form: Vec::new(),
        };
        assert_eq!(
            BodyExample::from_body(&body),
            BodyExample::Form(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two".to_string())
            ])
        );
    }

    #[test]
    fn test_successful_response_wins() {
        let mut endpoint = ApiEndpoint::first_seen(&exchange("https://x.io/api/me", 401, None, None));
        endpoint.observe(&exchange("https://x.io/api/me", 401, None, Some(json!({"error": "no"}))), 5, None);
        endpoint.observe(&exchange("https://x.io/api/me", 200, None, Some(json!({"id": 1}))), 5, None);
        endpoint.observe(&exchange("https://x.io/api/me", 200, None, Some(json!({"id": 2}))), 5, None);
        assert_eq!(endpoint.response_status, 200);
        assert_eq!(endpoint.response_example, Some(json!({"id": 1})));
    }
}
