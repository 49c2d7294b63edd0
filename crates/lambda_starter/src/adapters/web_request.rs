//! Normalizes a live HTTP request into the API Gateway proxy event shape.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use lambda_starter_core::clock::{epoch_millis, iso_timestamp};
use lambda_starter_core::context::random_token;
use lambda_starter_core::contract::CanonicalEvent;
use serde_json::{json, Map, Value};
use thiserror::Error;

const LOCAL_STAGE: &str = "local";
const REQUEST_ID_ENTROPY_LEN: usize = 9;

/// Request-level failures, reported by the server as a 500 before the
/// handler runs.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid JSON body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("failed to read request body: {0}")]
    Body(String),
}

/// An owned HTTP request, independent of the server framework.
#[derive(Debug, Clone, Default)]
pub struct WebRequest {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    /// Header pairs in arrival order; names may repeat.
    pub headers: Vec<(String, String)>,
    pub path_parameters: Map<String, Value>,
    pub body: Bytes,
}

impl WebRequest {
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts
                .headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
            path_parameters: Map::new(),
            body,
        }
    }

    pub fn into_canonical_event(self) -> Result<CanonicalEvent, RequestError> {
        let mut headers = Map::new();
        for (name, value) in &self.headers {
            push_grouped(&mut headers, name.to_ascii_lowercase(), value.clone());
        }

        let mut query = Map::new();
        if let Some(raw) = self.query.as_deref() {
            for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
                push_grouped(&mut query, key.into_owned(), value.into_owned());
            }
        }

        let body = normalize_body(&self.body, content_type(&headers).as_deref())?;
        let request_id = format!(
            "local-{}-{}",
            epoch_millis(),
            random_token(REQUEST_ID_ENTROPY_LEN)
        );

        Ok(CanonicalEvent::new(json!({
            "httpMethod": self.method,
            "path": self.path,
            "pathParameters": self.path_parameters,
            "queryStringParameters": query,
            "multiValueQueryStringParameters": multi_valued(&query),
            "headers": headers,
            "multiValueHeaders": multi_valued(&headers),
            "body": body,
            "isBase64Encoded": false,
            "requestContext": {
                "requestId": request_id,
                "requestTime": iso_timestamp(),
                "path": self.path,
                "httpMethod": self.method,
                "stage": LOCAL_STAGE,
            },
        })))
    }
}

/// Inserts `value` under `key`, turning a repeated key into a list of its
/// values in arrival order.
fn push_grouped(map: &mut Map<String, Value>, key: String, value: String) {
    match map.get_mut(&key) {
        None => {
            map.insert(key, Value::String(value));
        }
        Some(Value::Array(values)) => values.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
    }
}

fn multi_valued(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let values = match value {
                Value::Array(_) => value.clone(),
                single => Value::Array(vec![single.clone()]),
            };
            (key.clone(), values)
        })
        .collect()
}

fn content_type(headers: &Map<String, Value>) -> Option<String> {
    let raw = match headers.get(CONTENT_TYPE.as_str())? {
        Value::Array(values) => values.first()?.as_str()?,
        value => value.as_str()?,
    };
    raw.split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase())
}

fn normalize_body(body: &[u8], content_type: Option<&str>) -> Result<String, RequestError> {
    if body.is_empty() {
        return Ok(String::new());
    }

    match content_type {
        Some("application/json") => {
            let parsed: Value = serde_json::from_slice(body).map_err(RequestError::InvalidBody)?;
            Ok(parsed.to_string())
        }
        Some("application/x-www-form-urlencoded") => {
            let mut fields = Map::new();
            for (key, value) in form_urlencoded::parse(body) {
                push_grouped(&mut fields, key.into_owned(), value.into_owned());
            }
            Ok(Value::Object(fields).to_string())
        }
        _ => Ok(String::from_utf8_lossy(body).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use lambda_starter_core::dispatch::{classify_event, KIND_WEB};

    use super::*;

    fn request(method: &str, uri: &str, headers: &[(&str, &str)], body: &str) -> WebRequest {
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        WebRequest::from_parts(&parts, Bytes::from(body.to_string()))
    }

    #[test]
    fn maps_request_line_and_query() {
        let event = request("GET", "/users/42?sort=asc&tag=a&tag=b", &[], "")
            .into_canonical_event()
            .expect("normalizes");

        assert_eq!(classify_event(&event), KIND_WEB);
        let value = event.as_value();
        assert_eq!(value["httpMethod"], "GET");
        assert_eq!(value["path"], "/users/42");
        assert_eq!(value["pathParameters"], json!({}));
        assert_eq!(
            value["queryStringParameters"],
            json!({"sort": "asc", "tag": ["a", "b"]})
        );
        assert_eq!(
            value["multiValueQueryStringParameters"],
            json!({"sort": ["asc"], "tag": ["a", "b"]})
        );
        assert_eq!(value["body"], "");
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["requestContext"]["stage"], "local");
        assert_eq!(value["requestContext"]["path"], "/users/42");
        assert_eq!(value["requestContext"]["httpMethod"], "GET");
    }

    #[test]
    fn repeated_headers_become_lists() {
        let event = request(
            "GET",
            "/",
            &[("Accept", "text/html"), ("X-Trace", "a"), ("x-trace", "b")],
            "",
        )
        .into_canonical_event()
        .expect("normalizes");

        let value = event.as_value();
        assert_eq!(value["headers"]["accept"], "text/html");
        assert_eq!(value["headers"]["x-trace"], json!(["a", "b"]));
        assert_eq!(value["multiValueHeaders"]["accept"], json!(["text/html"]));
    }

    #[test]
    fn json_body_is_reserialized_compactly() {
        let event = request(
            "POST",
            "/orders",
            &[("Content-Type", "application/json; charset=utf-8")],
            "{ \"id\" : 7,\n \"items\": [1, 2] }",
        )
        .into_canonical_event()
        .expect("normalizes");

        let body = event.as_value()["body"].as_str().expect("body is a string");
        let parsed: Value = serde_json::from_str(body).expect("body is json text");
        assert_eq!(parsed, json!({"id": 7, "items": [1, 2]}));
        assert!(!body.contains('\n'));
    }

    #[test]
    fn malformed_json_body_is_rejected() {
        let error = request(
            "POST",
            "/orders",
            &[("Content-Type", "application/json")],
            "{\"id\":",
        )
        .into_canonical_event()
        .expect_err("body is not json");

        assert!(matches!(error, RequestError::InvalidBody(_)));
    }

    #[test]
    fn form_body_is_decoded_to_json_text() {
        let event = request(
            "POST",
            "/login",
            &[("Content-Type", "application/x-www-form-urlencoded")],
            "user=ada+lovelace&role=admin&role=dev",
        )
        .into_canonical_event()
        .expect("normalizes");

        let body: Value = serde_json::from_str(
            event.as_value()["body"].as_str().expect("body is a string"),
        )
        .expect("body is json text");
        assert_eq!(body, json!({"user": "ada lovelace", "role": ["admin", "dev"]}));
    }

    #[test]
    fn other_bodies_pass_through_as_text() {
        let event = request("PUT", "/notes", &[("Content-Type", "text/plain")], "hello")
            .into_canonical_event()
            .expect("normalizes");

        assert_eq!(event.as_value()["body"], "hello");
    }

    #[test]
    fn each_request_gets_its_own_request_id() {
        let first = request("GET", "/", &[], "").into_canonical_event().expect("first");
        let second = request("GET", "/", &[], "").into_canonical_event().expect("second");

        let first_id = first.as_value()["requestContext"]["requestId"]
            .as_str()
            .expect("request id");
        assert!(first_id.starts_with("local-"));
        assert_ne!(
            first.as_value()["requestContext"]["requestId"],
            second.as_value()["requestContext"]["requestId"]
        );
    }
}
