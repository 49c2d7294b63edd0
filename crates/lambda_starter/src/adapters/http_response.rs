//! Turns handler output back into an HTTP response for local emulation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use serde_json::{json, Map, Value};

use crate::logging::log_warning;

const COMPONENT: &str = "response_formatter";
const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

pub type HttpResponse = Response<Full<Bytes>>;

pub fn json_http_response(status: StatusCode, body: &Value) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    build(status, headers, Bytes::from(body.to_string()))
}

/// Maps a handler's output onto an HTTP response.
///
/// Objects carrying a non-empty `statusCode` (not `0`, `""`, `false` or
/// `null`) are read as API Gateway proxy responses; any other object or list
/// is sent as JSON, and scalars are forwarded as the body. Formatting never
/// fails: unusable header entries are skipped and an unparseable body is
/// sent as-is.
pub fn format_lambda_response(output: Value) -> HttpResponse {
    match output {
        Value::Object(fields) if fields.get("statusCode").is_some_and(is_set) => {
            format_envelope(fields)
        }
        Value::Object(_) | Value::Array(_) => json_http_response(StatusCode::OK, &output),
        Value::Null => build(StatusCode::OK, HeaderMap::new(), Bytes::new()),
        Value::String(text) => {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
            build(StatusCode::OK, headers, Bytes::from(text))
        }
        scalar => json_http_response(StatusCode::OK, &scalar),
    }
}

fn format_envelope(mut fields: Map<String, Value>) -> HttpResponse {
    let status = fields
        .get("statusCode")
        .and_then(status_from_value)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    if let Some(Value::Object(entries)) = fields.get("headers") {
        for (name, value) in entries {
            if let Some((name, value)) = header_pair(name, value) {
                headers.insert(name, value);
            }
        }
    }
    if let Some(Value::Object(entries)) = fields.get("multiValueHeaders") {
        for (name, values) in entries {
            let values = match values {
                Value::Array(values) => values.as_slice(),
                single => std::slice::from_ref(single),
            };
            for value in values {
                if let Some((name, value)) = header_pair(name, value) {
                    headers.append(name, value);
                }
            }
        }
    }

    let is_base64 = fields
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let json_declared = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));

    let (body, fallback_type) = match fields.remove("body") {
        None | Some(Value::Null) => (Bytes::new(), None),
        Some(Value::String(encoded)) if is_base64 => {
            (decode_base64(encoded), Some(BINARY_CONTENT_TYPE))
        }
        Some(Value::String(text)) => {
            let body = Bytes::from(text);
            match parse_json(&body) {
                Some(parsed) => (parsed, Some(JSON_CONTENT_TYPE)),
                None => (body, Some(TEXT_CONTENT_TYPE)),
            }
        }
        Some(structured) => (Bytes::from(structured.to_string()), Some(JSON_CONTENT_TYPE)),
    };

    let body = match (json_declared, fallback_type) {
        (true, Some(BINARY_CONTENT_TYPE)) => parse_json(&body).unwrap_or(body),
        _ => body,
    };

    if let Some(fallback_type) = fallback_type {
        headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(fallback_type));
    }
    build(status, headers, body)
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn status_from_value(value: &Value) -> Option<StatusCode> {
    let code = match value {
        Value::Number(number) => u16::try_from(number.as_u64()?).ok()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    StatusCode::from_u16(code).ok()
}

fn header_pair(name: &str, value: &Value) -> Option<(HeaderName, HeaderValue)> {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(&text),
    ) {
        (Ok(name), Ok(value)) => Some((name, value)),
        _ => {
            log_warning(
                COMPONENT,
                "header_skipped",
                json!({ "name": name, "value": text }),
            );
            None
        }
    }
}

/// Undecodable input is sent as the raw string bytes.
fn decode_base64(encoded: String) -> Bytes {
    match BASE64.decode(encoded.as_bytes()) {
        Ok(decoded) => Bytes::from(decoded),
        Err(_) => Bytes::from(encoded),
    }
}

/// Compact JSON text of `body`, when it parses.
fn parse_json(body: &Bytes) -> Option<Bytes> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .map(|parsed| Bytes::from(parsed.to_string()))
}

fn build(status: StatusCode, headers: HeaderMap, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
