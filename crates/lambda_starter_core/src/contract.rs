use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_TYPE: &str = "type";
pub const FIELD_RECORDS: &str = "Records";
pub const FIELD_HTTP_METHOD: &str = "httpMethod";
pub const FIELD_DATA: &str = "data";

/// An inbound event in the one shape every trigger is normalized to.
///
/// The wrapped document is kept verbatim so native payloads and fixtures pass
/// through untouched. Every field is optional; read them through the
/// accessors rather than assuming a trigger kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CanonicalEvent(Value);

impl CanonicalEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(Value::Object(fields))
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Explicit `type` tag, when it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.field(FIELD_TYPE).and_then(Value::as_str)
    }

    pub fn records(&self) -> Option<&Vec<Value>> {
        self.field(FIELD_RECORDS).and_then(Value::as_array)
    }

    pub fn http_method(&self) -> Option<&Value> {
        self.field(FIELD_HTTP_METHOD).filter(|value| !value.is_null())
    }

    /// Processing payload; an explicit `null` counts as absent.
    pub fn data(&self) -> Option<&Value> {
        self.field(FIELD_DATA).filter(|value| !value.is_null())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for CanonicalEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Transport response in the API Gateway proxy shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_headers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl ResponseEnvelope {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: None,
            multi_value_headers: None,
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds one more value under `name`; repeated calls produce a repeated
    /// header such as `Set-Cookie`.
    pub fn with_multi_value_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.multi_value_headers
            .get_or_insert_with(BTreeMap::new)
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}
