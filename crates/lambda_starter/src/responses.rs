use lambda_starter_core::contract::ResponseEnvelope;
use serde_json::Value;

use crate::config::AppConfig;

pub fn json_response(status_code: u16, body: &Value) -> ResponseEnvelope {
    ResponseEnvelope::new(status_code, body.to_string())
}

pub fn redirect(location: &str) -> ResponseEnvelope {
    ResponseEnvelope::new(302, "").with_header("Location", location)
}

/// Sends an unauthenticated caller to the configured error page.
pub fn auth_error(config: &AppConfig) -> ResponseEnvelope {
    redirect(&config.auth_error_redirect_url)
}
