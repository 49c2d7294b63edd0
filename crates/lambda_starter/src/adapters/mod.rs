pub mod fixtures;
pub mod http_response;
pub mod lambda_context;
pub mod web_request;
