use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use lambda_starter::config::AppConfig;
use lambda_starter::handlers::event::EventHandler;
use lambda_starter::local::LocalState;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Local server state backed by a throwaway events directory.
pub struct TestServer {
    pub state: LocalState,
    _events: TempDir,
}

pub fn test_server() -> TestServer {
    test_server_in("development")
}

pub fn test_server_in(environment: &str) -> TestServer {
    build_server(environment, EventHandler::default())
}

pub fn test_server_with(handler: EventHandler) -> TestServer {
    build_server("development", handler)
}

fn build_server(environment: &str, handler: EventHandler) -> TestServer {
    let events = tempfile::tempdir().expect("tempdir");
    write_fixture(
        &events,
        "example-event.json",
        &json!({
            "type": "example",
            "data": [
                {"id": 1, "name": "Item 1"},
                {"id": 2, "name": "Item 2"}
            ]
        }),
    );
    write_fixture(
        &events,
        "single-item-event.json",
        &json!({"type": "example", "data": {"id": 7, "name": "Solo"}}),
    );
    write_fixture(
        &events,
        "sqs-event.json",
        &json!({"Records": [{"messageId": "m-1", "eventSource": "aws:sqs", "body": "{}"}]}),
    );
    write_fixture(&events, "missing-data-event.json", &json!({"type": "example"}));
    write_fixture(
        &events,
        "my event.json",
        &json!({"type": "example", "data": {"id": 9, "name": "Spaced"}}),
    );

    let config = AppConfig {
        events_dir: events.path().to_path_buf(),
        environment: environment.to_string(),
        ..AppConfig::default()
    };
    TestServer {
        state: LocalState::new(config, handler),
        _events: events,
    }
}

fn write_fixture(events: &TempDir, name: &str, body: &Value) {
    std::fs::write(events.path().join(name), body.to_string()).expect("write fixture");
}

pub fn get(uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .expect("valid request")
}

pub fn post(uri: &str, content_type: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("valid request")
}

pub async fn json_body(response: Response<Full<Bytes>>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("full body is infallible")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is json")
}
