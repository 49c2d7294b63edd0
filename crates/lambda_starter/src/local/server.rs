use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use lambda_starter_core::context::ExecutionContext;
use lambda_starter_core::contract::{CanonicalEvent, ResponseEnvelope};
use percent_encoding::percent_decode_str;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::adapters::fixtures::{load_fixture, DEFAULT_FIXTURE};
use crate::adapters::http_response::{format_lambda_response, json_http_response, HttpResponse};
use crate::adapters::web_request::{RequestError, WebRequest};
use crate::config::AppConfig;
use crate::handlers::event::{error_envelope, EventHandler};
use crate::logging::{log_error, log_info, log_warning};

const COMPONENT: &str = "local_server";
pub const SERVER_ERROR_MESSAGE: &str = "Error invoking Lambda handler";

/// Everything a request needs; shared read-only across connections.
#[derive(Debug)]
pub struct LocalState {
    pub config: AppConfig,
    pub handler: Arc<EventHandler>,
}

impl LocalState {
    pub fn new(config: AppConfig, handler: EventHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Runs the synchronous handler on the blocking pool, off the connection
    /// tasks.
    async fn handle(
        &self,
        event: CanonicalEvent,
        context: &ExecutionContext,
    ) -> ResponseEnvelope {
        let handler = Arc::clone(&self.handler);
        let task_context = context.clone();
        let task = tokio::task::spawn_blocking(move || handler.handle(&event, &task_context));
        match task.await {
            Ok(envelope) => envelope,
            Err(error) => {
                log_error(
                    COMPONENT,
                    "handler_task_failed",
                    json!({
                        "request_id": context.request_id.clone(),
                        "message": error.to_string(),
                    }),
                );
                error_envelope(context)
            }
        }
    }
}

/// Answers one HTTP request and writes its access log line.
pub async fn route<B>(state: &LocalState, request: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/help") => json_http_response(StatusCode::OK, &help_document()),
        (&Method::GET, "/health") => json_http_response(StatusCode::OK, &json!({"status": "ok"})),
        (&Method::GET, _) if fixture_route(&path).is_some() => {
            let name = fixture_route(&path).flatten().map(decode_segment);
            invoke_fixture(state, name.as_deref()).await
        }
        _ => invoke_web_request(state, request).await,
    };

    log_info(
        COMPONENT,
        "request_completed",
        json!({
            "method": method.as_str(),
            "path": path,
            "status": response.status().as_u16(),
            "elapsed_ms": started.elapsed().as_millis() as u64,
        }),
    );
    response
}

/// `/invoke` and `/invoke/` select the default fixture, `/invoke/<name>` a
/// named one. Deeper paths are not fixture routes.
fn fixture_route(path: &str) -> Option<Option<&str>> {
    let rest = path.strip_prefix("/invoke")?;
    match rest {
        "" | "/" => Some(None),
        _ => {
            let name = rest.strip_prefix('/')?;
            (!name.contains('/')).then_some(Some(name))
        }
    }
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

async fn invoke_fixture(state: &LocalState, name: Option<&str>) -> HttpResponse {
    let context = ExecutionContext::local();
    let envelope = match load_fixture(&state.config.events_dir, name).await {
        Ok(event) => state.handle(event, &context).await,
        Err(error) => {
            log_error(
                COMPONENT,
                "fixture_load_failed",
                json!({
                    "request_id": context.request_id.clone(),
                    "fixture": name.unwrap_or(DEFAULT_FIXTURE),
                    "kind": error.kind(),
                    "message": error.to_string(),
                }),
            );
            error_envelope(&context)
        }
    };
    envelope_response(state, &envelope)
}

async fn invoke_web_request<B>(state: &LocalState, request: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    match normalize_request(request).await {
        Ok(event) => {
            let context = ExecutionContext::local();
            let envelope = state.handle(event, &context).await;
            envelope_response(state, &envelope)
        }
        Err(error) => {
            log_error(
                COMPONENT,
                "request_rejected",
                json!({ "message": error.to_string() }),
            );
            server_error(&state.config, &error)
        }
    }
}

async fn normalize_request<B>(request: Request<B>) -> Result<CanonicalEvent, RequestError>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let (parts, body) = request.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|error| RequestError::Body(error.to_string()))?
        .to_bytes();
    WebRequest::from_parts(&parts, body).into_canonical_event()
}

fn envelope_response(state: &LocalState, envelope: &ResponseEnvelope) -> HttpResponse {
    match serde_json::to_value(envelope) {
        Ok(output) => format_lambda_response(output),
        Err(error) => server_error(&state.config, &error),
    }
}

fn server_error(config: &AppConfig, error: &(dyn StdError + 'static)) -> HttpResponse {
    let mut body = json!({
        "error": SERVER_ERROR_MESSAGE,
        "message": error.to_string(),
    });
    if !config.is_production() {
        body["stack"] = Value::String(format!("{error:?}"));
    }
    json_http_response(StatusCode::INTERNAL_SERVER_ERROR, &body)
}

fn help_document() -> Value {
    json!({
        "message": "Local Lambda emulation server",
        "routes": [
            {
                "method": "GET",
                "path": "/invoke",
                "description": format!("Invoke the handler with {DEFAULT_FIXTURE}"),
            },
            {
                "method": "GET",
                "path": "/invoke/:eventName",
                "description": "Invoke the handler with a named file from the events directory",
            },
            {
                "method": "GET",
                "path": "/health",
                "description": "Liveness check",
            },
            {
                "method": "GET",
                "path": "/help",
                "description": "This document",
            },
            {
                "method": "ANY",
                "path": "/*",
                "description": "Any other request is converted to an API Gateway proxy event",
            },
        ],
    })
}

/// Serves until Ctrl-C. Each connection runs on its own task.
pub async fn serve(config: AppConfig, handler: EventHandler) -> std::io::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    log_info(
        COMPONENT,
        "server_started",
        json!({
            "address": address.to_string(),
            "events_dir": config.events_dir.display().to_string(),
            "environment": config.environment.clone(),
        }),
    );

    let state = Arc::new(LocalState::new(config, handler));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(connection) => connection,
                    Err(error) => {
                        log_warning(COMPONENT, "accept_failed", json!({ "message": error.to_string() }));
                        continue;
                    }
                };
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let service = service_fn(move |request| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(route(&state, request).await) }
                    });
                    if let Err(error) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        log_warning(
                            COMPONENT,
                            "connection_failed",
                            json!({ "peer": peer.to_string(), "message": error.to_string() }),
                        );
                    }
                });
            }
            _ = &mut shutdown => {
                log_info(COMPONENT, "server_stopping", json!({ "reason": "ctrl_c" }));
                break;
            }
        }
    }

    Ok(())
}
