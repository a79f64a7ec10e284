use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, Request, State};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::any, routing::get};

use super::classes::ClassRosterHandler;
use super::journal::JournalHandler;
use super::request::HandlerRequest;
use super::response::{ApiError, HandlerResponse};
use crate::config::DatabaseConfig;

pub struct AppState {
    pub classes: ClassRosterHandler,
    pub journal: JournalHandler,
}

impl AppState {
    #[must_use]
    pub fn new(database: DatabaseConfig) -> Self {
        Self {
            classes: ClassRosterHandler::new(database.clone()),
            journal: JournalHandler::new(database),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn to_handler_request(
    method: Method,
    query: HashMap<String, String>,
    body: String,
) -> HandlerRequest {
    HandlerRequest {
        method,
        query,
        body: (!body.is_empty()).then_some(body),
    }
}

/// Runs a synchronous handler off the async runtime.
async fn run_blocking<F>(f: F) -> Response
where
    F: FnOnce() -> HandlerResponse + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(resp) => resp.into_response(),
        Err(e) => {
            tracing::error!("Handler task failed: {e}");
            ApiError::internal("Internal server error").into_response()
        }
    }
}

async fn classes(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let request = to_handler_request(method, query, body);
    run_blocking(move || state.classes.handle(&request)).await
}

async fn journal(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let request = to_handler_request(method, query, body);
    run_blocking(move || state.journal.handle(&request)).await
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classes", any(classes))
        .route("/journal", any(journal))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
