use std::convert::Infallible;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::{health, repair, schema};
use crate::model::PayloadKind;
use crate::state::AppState;

enum RouteMatch {
    Health,
    StudyBundle,
    QuizBundle,
    Schema(PayloadKind),
    MethodNotAllowed,
    NotFound,
}

/// Dispatch a raw HTTP request to the matching handler.
///
/// # Errors
///
/// This function currently never returns `Err` and uses `Infallible`.
pub async fn dispatch_request(
    state: Arc<AppState>,
    base_path: Arc<str>,
    request: Request<Body>,
) -> Result<Response, Infallible> {
    let (parts, body) = request.into_parts();
    let route = match_route(&parts.method, parts.uri.path(), base_path.as_ref());

    let response = match route {
        RouteMatch::Health => health::health_handler(State(state)).into_response(),
        RouteMatch::StudyBundle => {
            let body_bytes = match read_request_body(body, state.config.server.max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(response) => return Ok(response),
            };
            repair::study_bundle_handler(State(state), &body_bytes)
        }
        RouteMatch::QuizBundle => {
            let body_bytes = match read_request_body(body, state.config.server.max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(response) => return Ok(response),
            };
            repair::quiz_bundle_handler(State(state), &body_bytes)
        }
        RouteMatch::Schema(kind) => schema::schema_handler(kind).into_response(),
        RouteMatch::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        RouteMatch::NotFound => StatusCode::NOT_FOUND.into_response(),
    };

    Ok(response)
}

#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("/{}", trimmed.trim_end_matches('/'))
    }
}

async fn read_request_body(body: Body, limit: usize) -> Result<bytes::Bytes, Response> {
    body::to_bytes(body, limit).await.map_err(|_| {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body too large (max {limit} bytes)"),
        )
            .into_response()
    })
}

fn match_route(method: &Method, path: &str, base_path: &str) -> RouteMatch {
    let Some(path) = strip_base_path(path, base_path) else {
        return RouteMatch::NotFound;
    };

    let (route, allowed) = match path {
        "/" | "/health" => (RouteMatch::Health, Method::GET),
        "/v1/study-bundle" => (RouteMatch::StudyBundle, Method::POST),
        "/v1/quiz-bundle" => (RouteMatch::QuizBundle, Method::POST),
        "/v1/schemas/study-bundle" => (RouteMatch::Schema(PayloadKind::StudyBundle), Method::GET),
        "/v1/schemas/quiz-bundle" => (RouteMatch::Schema(PayloadKind::QuizBundle), Method::GET),
        _ => return RouteMatch::NotFound,
    };

    if *method == allowed {
        route
    } else {
        RouteMatch::MethodNotAllowed
    }
}

fn strip_base_path<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    if base_path.is_empty() {
        return Some(path);
    }

    let remainder = path.strip_prefix(base_path)?;
    if remainder.is_empty() {
        Some("/")
    } else if remainder.starts_with('/') {
        Some(remainder)
    } else {
        None
    }
}
