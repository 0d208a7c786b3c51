use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::error::{RepairError, ServiceError};
use crate::model::{FinishReason, PayloadKind};
use crate::observability::{log_repair_complete, log_repair_failure};
use crate::repair::{RepairReport, Repaired, ResponseRepairer};
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body accepted by both repair endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRequest {
    /// The model's `response.text`; `null` or missing means empty.
    #[serde(default)]
    pub text: Option<String>,
    /// Upstream finish reason, e.g. `STOP` or `MAX_TOKENS`.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Serialize)]
struct RepairResponse<'a, T> {
    result: &'a T,
    repair: RepairReport,
}

/// `POST /v1/study-bundle`
#[must_use]
pub fn study_bundle_handler(State(state): State<Arc<AppState>>, body: &[u8]) -> Response {
    handle(
        &state,
        PayloadKind::StudyBundle,
        body,
        ResponseRepairer::parse_study_bundle,
    )
}

/// `POST /v1/quiz-bundle`
#[must_use]
pub fn quiz_bundle_handler(State(state): State<Arc<AppState>>, body: &[u8]) -> Response {
    handle(
        &state,
        PayloadKind::QuizBundle,
        body,
        ResponseRepairer::parse_quiz_bundle,
    )
}

fn handle<T, F>(state: &AppState, kind: PayloadKind, body: &[u8], run: F) -> Response
where
    T: Serialize,
    F: FnOnce(&ResponseRepairer, Option<&str>, &FinishReason) -> Result<Repaired<T>, RepairError>,
{
    let request_id = state.next_request_id();
    let start = Instant::now();

    let request: RepairRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!("rejecting {} request {request_id}: {err}", kind.as_str());
            let err = ServiceError::InvalidRequest(format!("body is not a repair request: {err}"));
            return with_request_id(err.into_response(), &request_id);
        }
    };
    let finish = FinishReason::from_optional(request.finish_reason.as_deref());

    let response = match run(&state.repairer, request.text.as_deref(), &finish) {
        Ok(repaired) => {
            log_repair_complete(&request_id, kind, &repaired.report, start.elapsed());
            Json(RepairResponse {
                result: &repaired.value,
                repair: repaired.report,
            })
            .into_response()
        }
        Err(err) => {
            log_repair_failure(&request_id, kind, &err);
            ServiceError::from(err).into_response()
        }
    };
    with_request_id(response, &request_id)
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
