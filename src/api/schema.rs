use axum::response::Json;
use serde_json::Value;

use crate::model::schema::{quiz_bundle_schema, study_bundle_schema};
use crate::model::PayloadKind;

/// `GET /v1/schemas/{study-bundle|quiz-bundle}`
#[must_use]
pub fn schema_handler(kind: PayloadKind) -> Json<Value> {
    Json(match kind {
        PayloadKind::StudyBundle => study_bundle_schema(),
        PayloadKind::QuizBundle => quiz_bundle_schema(),
    })
}
