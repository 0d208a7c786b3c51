use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns JSON with status and config summary.
pub fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "studyrepair-rs is running",
        "config": {
            "base_path": config.server.base_path,
            "max_body_bytes": config.server.max_body_bytes,
            "repair": {
                "snippet_max_bytes": state.repairer.snippet_max_bytes(),
                "latex_tails": state.repairer.table().tail_count(),
                "extra_latex_tails": config.repair.extra_latex_tails.len(),
            },
            "features": {
                "log_level": config.features.log_level,
            }
        }
    }))
}
