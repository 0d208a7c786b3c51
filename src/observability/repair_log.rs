use std::time::Duration;

use tracing::{error, info};

use crate::error::RepairError;
use crate::model::PayloadKind;
use crate::repair::RepairReport;

/// Log a successfully recovered payload at INFO level.
pub fn log_repair_complete(
    request_id: &str,
    kind: PayloadKind,
    report: &RepairReport,
    duration: Duration,
) {
    info!(
        request_id = request_id,
        kind = kind.as_str(),
        source = ?report.source,
        stage = ?report.stage,
        escapes_doubled = report.escapes_doubled,
        latex_fixes = report.latex_fixes,
        duration_seconds = duration.as_secs_f64(),
        "repair completed"
    );
}

/// Log an unrecoverable payload at ERROR level, including the bounded raw
/// snippet. Server-side only.
pub fn log_repair_failure(request_id: &str, kind: PayloadKind, err: &RepairError) {
    error!(
        request_id = request_id,
        kind = kind.as_str(),
        cause = err.cause().as_str(),
        detail = err.detail(),
        snippet = err.snippet(),
        "repair failed"
    );
}
