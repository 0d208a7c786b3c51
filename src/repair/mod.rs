//! Recovery of JSON payloads from raw model output.
//!
//! The flow for one response is: strip code fences ([`extract`]), parse, and
//! on failure double the backslashes that are not valid JSON escapes
//! ([`escape`]) and parse again. Whichever parse succeeds, the tree is then
//! walked to rebuild LaTeX commands the parser silently turned into control
//! characters ([`latex`]).

pub mod escape;
pub mod extract;
pub mod latex;
pub mod pipeline;

use std::sync::LazyLock;

pub use escape::double_invalid_backslashes;
pub use extract::{extract_json_payload, ExtractSource, Extracted, PayloadShape};
pub use latex::{ControlChar, LatexRepairTable, LatexTail};
pub use pipeline::{ParseStage, RepairReport, Repaired, ResponseRepairer};

use crate::error::RepairError;
use crate::model::{FinishReason, QuizQuestion, StudyBundle};

static DEFAULT_REPAIRER: LazyLock<ResponseRepairer> = LazyLock::new(ResponseRepairer::default);

/// Parse a study-plan response with the built-in LaTeX table.
///
/// `finish_reason` is the upstream provider's finish-reason string; it only
/// selects the error message.
///
/// # Errors
///
/// Returns [`RepairError::MalformedResponse`] when the response cannot be
/// recovered.
pub fn parse_study_bundle(raw: &str, finish_reason: &str) -> Result<StudyBundle, RepairError> {
    DEFAULT_REPAIRER
        .parse_study_bundle(Some(raw), &FinishReason::from_wire(finish_reason))
        .map(|repaired| repaired.value)
}

/// Parse a quiz response with the built-in LaTeX table.
///
/// # Errors
///
/// Returns [`RepairError::MalformedResponse`] when the response cannot be
/// recovered.
pub fn parse_quiz_bundle(raw: &str, finish_reason: &str) -> Result<Vec<QuizQuestion>, RepairError> {
    DEFAULT_REPAIRER
        .parse_quiz_bundle(Some(raw), &FinishReason::from_wire(finish_reason))
        .map(|repaired| repaired.value)
}
