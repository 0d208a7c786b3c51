use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::error::{MalformedCause, RepairError};
use crate::model::quiz::QuizPayload;
use crate::model::{FinishReason, QuizQuestion, StudyBundle};
use crate::util::truncate_at_char_boundary;

use super::escape::double_invalid_backslashes;
use super::extract::{extract_json_payload, ExtractSource, PayloadShape};
use super::latex::LatexRepairTable;

pub const DEFAULT_SNIPPET_MAX_BYTES: usize = 1500;

/// Which parse attempt produced the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Direct,
    BackslashRepaired,
}

/// What the pipeline had to do to recover a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    pub source: ExtractSource,
    pub stage: ParseStage,
    pub escapes_doubled: usize,
    pub latex_fixes: usize,
}

impl RepairReport {
    /// Whether any text was changed on the way to the result.
    #[must_use]
    pub fn was_repaired(&self) -> bool {
        self.stage == ParseStage::BackslashRepaired || self.latex_fixes > 0
    }
}

/// A recovered payload together with its [`RepairReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub value: T,
    pub report: RepairReport,
}

/// Turns raw model text into clean, typed payloads.
///
/// Immutable after construction; share it behind an `Arc` across requests.
#[derive(Debug)]
pub struct ResponseRepairer {
    table: LatexRepairTable,
    snippet_max_bytes: usize,
}

impl Default for ResponseRepairer {
    fn default() -> Self {
        Self::new(LatexRepairTable::seed(), DEFAULT_SNIPPET_MAX_BYTES)
    }
}

impl ResponseRepairer {
    #[must_use]
    pub fn new(table: LatexRepairTable, snippet_max_bytes: usize) -> Self {
        Self {
            table,
            snippet_max_bytes,
        }
    }

    #[must_use]
    pub fn table(&self) -> &LatexRepairTable {
        &self.table
    }

    #[must_use]
    pub fn snippet_max_bytes(&self) -> usize {
        self.snippet_max_bytes
    }

    /// Extract, parse (with backslash fallback) and deep-repair `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::MalformedResponse`] when the candidate text does
    /// not parse even after backslash repair. The cause is `Truncated` when
    /// `finish` reports the token limit, `Malformed` otherwise.
    pub fn repair_json(
        &self,
        raw: Option<&str>,
        shape: PayloadShape,
        finish: &FinishReason,
    ) -> Result<Repaired<Value>, RepairError> {
        let extracted = extract_json_payload(raw, shape);
        let (mut value, stage, escapes_doubled) = self.parse_with_fallback(extracted.json, finish)?;
        let latex_fixes = self.table.repair_value(&mut value);
        if latex_fixes > 0 {
            tracing::debug!("deep LaTeX repair rewrote {latex_fixes} string(s)");
        }

        Ok(Repaired {
            value,
            report: RepairReport {
                source: extracted.source,
                stage,
                escapes_doubled,
                latex_fixes,
            },
        })
    }

    /// Parse a study-plan response into a [`StudyBundle`].
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::MalformedResponse`] when the text cannot be
    /// parsed, or when the parsed tree does not fit the bundle shape.
    pub fn parse_study_bundle(
        &self,
        raw: Option<&str>,
        finish: &FinishReason,
    ) -> Result<Repaired<StudyBundle>, RepairError> {
        let Repaired { value, report } = self.repair_json(raw, PayloadShape::Object, finish)?;
        if !value.is_object() {
            return Err(self.shape_mismatch(raw, "expected a JSON object for a study bundle"));
        }
        let bundle = self.typed::<StudyBundle>(value, raw)?;
        Ok(Repaired {
            value: bundle,
            report,
        })
    }

    /// Parse a quiz response into its questions.
    ///
    /// Accepts a bare array or an object with a `questions` array. Questions
    /// whose answer is not among their options are logged and kept.
    ///
    /// # Errors
    ///
    /// Same contract as [`ResponseRepairer::parse_study_bundle`].
    pub fn parse_quiz_bundle(
        &self,
        raw: Option<&str>,
        finish: &FinishReason,
    ) -> Result<Repaired<Vec<QuizQuestion>>, RepairError> {
        let Repaired { value, report } = self.repair_json(raw, PayloadShape::Array, finish)?;
        let questions = self.typed::<QuizPayload>(value, raw)?.into_questions();
        for (index, question) in questions.iter().enumerate() {
            if !question.answer_is_listed() {
                tracing::warn!(
                    "quiz question {index} has a correctAnswer that is not among its {} option(s)",
                    question.options.len()
                );
            }
        }
        Ok(Repaired {
            value: questions,
            report,
        })
    }

    fn parse_with_fallback(
        &self,
        candidate: &str,
        finish: &FinishReason,
    ) -> Result<(Value, ParseStage, usize), RepairError> {
        let direct_err = match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok((value, ParseStage::Direct, 0)),
            Err(err) => err,
        };

        let (repaired, doubled) = double_invalid_backslashes(candidate);
        if let Cow::Borrowed(_) = repaired {
            // Nothing to double; a second parse would fail the same way.
            return Err(self.malformed(candidate, finish, &direct_err));
        }

        tracing::debug!(
            "direct parse failed ({direct_err}); retrying after doubling {doubled} backslash(es)"
        );
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => Ok((value, ParseStage::BackslashRepaired, doubled)),
            Err(err) => Err(self.malformed(candidate, finish, &err)),
        }
    }

    fn typed<T: serde::de::DeserializeOwned>(
        &self,
        value: Value,
        raw: Option<&str>,
    ) -> Result<T, RepairError> {
        serde_json::from_value(value).map_err(|err| self.shape_mismatch(raw, err))
    }

    fn shape_mismatch(&self, raw: Option<&str>, reason: impl std::fmt::Display) -> RepairError {
        RepairError::MalformedResponse {
            cause: MalformedCause::Malformed,
            snippet: self.snippet(raw.unwrap_or_default()),
            detail: format!("payload shape mismatch: {reason}"),
        }
    }

    fn malformed(
        &self,
        candidate: &str,
        finish: &FinishReason,
        err: &serde_json::Error,
    ) -> RepairError {
        let cause = if finish.is_token_limit() {
            MalformedCause::Truncated
        } else {
            MalformedCause::Malformed
        };
        RepairError::MalformedResponse {
            cause,
            snippet: self.snippet(candidate),
            detail: err.to_string(),
        }
    }

    fn snippet(&self, text: &str) -> String {
        truncate_at_char_boundary(text, self.snippet_max_bytes).to_string()
    }
}
