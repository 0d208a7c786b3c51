pub mod finish;
pub mod quiz;
pub mod schema;
pub mod study;

pub use finish::FinishReason;
pub use quiz::QuizQuestion;
pub use study::{Flashcard, Section, StudyBundle, StudyPlan, StudyStep};

use serde::{Deserialize, Deserializer};

/// Deserialize a field so that an explicit `null` takes the type's default,
/// the same as a missing field does under `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// The two response kinds the service repairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    StudyBundle,
    QuizBundle,
}

impl PayloadKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::StudyBundle => "study_bundle",
            PayloadKind::QuizBundle => "quiz_bundle",
        }
    }
}
