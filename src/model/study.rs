use serde::{Deserialize, Serialize};

use super::{default_true, null_as_default, null_as_true};

/// A study plan plus its flashcards, as produced by the study-plan prompt.
///
/// Every field is optional on the wire. Missing or `null` values fall back to
/// an empty default, except `isStudyMaterial`, which defaults to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyBundle {
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_study_material: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validity_warning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub study_plan: StudyPlan,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flashcards: Vec<Flashcard>,
}

impl Default for StudyBundle {
    fn default() -> Self {
        Self {
            is_study_material: true,
            validity_warning: String::new(),
            study_plan: StudyPlan::default(),
            flashcards: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<StudyStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub detailed_notes: Vec<Section>,
}

/// One block of detailed notes inside a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formulas: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_title: String,
}
