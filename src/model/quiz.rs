use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A single multiple-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

impl QuizQuestion {
    /// Whether `correct_answer` is one of `options`.
    ///
    /// The generating prompt asks for this but nothing downstream enforces it.
    #[must_use]
    pub fn answer_is_listed(&self) -> bool {
        self.options.iter().any(|opt| *opt == self.correct_answer)
    }
}

/// Wire shapes accepted for a quiz: a bare array, or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum QuizPayload {
    List(Vec<QuizQuestion>),
    Wrapped {
        #[serde(deserialize_with = "null_as_default")]
        questions: Vec<QuizQuestion>,
    },
}

impl QuizPayload {
    pub(crate) fn into_questions(self) -> Vec<QuizQuestion> {
        match self {
            QuizPayload::List(questions) | QuizPayload::Wrapped { questions } => questions,
        }
    }
}
