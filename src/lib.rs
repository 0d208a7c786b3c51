pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod repair;
pub mod routing;
pub mod state;

mod util;

pub use error::{MalformedCause, RepairError};
pub use model::{FinishReason, QuizQuestion, StudyBundle};
pub use repair::{parse_quiz_bundle, parse_study_bundle, ResponseRepairer};
