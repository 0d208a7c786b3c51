use std::fmt;

/// Why the upstream model stopped generating.
///
/// Only used to pick the caller-facing message when a response cannot be
/// recovered; it never changes how a response is repaired.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Other(String),
    #[default]
    Unspecified,
}

impl FinishReason {
    /// Map a provider finish-reason string to a [`FinishReason`].
    ///
    /// Accepts Gemini (`STOP`, `MAX_TOKENS`), OpenAI (`stop`, `length`) and
    /// Anthropic (`end_turn`, `max_tokens`) spellings.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s.trim() {
            "" => FinishReason::Unspecified,
            "STOP" | "stop" | "end_turn" | "stop_sequence" => FinishReason::Stop,
            "MAX_TOKENS" | "max_tokens" | "length" => FinishReason::MaxTokens,
            other => FinishReason::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn from_optional(s: Option<&str>) -> Self {
        s.map_or(FinishReason::Unspecified, FinishReason::from_wire)
    }

    #[must_use]
    pub fn is_token_limit(&self) -> bool {
        matches!(self, FinishReason::MaxTokens)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "STOP"),
            FinishReason::MaxTokens => write!(f, "MAX_TOKENS"),
            FinishReason::Other(other) => write!(f, "{other}"),
            FinishReason::Unspecified => write!(f, "UNSPECIFIED"),
        }
    }
}
