use serde_json::json;

/// Why a response could not be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedCause {
    /// Generation stopped at the output token limit.
    Truncated,
    /// Anything else.
    Malformed,
}

impl MalformedCause {
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            MalformedCause::Truncated => {
                "The AI response was truncated because it exceeded the maximum output size. \
                 Try a smaller or shorter document."
            }
            MalformedCause::Malformed => {
                "The AI model returned malformed output. See server logs for details."
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MalformedCause::Truncated => "truncated",
            MalformedCause::Malformed => "malformed",
        }
    }
}

/// Error returned by the repair pipeline.
///
/// `Display` only renders the caller-facing message. The raw snippet and the
/// parser detail are for server-side logs and must not reach end users.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("{}", .cause.user_message())]
    MalformedResponse {
        cause: MalformedCause,
        snippet: String,
        detail: String,
    },
}

impl RepairError {
    #[must_use]
    pub fn cause(&self) -> MalformedCause {
        match self {
            RepairError::MalformedResponse { cause, .. } => *cause,
        }
    }

    #[must_use]
    pub fn snippet(&self) -> &str {
        match self {
            RepairError::MalformedResponse { snippet, .. } => snippet,
        }
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            RepairError::MalformedResponse { detail, .. } => detail,
        }
    }
}

/// Error type for the HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Repair(#[from] RepairError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad error category for status code selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    UnprocessableResponse,
    ServerError,
}

impl ServiceError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            ServiceError::Repair(_) => ErrorCategory::UnprocessableResponse,
            ServiceError::Internal(_) => ErrorCategory::ServerError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest(_) => "invalid_request",
            ServiceError::Repair(err) => match err.cause() {
                MalformedCause::Truncated => "response_truncated",
                MalformedCause::Malformed => "malformed_response",
            },
            ServiceError::Internal(_) => "server_error",
        }
    }
}

fn http_status_for_category(cat: ErrorCategory) -> http::StatusCode {
    match cat {
        ErrorCategory::InvalidRequest => http::StatusCode::BAD_REQUEST,
        ErrorCategory::UnprocessableResponse => http::StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::ServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_type(cat: ErrorCategory) -> &'static str {
    match cat {
        ErrorCategory::InvalidRequest => "invalid_request_error",
        ErrorCategory::UnprocessableResponse => "model_output_error",
        ErrorCategory::ServerError => "server_error",
    }
}

/// Format an error as (`status_code`, JSON body).
#[must_use]
pub fn format_error(err: &ServiceError) -> (http::StatusCode, serde_json::Value) {
    let cat = err.category();
    let body = json!({
        "error": {
            "message": err.to_string(),
            "type": error_type(cat),
            "code": err.code(),
            "param": null,
        }
    });
    (http_status_for_category(cat), body)
}

impl axum::response::IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = format_error(&self);
        (status, axum::Json(body)).into_response()
    }
}
