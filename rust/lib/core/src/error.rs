use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Callers match on the code, not
// on the message.

/// Stable error code constants.
///
/// Rendered as `{"code": "NOT_FOUND", "status": 404, "message": "..."}` by [`ServiceError::to_json`].
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const CONFIGURATION: &str = "CONFIGURATION";
    pub const DATA_INTEGRITY: &str = "DATA_INTEGRITY";
    pub const BACKEND_ERROR: &str = "BACKEND_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified error type shared by every module.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status number, so whatever transport wraps the resolver can render
/// it without knowing the module that produced it:
///
/// ```json
/// {"code": "NOT_FOUND", "status": 404, "message": "business unit 'acme-west' not found"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Referenced resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Stale version token on an update. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// A required setting is missing or invalid. HTTP 500.
    #[error("{0}")]
    Configuration(String),

    /// Stored data violates a structural invariant (e.g. a parent cycle). HTTP 500.
    #[error("{0}")]
    DataIntegrity(String),

    /// The external backend failed. HTTP 502.
    #[error("{0}")]
    Backend(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::CONFLICT,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Configuration(_) => error_code::CONFIGURATION,
            ServiceError::DataIntegrity(_) => error_code::DATA_INTEGRITY,
            ServiceError::Backend(_) => error_code::BACKEND_ERROR,
        }
    }

    /// HTTP status number for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Validation(_) => 400,
            ServiceError::Configuration(_) => 500,
            ServiceError::DataIntegrity(_) => 500,
            ServiceError::Backend(_) => 502,
        }
    }

    /// Whether the caller may re-fetch and try again.
    ///
    /// Only version conflicts qualify; the resolver itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }

    /// JSON body `{"code", "status", "message"}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "status": self.status_code(),
            "message": self.to_string(),
        })
    }
}
