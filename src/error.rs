use std::fmt;
use thiserror::Error;

/// 失敗の分類（リージョンのエラーバナーに表示される）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Transport-level failure, no response received
    NetworkFailure,
    /// Response received with an error detail
    BackendError,
    /// Rejected locally before any request was issued
    InvalidInput,
    /// No session credential available
    Unauthenticated,
}

impl ErrorCode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NetworkFailure => "network",
            Self::BackendError => "backend",
            Self::InvalidInput => "input",
            Self::Unauthenticated => "session",
        }
    }
}

/// User-visible error value owned by a region.
///
/// Produced only by the HTTP client's normalization boundary or by local
/// form validation, so regions never inspect transport-specific shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkFailure, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BackendError, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "Not signed in")
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Misuse of the region layer.
///
/// `StaleResponse` is routine and silently dropped by the controller. All
/// other variants mean the screen wiring itself is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("invalid transition on region '{region}': {reason}")]
    InvalidTransition {
        region: String,
        reason: &'static str,
    },
    #[error("stale response for region '{region}'")]
    StaleResponse { region: String },
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error("region '{region}' does not hold {expected}")]
    TypeMismatch {
        region: String,
        expected: &'static str,
    },
    #[error("region '{0}' registered twice")]
    DuplicateRegion(String),
}

impl RegionError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_display_is_message_only() {
        let err = ErrorInfo::backend("Failed to fetch issues from GitHub: rate limited");
        assert_eq!(
            err.to_string(),
            "Failed to fetch issues from GitHub: rate limited"
        );
        assert_eq!(err.code, ErrorCode::BackendError);
    }

    #[test]
    fn test_only_stale_response_is_stale() {
        assert!(RegionError::StaleResponse {
            region: "issues".to_string()
        }
        .is_stale());
        assert!(!RegionError::UnknownRegion("nope".to_string()).is_stale());
    }
}
