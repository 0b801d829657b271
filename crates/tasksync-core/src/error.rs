//! Error handling for task API calls and list synchronization
//!
//! Every failure is classified into a [`FailureKind`] so the presentation
//! layer can show a distinct message per kind, and so the controller knows
//! which failures are worth retrying.

use thiserror::Error;

/// Errors returned by a [`TaskApi`](crate::api::TaskApi) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced a response (connection refused, DNS, timeout)
    #[error("Network error during {method} {path}: {details}")]
    Network {
        method: &'static str,
        path: String,
        details: String,
    },

    /// Server answered with a non-2xx status
    #[error("Server rejected {method} {path} with status {status}")]
    Rejected {
        method: &'static str,
        path: String,
        status: u16,
    },

    /// Response body could not be decoded
    #[error("Malformed response from {path}: {details}")]
    Malformed { path: String, details: String },
}

impl ApiError {
    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Network { .. } => FailureKind::Network,
            ApiError::Rejected { .. } => FailureKind::Rejected,
            ApiError::Malformed { .. } => FailureKind::Malformed,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by [`TaskListController`](crate::controller::TaskListController) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The task API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input was rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Api(e) => e.kind(),
            SyncError::InvalidInput(_) => FailureKind::InvalidInput,
        }
    }
}

/// Failure taxonomy surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure, no response
    Network,
    /// Non-2xx response
    Rejected,
    /// Response body could not be parsed
    Malformed,
    /// Rejected locally
    InvalidInput,
}

impl FailureKind {
    /// Short message suitable for a notification line
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::Network => "Could not reach the task server.",
            FailureKind::Rejected => "The task server refused the request.",
            FailureKind::Malformed => "The task server sent an unreadable response.",
            FailureKind::InvalidInput => "That input is not valid.",
        }
    }

    /// Suggestion for what the user can do next
    pub fn recovery_suggestion(self) -> Option<&'static str> {
        match self {
            FailureKind::Network => {
                Some("Check that the server is running and the API URL is correct.")
            }
            FailureKind::Rejected => Some("Refresh the list; the task may no longer exist."),
            FailureKind::Malformed => None,
            FailureKind::InvalidInput => None,
        }
    }
}

/// Which controller operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Load => "load tasks",
            Operation::Create => "create task",
            Operation::Update => "update task",
            Operation::Delete => "delete task",
        };
        f.write_str(name)
    }
}

/// Last failure, as published in the list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub operation: Operation,
    pub kind: FailureKind,
    pub message: String,
}

impl SyncFailure {
    pub fn new(operation: Operation, error: &SyncError) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// One-line summary for a status bar
    pub fn summary(&self) -> String {
        format!("Failed to {}: {}", self.operation, self.kind.user_message())
    }
}

/// Result type for task API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for controller operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> ApiError {
        ApiError::Network {
            method: "GET",
            path: "/api/tasks".to_string(),
            details: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(network().kind(), FailureKind::Network);
        assert!(network().is_transient());

        let rejected = ApiError::Rejected {
            method: "DELETE",
            path: "/api/tasks/9".to_string(),
            status: 404,
        };
        assert_eq!(rejected.kind(), FailureKind::Rejected);
        assert!(!rejected.is_transient());
        assert_eq!(rejected.status(), Some(404));

        let malformed = ApiError::Malformed {
            path: "/api/tasks".to_string(),
            details: "expected value".to_string(),
        };
        assert_eq!(malformed.kind(), FailureKind::Malformed);
        assert!(!malformed.is_transient());
        assert_eq!(malformed.status(), None);
    }

    #[test]
    fn test_error_display() {
        let msg = network().to_string();
        assert!(msg.contains("GET /api/tasks"));
        assert!(msg.contains("connection refused"));

        let err = SyncError::InvalidInput("title is empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: title is empty");
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }

    #[test]
    fn test_failure_summary() {
        let failure = SyncFailure::new(Operation::Delete, &SyncError::from(network()));
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(
            failure.summary(),
            "Failed to delete task: Could not reach the task server."
        );
        assert!(failure.kind.recovery_suggestion().is_some());
    }

    #[test]
    fn test_each_kind_has_distinct_message() {
        let kinds = [
            FailureKind::Network,
            FailureKind::Rejected,
            FailureKind::Malformed,
            FailureKind::InvalidInput,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
