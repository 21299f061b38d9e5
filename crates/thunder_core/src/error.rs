//! Error types for Thunder.
//!
//! Every failure crossing the driver or registry boundary is a [`ThunderError`].
//! None of them abort the process; the facade turns them into response envelopes.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ThunderError> = std::result::Result<T, E>;

/// Main error type for Thunder.
#[derive(Debug, Error)]
pub enum ThunderError {
    /// The requested driver kind has no implementation.
    #[error("Unsupported database type: {kind}")]
    UnsupportedBackend {
        /// The tag that was requested.
        kind: String,
    },

    /// Connecting, pinging or acquiring a pooled connection failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A session, table or saved profile does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up.
        message: String,
    },

    /// An operation was dispatched while no session is active.
    #[error("No active connection")]
    NoActiveConnection,

    /// Input rejected before reaching the backend.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The backend rejected a statement; its diagnostics are kept verbatim.
    #[error("{message}")]
    Execution {
        /// Backend error message.
        message: String,
        /// Additional detail from the backend.
        detail: Option<String>,
        /// Backend hint.
        hint: Option<String>,
        /// SQLSTATE code (e.g., "42P01").
        code: Option<String>,
        /// Position in the statement (1-indexed).
        position: Option<usize>,
    },

    /// Saved-profile file could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Broken internal invariant.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl ThunderError {
    // ========== Constructors ==========

    /// Create an unsupported backend error for the given tag.
    pub fn unsupported_backend(kind: impl Into<String>) -> Self {
        Self::UnsupportedBackend { kind: kind.into() }
    }

    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), hint: None, source: None }
    }

    /// Create a new connection error with an actionable hint.
    pub fn connection_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), hint: Some(hint.into()), source: None }
    }

    /// Create a new connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), hint: None, source: Some(Box::new(source)) }
    }

    /// Create a new not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Create an execution error carrying only a message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution { message: message.into(), detail: None, hint: None, code: None, position: None }
    }

    /// Create a new storage error.
    pub fn storage(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::Storage { message: message.into(), hint: hint.map(String::from), source: None }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// Check if this error was raised before any backend round trip.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedBackend { .. } => "Unsupported Backend",
            Self::Connection { .. } => "Connection",
            Self::NotFound { .. } => "Not Found",
            Self::NoActiveConnection => "No Active Connection",
            Self::Validation { .. } => "Validation",
            Self::Execution { .. } => "Execution",
            Self::Storage { .. } => "Storage",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Numeric status reported in response envelopes.
    pub fn status(&self) -> u16 {
        match self {
            Self::UnsupportedBackend { .. } => 400,
            Self::Validation { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::NoActiveConnection => 409,
            Self::Connection { .. } => 502,
            Self::Execution { .. } | Self::Storage { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::UnsupportedBackend { .. } => Some("Choose a supported database type"),
            Self::Connection { hint, .. } => {
                hint.as_deref().or(Some("Check that the database server is running"))
            }
            Self::NotFound { .. } => None,
            Self::NoActiveConnection => Some("Connect to a database first"),
            Self::Validation { .. } => None,
            Self::Execution { hint, .. } => hint.as_deref(),
            Self::Storage { hint, .. } => hint.as_deref(),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }
}

/// Raised by value binding when a [`crate::models::Value`] does not fit the
/// column type the server reported for its placeholder.
#[derive(Debug, Error)]
#[error("cannot bind {value} to a column of type {target}")]
pub struct BindError {
    /// Variant name of the offending value.
    pub value: &'static str,
    /// PostgreSQL type name of the placeholder.
    pub target: String,
    /// Parse failure, when the value was text.
    pub reason: Option<String>,
}

impl BindError {
    pub(crate) fn new(value: &'static str, target: impl Into<String>) -> Self {
        Self { value, target: target.into(), reason: None }
    }

    pub(crate) fn with_reason(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{self}: {reason}"),
            None => self.to_string(),
        }
    }
}

// ========== Error Conversions ==========

/// Convert from tokio_postgres::Error to ThunderError.
impl From<tokio_postgres::Error> for ThunderError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            let detail = db_err.detail().map(String::from);
            let hint = db_err.hint().map(String::from);
            let position = db_err.position().and_then(|p| match p {
                tokio_postgres::error::ErrorPosition::Original(pos) => Some(*pos as usize),
                tokio_postgres::error::ErrorPosition::Internal { .. } => None,
            });
            let code_str = db_err.code().code();

            return match code_str {
                "42P01" => ThunderError::NotFound { message },
                _ if code_str.starts_with("28") => ThunderError::Connection {
                    message,
                    hint: Some("Authentication failed - check username and password".to_string()),
                    source: None,
                },
                _ if code_str.starts_with("08") => {
                    ThunderError::Connection { message, hint, source: Some(Box::new(err)) }
                }
                _ => ThunderError::Execution {
                    message,
                    detail,
                    hint,
                    code: Some(code_str.to_string()),
                    position,
                },
            };
        }

        // Values that failed type checking while being encoded
        let bind_error = std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<BindError>())
            .map(BindError::describe);
        if let Some(message) = bind_error {
            return ThunderError::Validation { message };
        }

        if err.is_closed() {
            return ThunderError::Connection {
                message: "Connection closed".to_string(),
                hint: None,
                source: Some(Box::new(err)),
            };
        }

        ThunderError::execution(err.to_string())
    }
}

/// Convert from deadpool_postgres::PoolError to ThunderError.
impl From<deadpool_postgres::PoolError> for ThunderError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(pg) => ThunderError::from(pg),
            other => ThunderError::Connection {
                message: format!("Failed to acquire connection: {other}"),
                hint: Some("The pool may be closed or exhausted".to_string()),
                source: None,
            },
        }
    }
}

/// Convert from std::io::Error to ThunderError.
impl From<std::io::Error> for ThunderError {
    fn from(err: std::io::Error) -> Self {
        ThunderError::Storage {
            message: err.to_string(),
            hint: Some("Check file permissions and disk space".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from serde_json::Error to ThunderError.
impl From<serde_json::Error> for ThunderError {
    fn from(err: serde_json::Error) -> Self {
        ThunderError::Storage {
            message: format!("JSON error: {err}"),
            hint: Some("The saved connections file may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_category() {
        assert_eq!(ThunderError::unsupported_backend("mysql").status(), 400);
        assert_eq!(ThunderError::validation("x").status(), 422);
        assert_eq!(ThunderError::not_found("x").status(), 404);
        assert_eq!(ThunderError::NoActiveConnection.status(), 409);
        assert_eq!(ThunderError::connection("x").status(), 502);
        assert_eq!(ThunderError::execution("x").status(), 500);
    }

    #[test]
    fn test_unsupported_backend_names_kind() {
        let err = ThunderError::unsupported_backend("oracle");
        assert_eq!(err.to_string(), "Unsupported database type: oracle");
    }

    #[test]
    fn test_execution_error_keeps_backend_text() {
        let err = ThunderError::Execution {
            message: "syntax error at or near \"SELEC\"".to_string(),
            detail: None,
            hint: None,
            code: Some("42601".to_string()),
            position: Some(1),
        };
        assert_eq!(err.to_string(), "syntax error at or near \"SELEC\"");
        assert_eq!(err.category(), "Execution");
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn test_connection_hint_defaults() {
        assert_eq!(
            ThunderError::connection("refused").hint(),
            Some("Check that the database server is running")
        );
        assert_eq!(
            ThunderError::connection_with_hint("bad cert", "Check the CA file").hint(),
            Some("Check the CA file")
        );
    }

    #[test]
    fn test_bind_error_message() {
        let err = BindError::new("Text", "uuid").with_reason("invalid character");
        assert_eq!(err.describe(), "cannot bind Text to a column of type uuid: invalid character");
    }

    #[test]
    fn test_io_error_is_storage() {
        let err: ThunderError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), "Storage");
    }
}
