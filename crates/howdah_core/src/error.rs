//! Error types for the Howdah service layer.
//!
//! Every failure surfaced by the services is a [`HowdahError`] carrying a
//! human-readable message; query failures additionally carry the PostgreSQL
//! server's detail, hint, position, and SQLSTATE code verbatim.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the Howdah service layer.
#[derive(Debug, Error)]
pub enum HowdahError {
    /// A referenced profile, saved query, or table does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// Caller-supplied fields failed shape/type constraints before any
    /// network call was attempted.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// The offending field, when a single one can be named.
        field: Option<String>,
    },

    /// A session with the target database could not be established.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution failed with PostgreSQL-specific details.
    #[error("{message}")]
    Query {
        /// PostgreSQL error message.
        message: String,
        /// Additional detail from PostgreSQL.
        detail: Option<String>,
        /// PostgreSQL hint.
        hint: Option<String>,
        /// Position in query (1-indexed).
        position: Option<usize>,
        /// PostgreSQL error code (e.g., "42P01").
        code: Option<String>,
    },

    /// Local metadata store (SQLite) error.
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

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HowdahError {
    // ========== Constructors ==========

    /// Create a new not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error naming the offending field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Create a new connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new query error with full PostgreSQL details.
    pub fn query(
        message: impl Into<String>,
        detail: Option<String>,
        hint: Option<String>,
        position: Option<usize>,
        code: Option<String>,
    ) -> Self {
        Self::Query { message: message.into(), detail, hint, position, code }
    }

    /// Create a new storage error.
    pub fn storage(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::Storage { message: message.into(), hint: hint.map(String::from), source: None }
    }

    /// Create a new storage error with source.
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage { message: message.into(), hint: None, source: Some(Box::new(source)) }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    // ========== Methods ==========

    /// Check if this error represents a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error represents a failure to reach the target.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::Validation { .. } => "Validation",
            Self::Connection { .. } => "Connection",
            Self::Query { .. } => "Query",
            Self::Storage { .. } => "Storage",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => None,
            Self::Validation { .. } => Some("Correct the highlighted field and resubmit"),
            Self::Connection { .. } => Some("Check that the database server is reachable and the credentials are correct"),
            Self::Query { hint, .. } => hint.as_deref(),
            Self::Storage { hint, .. } => hint.as_deref(),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Get the PostgreSQL error code (if applicable).
    pub fn pg_code(&self) -> Option<&str> {
        match self {
            Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Get the position in the query (if applicable).
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Query { position, .. } => *position,
            _ => None,
        }
    }

    /// Convert to the JSON-serializable error shape handed to the routing layer.
    pub fn to_error_info(&self) -> ErrorInfo {
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::Query { detail, code, position, .. } => {
                let mut parts = Vec::new();
                if let Some(code) = code {
                    parts.push(format!("Code: {code}"));
                }
                if let Some(pos) = position {
                    parts.push(format!("Position: {pos}"));
                }
                if let Some(detail) = detail {
                    parts.push(format!("Detail: {detail}"));
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
            Self::Validation { field, .. } => field.as_ref().map(|f| format!("Field: {f}")),
            _ => None,
        };

        ErrorInfo { category: self.category().to_string(), message, hint, technical_detail }
    }
}

/// JSON-serializable error information for the routing layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Category name (e.g., "Connection").
    pub category: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Convert from tokio_postgres::Error to HowdahError.
impl From<tokio_postgres::Error> for HowdahError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Extract PostgreSQL error details where the server produced them
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            let detail = db_err.detail().map(String::from);
            let hint = db_err.hint().map(String::from);
            let position = db_err.position().and_then(|p| match p {
                tokio_postgres::error::ErrorPosition::Original(pos) => Some(*pos as usize),
                tokio_postgres::error::ErrorPosition::Internal { .. } => None,
            });
            let code = Some(db_err.code().code().to_string());

            let code_str = db_err.code().code();
            // Authentication (28xxx) and connection exceptions (08xxx) are
            // connection failures; everything else is a query failure
            if code_str.starts_with("28") || code_str.starts_with("08") {
                return HowdahError::Connection { message, source: Some(Box::new(err)) };
            }
            return HowdahError::Query { message, detail, hint, position, code };
        }

        if err.is_closed() {
            return HowdahError::Connection {
                message: "Connection closed".to_string(),
                source: Some(Box::new(err)),
            };
        }

        // Generic fallback (I/O errors, timeouts, TLS handshake failures)
        HowdahError::Connection { message: err.to_string(), source: Some(Box::new(err)) }
    }
}

/// Convert from rusqlite::Error to HowdahError.
impl From<rusqlite::Error> for HowdahError {
    fn from(err: rusqlite::Error) -> Self {
        HowdahError::Storage {
            message: err.to_string(),
            hint: Some("The local metadata database may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from std::io::Error to HowdahError.
impl From<std::io::Error> for HowdahError {
    fn from(err: std::io::Error) -> Self {
        HowdahError::Storage {
            message: err.to_string(),
            hint: Some("Check file permissions and disk space".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from serde_json::Error to HowdahError.
impl From<serde_json::Error> for HowdahError {
    fn from(err: serde_json::Error) -> Self {
        HowdahError::Storage {
            message: format!("JSON error: {err}"),
            hint: Some("Data may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_variants() {
        assert_eq!(HowdahError::not_found("profile 7").category(), "NotFound");
        assert_eq!(HowdahError::validation("bad").category(), "Validation");
        assert_eq!(HowdahError::connection("refused").category(), "Connection");
        assert_eq!(
            HowdahError::query("syntax error", None, None, None, None).category(),
            "Query"
        );
        assert_eq!(HowdahError::storage("disk full", None).category(), "Storage");
        assert_eq!(HowdahError::internal("oops").category(), "Internal");
    }

    #[test]
    fn not_found_message_names_resource() {
        let err = HowdahError::not_found("connection profile 42");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: connection profile 42");
    }

    #[test]
    fn query_error_exposes_code_and_position() {
        let err = HowdahError::query(
            "relation \"missing\" does not exist",
            None,
            None,
            Some(15),
            Some("42P01".to_string()),
        );
        assert_eq!(err.pg_code(), Some("42P01"));
        assert_eq!(err.position(), Some(15));
        let info = err.to_error_info();
        assert_eq!(info.category, "Query");
        assert!(info.technical_detail.unwrap().contains("42P01"));
    }

    #[test]
    fn validation_field_shows_in_detail() {
        let err = HowdahError::validation_field("Host is required", "host");
        let info = err.to_error_info();
        assert_eq!(info.technical_detail.as_deref(), Some("Field: host"));
    }
}
