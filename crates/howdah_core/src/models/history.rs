//! Query history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryResult;

/// Record of a previously executed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHistoryEntry {
    /// Auto-increment ID from the metadata store
    pub id: i64,
    /// Associated connection profile
    pub profile_id: i64,
    /// The executed SQL
    pub sql: String,
    /// Time to execute (None if not completed)
    pub elapsed_ms: Option<i64>,
    /// Rows returned/affected
    pub row_count: Option<i64>,
    /// Error message if the query failed
    pub error_message: Option<String>,
    /// Execution timestamp
    pub executed_at: DateTime<Utc>,
}

impl QueryHistoryEntry {
    /// Create a history entry from a successful query result.
    pub fn from_result(profile_id: i64, sql: impl Into<String>, result: &QueryResult) -> Self {
        Self {
            id: 0, // Set by the store
            profile_id,
            sql: sql.into(),
            elapsed_ms: Some(result.elapsed_ms as i64),
            row_count: Some(result.row_count as i64),
            error_message: None,
            executed_at: Utc::now(),
        }
    }

    /// Create a history entry from a failed query.
    pub fn from_error(
        profile_id: i64,
        sql: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            id: 0, // Set by the store
            profile_id,
            sql: sql.into(),
            elapsed_ms: None,
            row_count: None,
            error_message: Some(error.to_string()),
            executed_at: Utc::now(),
        }
    }

    /// Check if this entry represents a successful query.
    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }
}
