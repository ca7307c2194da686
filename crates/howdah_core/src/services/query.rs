//! Ad-hoc SQL execution.
//!
//! The executor runs caller-supplied SQL exactly as given — no
//! parameterization, no statement-type restriction, no statement timeout —
//! and normalizes the driver's rows into JSON-object rows with field
//! descriptors. Failures carry the server's error verbatim and are never
//! retried: arbitrary SQL may not be idempotent.

use crate::error::HowdahError;
use crate::models::{FieldDescriptor, JsonRow, QueryHistoryEntry, QueryResult, QueryType};
use crate::services::registry::PoolRegistry;
use crate::services::storage::MetadataStore;

use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tokio_postgres::types::Type;
use tokio_postgres::Row;

/// Service executing arbitrary SQL against a profile's pool.
pub struct QueryExecutor {
    registry: Arc<PoolRegistry>,
    store: Arc<MetadataStore>,
}

impl QueryExecutor {
    /// Create an executor resolving pools through the given registry and
    /// recording history in the given store.
    pub fn new(registry: Arc<PoolRegistry>, store: Arc<MetadataStore>) -> Self {
        Self { registry, store }
    }

    /// Execute a SQL statement and normalize the result.
    ///
    /// Every execution — success or failure — is appended to the profile's
    /// query history (best effort; a history write failure is logged and
    /// never masks the query outcome).
    pub async fn execute(&self, profile_id: i64, sql: &str) -> Result<QueryResult, HowdahError> {
        let pool = self.registry.resolve(profile_id).await?;
        let start = Instant::now();
        let query_type = Self::detect_query_type(sql);

        tracing::debug!(profile_id, query_type = ?query_type, sql = %truncate_sql(sql, 100), "Executing query");

        let result = async {
            let conn = pool.get().await?;
            conn.query(sql, &[]).await
        }
        .await;

        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(rows) => {
                let fields = rows
                    .first()
                    .map(|row| {
                        row.columns()
                            .iter()
                            .map(|col| FieldDescriptor {
                                name: col.name().to_string(),
                                type_name: col.type_().name().to_string(),
                                type_oid: col.type_().oid(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let rows: Vec<JsonRow> = rows.iter().map(row_to_object).collect();
                let result = QueryResult {
                    row_count: rows.len() as u64,
                    rows,
                    fields,
                    query_type,
                    elapsed_ms,
                };

                tracing::debug!(profile_id, elapsed_ms, row_count = result.row_count, "Query completed");
                self.record_history(QueryHistoryEntry::from_result(profile_id, sql, &result));
                Ok(result)
            }
            Err(error) => {
                tracing::warn!(profile_id, elapsed_ms, error = %error, "Query failed");
                self.record_history(QueryHistoryEntry::from_error(profile_id, sql, &error));
                Err(error)
            }
        }
    }

    /// Detect the type of SQL statement from its leading keyword.
    pub fn detect_query_type(sql: &str) -> QueryType {
        let trimmed = sql.trim_start().to_uppercase();

        if trimmed.starts_with("SELECT") || trimmed.starts_with("WITH") {
            QueryType::Select
        } else if trimmed.starts_with("INSERT") {
            QueryType::Insert
        } else if trimmed.starts_with("UPDATE") {
            QueryType::Update
        } else if trimmed.starts_with("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }

    fn record_history(&self, entry: QueryHistoryEntry) {
        if let Err(e) = self.store.add_history(&entry) {
            tracing::warn!(profile_id = entry.profile_id, error = %e, "Failed to record query history");
        }
    }
}

/// Truncate SQL for logging.
fn truncate_sql(sql: &str, max_len: usize) -> String {
    if sql.len() <= max_len {
        sql.to_string()
    } else {
        let mut cut = max_len;
        while !sql.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &sql[..cut])
    }
}

/// Convert a driver row into a column-name → JSON-value object.
///
/// Shared with the paginated table reader so every row the system returns
/// has the same shape regardless of which query produced it.
pub(crate) fn row_to_object(row: &Row) -> JsonRow {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| (col.name().to_string(), json_value(row, i, col.type_())))
        .collect()
}

/// Convert one cell based on its PostgreSQL type.
///
/// Types without an explicit arm fall back to the driver's text conversion;
/// values the driver cannot decode become null.
fn json_value(row: &Row, i: usize, ty: &Type) -> JsonValue {
    match *ty {
        // Boolean
        Type::BOOL => row
            .try_get::<_, Option<bool>>(i)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null),

        // Integers
        Type::INT2 => row
            .try_get::<_, Option<i16>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::Number(v.into()))
            .unwrap_or(JsonValue::Null),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::Number(v.into()))
            .unwrap_or(JsonValue::Null),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::Number(v.into()))
            .unwrap_or(JsonValue::Null),

        // Floating point
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(i)
            .ok()
            .flatten()
            .and_then(|v| serde_json::Number::from_f64(v as f64))
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(i)
            .ok()
            .flatten()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),

        // JSON/JSONB pass through unchanged
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<JsonValue>>(i)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null),

        // Timestamps
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<Utc>>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_rfc3339()))
            .unwrap_or(JsonValue::Null),
        Type::TIMESTAMP => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),

        // Date/Time
        Type::DATE => row
            .try_get::<_, Option<chrono::NaiveDate>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),
        Type::TIME => row
            .try_get::<_, Option<chrono::NaiveTime>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),

        // Arrays
        Type::INT4_ARRAY => row
            .try_get::<_, Option<Vec<i32>>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::Array(v.into_iter().map(|x| JsonValue::Number(x.into())).collect()))
            .unwrap_or(JsonValue::Null),
        Type::TEXT_ARRAY => row
            .try_get::<_, Option<Vec<String>>>(i)
            .ok()
            .flatten()
            .map(|v| JsonValue::Array(v.into_iter().map(JsonValue::String).collect()))
            .unwrap_or(JsonValue::Null),

        // Everything else through the driver's text conversion
        _ => row
            .try_get::<_, Option<String>>(i)
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_select_and_cte() {
        assert_eq!(QueryExecutor::detect_query_type("SELECT * FROM users"), QueryType::Select);
        assert_eq!(QueryExecutor::detect_query_type("  select 1"), QueryType::Select);
        assert_eq!(
            QueryExecutor::detect_query_type("WITH cte AS (SELECT 1) SELECT * FROM cte"),
            QueryType::Select
        );
    }

    #[test]
    fn detects_dml_and_other() {
        assert_eq!(QueryExecutor::detect_query_type("INSERT INTO t VALUES (1)"), QueryType::Insert);
        assert_eq!(QueryExecutor::detect_query_type("UPDATE t SET x = 1"), QueryType::Update);
        assert_eq!(QueryExecutor::detect_query_type("DELETE FROM t"), QueryType::Delete);
        assert_eq!(QueryExecutor::detect_query_type("CREATE TABLE t (id INT)"), QueryType::Other);
        assert_eq!(QueryExecutor::detect_query_type("EXPLAIN SELECT 1"), QueryType::Other);
    }

    #[test]
    fn truncates_long_sql_for_logging() {
        assert_eq!(truncate_sql("SELECT 1", 100), "SELECT 1");
        let long = "x".repeat(200);
        let truncated = truncate_sql(&long, 100);
        assert_eq!(truncated.len(), 103);
        assert!(truncated.ends_with("..."));
    }
}
