//! Schema introspection models.
//!
//! Derived, point-in-time structural descriptions of objects in a target
//! database. Nothing here is persisted or cached; every descriptor is
//! computed fresh from the target's catalogs.

use serde::{Deserialize, Serialize};

/// One column of a described table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Data type as reported by the catalog (e.g., "character varying").
    pub data_type: String,
    /// Maximum character length, for types that carry one.
    pub max_length: Option<i32>,
    /// Default value expression, if any.
    pub default_value: Option<String>,
    /// Whether the column allows NULL values.
    pub is_nullable: bool,
}

/// A foreign-key relationship from a described table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// Local column name.
    pub column: String,
    /// Referenced table name.
    pub references_table: String,
    /// Referenced column name.
    pub references_column: String,
}

/// An index on a described table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Full index definition text from `pg_indexes`.
    pub definition: String,
}

/// A point-in-time structural snapshot of one table.
///
/// Staleness is the caller's responsibility: concurrent schema changes on
/// the target between introspection calls are not detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name as requested.
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
    /// Names of the primary-key columns.
    pub primary_keys: Vec<String>,
    /// Outbound foreign-key relationships.
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    /// Indexes, including the ones backing constraints.
    pub indexes: Vec<IndexDescriptor>,
    /// Total row count at introspection time.
    pub row_count: i64,
}

/// A table listed from the target's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    /// Schema (namespace) containing the table.
    pub schema: String,
    /// Table name.
    pub name: String,
}

/// A database listed from the target server's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Database name.
    pub name: String,
    /// Database owner.
    pub owner: String,
}
