//! Query execution models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One result row as a column-name → JSON-value mapping.
///
/// Decoupled from the driver's native row representation so that results of
/// heterogeneous queries share a uniform, serializable shape.
pub type JsonRow = Map<String, JsonValue>;

/// Type of SQL statement, detected from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    /// SELECT or WITH query returning rows
    Select,
    /// INSERT operation
    Insert,
    /// UPDATE operation
    Update,
    /// DELETE operation
    Delete,
    /// DDL, COPY, or other operations
    Other,
}

/// Column metadata from query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name
    pub name: String,
    /// Human-readable type name
    pub type_name: String,
    /// PostgreSQL type OID
    pub type_oid: u32,
}

/// Normalized result of executing an arbitrary SQL statement.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Result rows in the order the server returned them.
    pub rows: Vec<JsonRow>,
    /// Number of rows returned.
    pub row_count: u64,
    /// Field descriptors, empty when the statement returned no rows.
    pub fields: Vec<FieldDescriptor>,
    /// Detected statement type.
    pub query_type: QueryType,
    /// Time to execute in milliseconds.
    pub elapsed_ms: u64,
}

impl QueryResult {
    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get field names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    50
}

/// Page selection for a table read.
///
/// Values are taken as given; zero or negative pages produce a literal
/// OFFSET/LIMIT whose behavior the target database defines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number (default 1).
    #[serde(default = "default_page")]
    pub page: i64,
    /// Rows per page (default 50).
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl PageRequest {
    /// Create a page request.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Row offset of the first row of this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: default_page(), page_size: default_page_size() }
    }
}

/// One page of a table plus the table's total row count.
///
/// The two values come from independent queries with no snapshot isolation
/// between them; under concurrent writes they may be mutually inconsistent.
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    /// Rows of the requested page.
    pub rows: Vec<JsonRow>,
    /// Total row count of the table.
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 50);
        assert_eq!(req.offset(), 0);

        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 50);
    }

    #[test]
    fn offset_arithmetic() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(2, 50).offset(), 50);
    }

    #[test]
    fn offset_passes_through_nonpositive_values() {
        // No validation here: the literal value reaches the SQL text and the
        // target database defines the behavior.
        assert_eq!(PageRequest::new(0, 10).offset(), -10);
        assert_eq!(PageRequest::new(-1, 10).offset(), -20);
        assert_eq!(PageRequest::new(2, 0).offset(), 0);
    }
}
