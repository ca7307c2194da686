//! Backend services for the Howdah service layer.
//!
//! - `connection` - Database connection pooling with deadpool-postgres
//! - `registry` - Process-wide pool cache keyed by profile id
//! - `probe` - One-shot reachability checks for candidate profiles
//! - `profiles` - Profile lifecycle (probe-gated create/update, eviction)
//! - `schema` - Catalog-driven schema introspection
//! - `query` - Arbitrary SQL execution with normalized results
//! - `reader` - Paginated table reads
//! - `storage` - Local SQLite metadata store

pub mod connection;
pub mod probe;
pub mod profiles;
pub mod query;
pub mod reader;
pub mod registry;
pub mod schema;
pub mod storage;

pub use connection::ConnectionPool;
pub use probe::ConnectionProber;
pub use profiles::ProfileService;
pub use query::QueryExecutor;
pub use reader::TableReader;
pub use registry::PoolRegistry;
pub use schema::SchemaIntrospector;
pub use storage::MetadataStore;

/// Quote a table name for use in identifier position.
///
/// Table names cannot be bound as query parameters, so the introspector and
/// the table reader interpolate them through this one helper: double-quote
/// wrapping with embedded double quotes doubled. This is a deliberate,
/// narrow trust boundary — in the normal flow table names come from a prior
/// catalog listing, not raw user input — and no further validation is
/// applied.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::quote_ident;

    #[test]
    fn wraps_plain_names() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("Mixed Case"), "\"Mixed Case\"");
    }

    #[test]
    fn doubles_embedded_quotes() {
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
        // A would-be breakout stays inside the quoted identifier
        assert_eq!(
            quote_ident("t\"; DROP TABLE users; --"),
            "\"t\"\"; DROP TABLE users; --\""
        );
    }
}
