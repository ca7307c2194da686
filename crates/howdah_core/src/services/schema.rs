//! Schema introspection against a target's own catalogs.
//!
//! Descriptors are derived entirely from `information_schema` views and
//! `pg_indexes` at request time — the service has no compile-time knowledge
//! of any target schema shape, and nothing here is cached.

use crate::error::HowdahError;
use crate::models::{
    ColumnDescriptor, DatabaseInfo, ForeignKeyDescriptor, IndexDescriptor, TableSchema,
    TableSummary,
};
use crate::services::connection::ConnectionPool;
use crate::services::quote_ident;
use crate::services::registry::PoolRegistry;

use std::sync::Arc;

/// Service deriving structural metadata for tables on a target database.
pub struct SchemaIntrospector {
    registry: Arc<PoolRegistry>,
}

impl SchemaIntrospector {
    /// Create an introspector resolving pools through the given registry.
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }

    /// Describe one table: columns, keys, indexes, and row count.
    ///
    /// The five catalog queries are independent and run concurrently, each
    /// on its own pooled session; the descriptor is assembled once all have
    /// completed. Fails with NotFound if the profile does not resolve, or
    /// Query if any catalog query fails (e.g., the table does not exist —
    /// the row-count query references it directly).
    pub async fn describe(
        &self,
        profile_id: i64,
        table: &str,
    ) -> Result<TableSchema, HowdahError> {
        let pool = self.registry.resolve(profile_id).await?;

        tracing::debug!(profile_id, table, "Describing table");

        let (columns, primary_keys, foreign_keys, indexes, row_count) = tokio::try_join!(
            Self::columns(&pool, table),
            Self::primary_keys(&pool, table),
            Self::foreign_keys(&pool, table),
            Self::indexes(&pool, table),
            Self::row_count(&pool, table),
        )?;

        Ok(TableSchema {
            name: table.to_string(),
            columns,
            primary_keys,
            foreign_keys,
            indexes,
            row_count,
        })
    }

    /// List the tables visible in the target's non-system schemas.
    pub async fn list_tables(&self, profile_id: i64) -> Result<Vec<TableSummary>, HowdahError> {
        let pool = self.registry.resolve(profile_id).await?;
        let conn = pool.get().await?;

        let rows = conn
            .query(
                r#"
                SELECT
                    table_schema::text AS schema,
                    table_name::text AS name
                FROM information_schema.tables
                WHERE table_type = 'BASE TABLE'
                  AND table_schema NOT IN ('pg_catalog', 'information_schema')
                ORDER BY table_schema, table_name
                "#,
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TableSummary { schema: row.get("schema"), name: row.get("name") })
            .collect())
    }

    /// List the databases on the target server.
    pub async fn list_databases(&self, profile_id: i64) -> Result<Vec<DatabaseInfo>, HowdahError> {
        let pool = self.registry.resolve(profile_id).await?;
        let conn = pool.get().await?;

        let rows = conn
            .query(
                r#"
                SELECT
                    d.datname AS name,
                    pg_get_userbyid(d.datdba) AS owner
                FROM pg_database d
                WHERE NOT d.datistemplate
                ORDER BY d.datname
                "#,
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DatabaseInfo { name: row.get("name"), owner: row.get("owner") })
            .collect())
    }

    /// Load column metadata in ordinal order.
    ///
    /// information_schema exposes domain types (sql_identifier,
    /// cardinal_number); the casts pin them to types the driver decodes.
    async fn columns(
        pool: &ConnectionPool,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, HowdahError> {
        let conn = pool.get().await?;

        let rows = conn
            .query(
                r#"
                SELECT
                    column_name::text AS name,
                    data_type::text AS data_type,
                    character_maximum_length::int AS max_length,
                    column_default::text AS default_value,
                    is_nullable::text AS is_nullable
                FROM information_schema.columns
                WHERE table_name = $1
                ORDER BY ordinal_position
                "#,
                &[&table],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnDescriptor {
                name: row.get("name"),
                data_type: row.get("data_type"),
                max_length: row.get("max_length"),
                default_value: row.get("default_value"),
                is_nullable: row.get::<_, String>("is_nullable") == "YES",
            })
            .collect())
    }

    /// Load the names of the primary-key columns.
    async fn primary_keys(pool: &ConnectionPool, table: &str) -> Result<Vec<String>, HowdahError> {
        let conn = pool.get().await?;

        let rows = conn
            .query(
                r#"
                SELECT kcu.column_name::text AS column_name
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                WHERE tc.table_name = $1
                  AND tc.constraint_type = 'PRIMARY KEY'
                ORDER BY kcu.ordinal_position
                "#,
                &[&table],
            )
            .await?;

        Ok(rows.into_iter().map(|row| row.get("column_name")).collect())
    }

    /// Load outbound foreign-key relationships.
    async fn foreign_keys(
        pool: &ConnectionPool,
        table: &str,
    ) -> Result<Vec<ForeignKeyDescriptor>, HowdahError> {
        let conn = pool.get().await?;

        let rows = conn
            .query(
                r#"
                SELECT
                    kcu.column_name::text AS column_name,
                    ccu.table_name::text AS references_table,
                    ccu.column_name::text AS references_column
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                JOIN information_schema.constraint_column_usage ccu
                    ON ccu.constraint_name = tc.constraint_name
                    AND ccu.table_schema = tc.table_schema
                WHERE tc.table_name = $1
                  AND tc.constraint_type = 'FOREIGN KEY'
                "#,
                &[&table],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ForeignKeyDescriptor {
                column: row.get("column_name"),
                references_table: row.get("references_table"),
                references_column: row.get("references_column"),
            })
            .collect())
    }

    /// Load index definitions.
    async fn indexes(
        pool: &ConnectionPool,
        table: &str,
    ) -> Result<Vec<IndexDescriptor>, HowdahError> {
        let conn = pool.get().await?;

        let rows = conn
            .query(
                "SELECT indexname, indexdef FROM pg_indexes WHERE tablename = $1 ORDER BY indexname",
                &[&table],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| IndexDescriptor {
                name: row.get("indexname"),
                definition: row.get("indexdef"),
            })
            .collect())
    }

    /// Count the table's rows.
    ///
    /// The table name lands in identifier position, where it cannot be
    /// bound as a parameter; `quote_ident` is the shared trust boundary.
    async fn row_count(pool: &ConnectionPool, table: &str) -> Result<i64, HowdahError> {
        let conn = pool.get().await?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let row = conn.query_one(&sql, &[]).await?;
        Ok(row.get(0))
    }
}
