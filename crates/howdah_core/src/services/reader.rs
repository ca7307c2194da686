//! Paginated table reads.

use crate::error::HowdahError;
use crate::models::{JsonRow, PageRequest, TablePage};
use crate::services::query::row_to_object;
use crate::services::quote_ident;
use crate::services::registry::PoolRegistry;

use std::sync::Arc;

/// Service reading bounded pages of a named table.
pub struct TableReader {
    registry: Arc<PoolRegistry>,
}

impl TableReader {
    /// Create a reader resolving pools through the given registry.
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }

    /// Read one page of a table alongside its total row count.
    ///
    /// The count query and the data query are independent and run
    /// concurrently on separate pooled sessions; there is no snapshot
    /// isolation between them, so a concurrently modified table may yield a
    /// total inconsistent with the returned page.
    ///
    /// Page values are interpolated literally — a zero or negative page or
    /// size produces a LIMIT/OFFSET clause whose behavior the target
    /// defines (PostgreSQL rejects negative values with a query error).
    pub async fn read(
        &self,
        profile_id: i64,
        table: &str,
        page: PageRequest,
    ) -> Result<TablePage, HowdahError> {
        let pool = self.registry.resolve(profile_id).await?;

        let ident = quote_ident(table);
        let count_sql = format!("SELECT COUNT(*) FROM {ident}");
        let data_sql =
            format!("SELECT * FROM {ident} LIMIT {} OFFSET {}", page.page_size, page.offset());

        tracing::debug!(profile_id, table, page = page.page, page_size = page.page_size, "Reading table page");

        let (total, rows) = tokio::try_join!(
            async {
                let conn = pool.get().await?;
                let row = conn.query_one(&count_sql, &[]).await?;
                Ok::<i64, HowdahError>(row.get(0))
            },
            async {
                let conn = pool.get().await?;
                let rows = conn.query(&data_sql, &[]).await?;
                Ok::<Vec<JsonRow>, HowdahError>(rows.iter().map(row_to_object).collect())
            },
        )?;

        Ok(TablePage { rows, total })
    }
}
