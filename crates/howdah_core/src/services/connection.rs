//! Database connection pooling with deadpool-postgres.
//!
//! A [`ConnectionPool`] wraps one deadpool-postgres pool built from a
//! profile's six connection-affecting fields. `open` only constructs the
//! pool; `connect` additionally validates connectivity by acquiring a
//! session and running `SELECT 1`.

use crate::error::HowdahError;
use crate::models::ProfileDraft;

use chrono::{DateTime, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Default maximum sessions per pool.
pub(crate) const POOL_MAX_SIZE: usize = 4;

/// Application name reported to the target server.
const APPLICATION_NAME: &str = "Howdah";

/// A pool of reusable sessions to one database target.
///
/// Owned exclusively by the registry (or, for probes, by the prober for the
/// duration of one check); never handed out directly.
pub struct ConnectionPool {
    /// The actual connection pool
    pool: Pool,
    /// Target description for logging (never includes the password)
    target: String,
    /// When this pool was created
    created_at: DateTime<Utc>,
}

impl ConnectionPool {
    /// Build a pool without touching the network.
    ///
    /// `connect_timeout` bounds connection establishment when set; when
    /// `None`, no timeout is enforced anywhere in the pool.
    pub fn open(
        settings: &ProfileDraft,
        max_size: usize,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, HowdahError> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&settings.host);
        pg_config.port(settings.port);
        pg_config.dbname(&settings.database);
        pg_config.user(&settings.username);
        pg_config.password(&settings.password);
        pg_config.application_name(APPLICATION_NAME);
        pg_config.keepalives(true);
        pg_config.keepalives_idle(Duration::from_secs(60));
        if let Some(timeout) = connect_timeout {
            pg_config.connect_timeout(timeout);
        }

        let manager_config = ManagerConfig { recycling_method: RecyclingMethod::Fast };

        // The SSL flag selects TLS without certificate verification; targets
        // with self-signed certificates are accepted.
        let manager = if settings.ssl {
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|e| {
                    HowdahError::connection(format!("Failed to create TLS connector: {e}"))
                })?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        } else {
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let pool = Pool::builder(manager)
            .max_size(max_size)
            .create_timeout(connect_timeout)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| HowdahError::connection(format!("Failed to create pool: {e}")))?;

        Ok(Self { pool, target: settings.display_url(), created_at: Utc::now() })
    }

    /// Build a pool and validate connectivity with one test acquisition.
    ///
    /// The pool is closed before returning an error, so a failed connect
    /// never leaks open sessions.
    pub async fn connect(
        settings: &ProfileDraft,
        max_size: usize,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, HowdahError> {
        let pool = Self::open(settings, max_size, connect_timeout)?;

        let validation = async {
            let client = pool.get().await?;
            client.execute("SELECT 1", &[]).await?;
            Ok::<_, HowdahError>(())
        }
        .await;

        if let Err(e) = validation {
            pool.close();
            return Err(e);
        }

        tracing::info!(target = %pool.target, "Connection pool created");
        Ok(pool)
    }

    /// Target description (no password), for logging.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get when this pool was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Acquire a session from the pool.
    pub async fn get(&self) -> Result<PooledConnection, HowdahError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| HowdahError::connection(format!("Failed to acquire connection: {e}")))?;
        Ok(PooledConnection { client })
    }

    /// Close the pool, dropping all sessions.
    pub fn close(&self) {
        self.pool.close();
        tracing::info!(target = %self.target, "Connection pool closed");
    }

    /// Check if the pool is closed.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("target", &self.target)
            .field("created_at", &self.created_at)
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

/// A session acquired from the pool.
///
/// Returns to the pool when dropped.
pub struct PooledConnection {
    client: deadpool_postgres::Client,
}

impl PooledConnection {
    /// Execute a query that returns rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<tokio_postgres::Row>, HowdahError> {
        self.client.query(sql, params).await.map_err(HowdahError::from)
    }

    /// Execute a query expected to return exactly one row.
    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<tokio_postgres::Row, HowdahError> {
        self.client.query_one(sql, params).await.map_err(HowdahError::from)
    }

    /// Execute a statement that doesn't return rows.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64, HowdahError> {
        self.client.execute(sql, params).await.map_err(HowdahError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileDraft;

    #[test]
    fn open_builds_pool_without_network() {
        // No target is listening here; construction must still succeed
        // because sessions are established lazily.
        let draft = ProfileDraft::new("t", "127.0.0.1", "nope", "nobody", "secret");
        let pool = ConnectionPool::open(&draft, POOL_MAX_SIZE, None).unwrap();
        assert!(!pool.is_closed());
        assert_eq!(pool.target(), "postgresql://nobody@127.0.0.1:5432/nope");
        pool.close();
        assert!(pool.is_closed());
    }

    #[test]
    fn open_builds_tls_pool_without_network() {
        let draft = ProfileDraft::new("t", "127.0.0.1", "nope", "nobody", "secret").with_ssl();
        let pool = ConnectionPool::open(&draft, 1, Some(Duration::from_secs(5))).unwrap();
        pool.close();
    }

    #[test]
    fn debug_output_omits_password() {
        let draft = ProfileDraft::new("t", "127.0.0.1", "db", "user", "hunter2");
        let pool = ConnectionPool::open(&draft, 1, None).unwrap();
        let debug = format!("{pool:?}");
        assert!(!debug.contains("hunter2"));
        pool.close();
    }
}
