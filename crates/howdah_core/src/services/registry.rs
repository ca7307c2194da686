//! Process-wide cache of connection pools, one per profile.
//!
//! The registry is the only owner of long-lived pools. It is an explicit,
//! injectable object (never a module singleton) so tests can build one
//! against a scratch store and tear it down deterministically.

use crate::error::HowdahError;
use crate::services::connection::{ConnectionPool, POOL_MAX_SIZE};
use crate::services::storage::MetadataStore;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

type PoolCell = Arc<OnceCell<Arc<ConnectionPool>>>;

/// Cache mapping profile id → live connection pool.
///
/// Pools are created lazily on first [`resolve`](PoolRegistry::resolve) and
/// live until [`evict`](PoolRegistry::evict) — there is no TTL, no idle
/// reaping, and no bound on the number of cached pools (a known limitation
/// for workloads with many distinct profiles).
pub struct PoolRegistry {
    /// Profile lookup on cache miss
    store: Arc<MetadataStore>,
    /// One single-flight cell per profile id; construction is serialized
    /// per key while distinct keys proceed in parallel
    pools: RwLock<HashMap<i64, PoolCell>>,
}

impl PoolRegistry {
    /// Create a registry backed by the given metadata store.
    pub fn new(store: Arc<MetadataStore>) -> Self {
        Self { store, pools: RwLock::new(HashMap::new()) }
    }

    /// Resolve a profile id to its pool, constructing one on first use.
    ///
    /// Concurrent first-use calls for the same id construct exactly one
    /// pool; all callers receive the same instance. Fails with NotFound if
    /// the profile does not exist, or Connection if the target cannot be
    /// reached.
    pub async fn resolve(&self, profile_id: i64) -> Result<Arc<ConnectionPool>, HowdahError> {
        // The map lock is never held across an await; it only guards the
        // cell lookup. The cell itself serializes construction per key.
        let cell: PoolCell = self.pools.write().entry(profile_id).or_default().clone();

        let pool = cell
            .get_or_try_init(|| async {
                let profile = self
                    .store
                    .get_profile(profile_id)?
                    .ok_or_else(|| {
                        HowdahError::not_found(format!("connection profile {profile_id}"))
                    })?;

                tracing::debug!(profile_id, target = %profile.display_url(), "Pool cache miss");
                let pool =
                    ConnectionPool::connect(&profile.settings(), POOL_MAX_SIZE, None).await?;

                // Best effort: a failed timestamp write must not mask the
                // successful resolution.
                if let Err(e) = self.store.touch_last_connected(profile_id) {
                    tracing::warn!(profile_id, error = %e, "Failed to record last-connected time");
                }

                Ok::<_, HowdahError>(Arc::new(pool))
            })
            .await?;

        Ok(pool.clone())
    }

    /// Close and forget the pool cached for a profile, if any.
    ///
    /// Invoked from the profile update/delete paths, never from reads. A
    /// subsequent `resolve` constructs a fresh pool from current
    /// credentials.
    pub fn evict(&self, profile_id: i64) {
        let cell = self.pools.write().remove(&profile_id);
        if let Some(cell) = cell {
            if let Some(pool) = cell.get() {
                pool.close();
                tracing::info!(profile_id, "Evicted connection pool");
            }
        }
    }

    /// Whether a pool is currently cached (constructed) for a profile.
    pub fn contains(&self, profile_id: i64) -> bool {
        self.pools
            .read()
            .get(&profile_id)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// Close every cached pool and clear the cache.
    pub fn close_all(&self) {
        let cells: Vec<PoolCell> = {
            let mut pools = self.pools.write();
            pools.drain().map(|(_, cell)| cell).collect()
        };
        for cell in cells {
            if let Some(pool) = cell.get() {
                pool.close();
            }
        }
        tracing::info!("All connection pools closed");
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("cached", &self.pools.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MetadataStore;
    use tempfile::TempDir;

    fn registry() -> (PoolRegistry, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MetadataStore::open(dir.path().to_path_buf()).unwrap());
        (PoolRegistry::new(store), dir)
    }

    #[tokio::test]
    async fn resolve_missing_profile_is_not_found() {
        let (registry, _dir) = registry();
        let err = registry.resolve(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("42"));
        // A failed resolution caches nothing
        assert!(!registry.contains(42));
    }

    #[tokio::test]
    async fn concurrent_resolves_of_missing_profile_all_fail() {
        let (registry, _dir) = registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.resolve(7).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert!(!registry.contains(7));
    }

    #[tokio::test]
    async fn evict_without_pool_is_a_noop() {
        let (registry, _dir) = registry();
        registry.evict(1);
        assert!(!registry.contains(1));
    }

    #[tokio::test]
    async fn close_all_clears_the_cache() {
        let (registry, _dir) = registry();
        let _ = registry.resolve(1).await;
        registry.close_all();
        assert!(!registry.contains(1));
    }
}
