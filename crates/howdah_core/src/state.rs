//! Application state management.
//!
//! [`HowdahState`] is the composition root the routing layer holds: it
//! opens the metadata store, builds the pool registry over it, and wires
//! the services that resolve through the registry. Constructing one per
//! test (over a scratch data directory) gives fully isolated state with
//! deterministic teardown.

use crate::error::HowdahError;
use crate::services::profiles::ProfileService;
use crate::services::query::QueryExecutor;
use crate::services::reader::TableReader;
use crate::services::registry::PoolRegistry;
use crate::services::schema::SchemaIntrospector;
use crate::services::storage::MetadataStore;

use std::path::PathBuf;
use std::sync::Arc;

/// Central application state.
pub struct HowdahState {
    /// Local metadata store
    store: Arc<MetadataStore>,
    /// Pool cache, shared by every service below
    registry: Arc<PoolRegistry>,
    /// Profile lifecycle operations
    profiles: ProfileService,
    /// Schema introspection operations
    introspector: SchemaIntrospector,
    /// Ad-hoc SQL execution
    executor: QueryExecutor,
    /// Paginated table reads
    reader: TableReader,
    /// Application data directory
    data_dir: PathBuf,
}

impl HowdahState {
    /// Create application state in the default data directory.
    pub fn new() -> Result<Self, HowdahError> {
        Self::with_data_dir(crate::services::storage::default_data_dir())
    }

    /// Create application state with a custom data directory (for testing).
    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, HowdahError> {
        let store = Arc::new(MetadataStore::open(data_dir.clone())?);
        let registry = Arc::new(PoolRegistry::new(store.clone()));

        let profiles = ProfileService::new(store.clone(), registry.clone());
        let introspector = SchemaIntrospector::new(registry.clone());
        let executor = QueryExecutor::new(registry.clone(), store.clone());
        let reader = TableReader::new(registry.clone());

        tracing::info!(data_dir = %data_dir.display(), "HowdahState initialized");

        Ok(Self { store, registry, profiles, introspector, executor, reader, data_dir })
    }

    /// Get the metadata store (saved queries, history).
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Get the pool registry.
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Get the profile service.
    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    /// Get the schema introspector.
    pub fn introspector(&self) -> &SchemaIntrospector {
        &self.introspector
    }

    /// Get the query executor.
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Get the table reader.
    pub fn reader(&self) -> &TableReader {
        &self.reader
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Close every cached pool.
    pub fn shutdown(&self) {
        self.registry.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfileDraft, SavedQueryDraft};
    use tempfile::TempDir;

    #[tokio::test]
    async fn state_wires_services_over_one_store() {
        let dir = TempDir::new().unwrap();
        let state = HowdahState::with_data_dir(dir.path().to_path_buf()).unwrap();

        // Profile seeded through the store is visible through the service
        let draft = ProfileDraft::new("staging", "db.internal", "orders", "reporter", "pw");
        let profile = state.store().insert_profile(&draft).unwrap();
        assert_eq!(state.profiles().get(profile.id).unwrap().name, "staging");

        // Saved queries ride the same store
        let q = state
            .store()
            .insert_saved_query(&SavedQueryDraft::new("q", "SELECT 1").for_profile(profile.id))
            .unwrap();
        assert_eq!(state.store().get_saved_query(q.id).unwrap().unwrap().name, "q");

        state.shutdown();
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found_through_every_service() {
        let dir = TempDir::new().unwrap();
        let state = HowdahState::with_data_dir(dir.path().to_path_buf()).unwrap();

        assert!(state.profiles().get(99).unwrap_err().is_not_found());
        assert!(state.introspector().describe(99, "t").await.unwrap_err().is_not_found());
        assert!(state.executor().execute(99, "SELECT 1").await.unwrap_err().is_not_found());
        assert!(state
            .reader()
            .read(99, "t", crate::models::PageRequest::default())
            .await
            .unwrap_err()
            .is_not_found());
    }
}
