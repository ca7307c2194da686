//! Local SQLite metadata store.
//!
//! Persists connection profiles, saved queries, and query history. Profile
//! passwords are stored in clear text in this database — a flagged property
//! of the design (see DESIGN.md), not an oversight.
//!
//! # Data Directory Locations
//!
//! - **macOS/Linux/Windows**: the platform data directory under `howdah`
//! - **Debug builds**: `./howdah_data` in the current directory

use crate::error::HowdahError;
use crate::models::{ConnectionProfile, ProfileDraft, QueryHistoryEntry, SavedQuery, SavedQueryDraft};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// Get the default data directory for the application.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./howdah_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_dir()
            .map(|d| d.join("howdah"))
            .unwrap_or_else(|| PathBuf::from("./howdah_data"))
    }
}

/// Initialize the data directory, creating it if needed.
pub fn init_data_dir(path: &PathBuf) -> Result<(), HowdahError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(HowdahError::storage(
                format!("Data path exists but is not a directory: {}", path.display()),
                Some("Select a different location or remove the existing file"),
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|e| {
        HowdahError::storage(
            format!("Failed to create data directory '{}': {}", path.display(), e),
            Some("Check permissions or select a different location"),
        )
    })?;

    tracing::info!(path = %path.display(), "Created data directory");
    Ok(())
}

/// SQLite-based store for profiles, saved queries, and history.
///
/// Thread-safe via internal Mutex. Uses WAL mode for concurrent reads.
pub struct MetadataStore {
    /// Thread-safe SQLite connection
    connection: Mutex<Connection>,
    /// Data directory path
    data_dir: PathBuf,
}

impl MetadataStore {
    /// Open or create the store in the given data directory.
    pub fn open(data_dir: PathBuf) -> Result<Self, HowdahError> {
        init_data_dir(&data_dir)?;
        let db_path = data_dir.join("howdah.db");
        Self::open_with_path(db_path, data_dir)
    }

    /// Open the store with a specific database path (for testing).
    pub fn open_with_path(db_path: PathBuf, data_dir: PathBuf) -> Result<Self, HowdahError> {
        let connection = Connection::open(&db_path).map_err(|e| {
            HowdahError::storage(
                format!("Failed to open database '{}': {}", db_path.display(), e),
                Some("The database file may be corrupted. Try deleting it to start fresh."),
            )
        })?;

        Self::configure_connection(&connection)?;

        let store = Self { connection: Mutex::new(connection), data_dir };
        store.run_migrations()?;

        tracing::info!(path = %db_path.display(), "Metadata store opened");
        Ok(store)
    }

    /// Configure the SQLite connection pragmas.
    fn configure_connection(conn: &Connection) -> Result<(), HowdahError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            ",
        )
        .map_err(|e| HowdahError::storage(format!("Failed to configure database: {e}"), None))
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<(), HowdahError> {
        let conn = self.connection.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                domain TEXT NOT NULL,
                step INTEGER NOT NULL,
                migration TEXT NOT NULL,
                PRIMARY KEY(domain, step)
            ) STRICT",
            [],
        )
        .map_err(|e| {
            HowdahError::storage(format!("Failed to create migrations table: {e}"), None)
        })?;

        self.migrate_schema(&conn)
    }

    fn migrate_schema(&self, conn: &Connection) -> Result<(), HowdahError> {
        const DOMAIN: &str = "core";

        let current_step: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(step), 0) FROM migrations WHERE domain = ?",
                [DOMAIN],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_step < 1 {
            conn.execute_batch(
                "
                -- Connection profiles (passwords in clear; see DESIGN.md)
                CREATE TABLE connection_profiles (
                    profile_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    host TEXT NOT NULL,
                    port INTEGER NOT NULL DEFAULT 5432,
                    database_name TEXT NOT NULL,
                    username TEXT NOT NULL,
                    password TEXT NOT NULL,
                    ssl INTEGER NOT NULL DEFAULT 0,
                    active INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    last_connected_at TEXT
                ) STRICT;

                -- Saved queries; orphaned (profile set NULL) on profile delete
                CREATE TABLE saved_queries (
                    query_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    profile_id INTEGER,
                    name TEXT NOT NULL,
                    sql_text TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY(profile_id) REFERENCES connection_profiles(profile_id) ON DELETE SET NULL
                ) STRICT;

                -- Query history; removed with its profile
                CREATE TABLE query_history (
                    history_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    profile_id INTEGER NOT NULL,
                    sql_text TEXT NOT NULL,
                    elapsed_ms INTEGER,
                    row_count INTEGER,
                    error_message TEXT,
                    executed_at TEXT NOT NULL,
                    FOREIGN KEY(profile_id) REFERENCES connection_profiles(profile_id) ON DELETE CASCADE
                ) STRICT;

                -- Indexes
                CREATE INDEX idx_profiles_last_connected ON connection_profiles(last_connected_at DESC);
                CREATE INDEX idx_saved_queries_profile ON saved_queries(profile_id);
                CREATE INDEX idx_query_history_profile ON query_history(profile_id, executed_at DESC);
                ",
            )
            .map_err(|e| HowdahError::storage(format!("Migration 1 failed: {e}"), None))?;

            conn.execute(
                "INSERT INTO migrations (domain, step, migration) VALUES (?, 1, 'initial_schema')",
                [DOMAIN],
            )
            .map_err(|e| HowdahError::storage(format!("Failed to record migration: {e}"), None))?;

            tracing::info!("Applied migration 1: initial_schema");
        }

        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    // ========== Connection Profile Operations ==========

    /// Persist a new connection profile and return it with its assigned id.
    pub fn insert_profile(&self, draft: &ProfileDraft) -> Result<ConnectionProfile, HowdahError> {
        let conn = self.connection.lock();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO connection_profiles
                (name, host, port, database_name, username, password, ssl, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                draft.name,
                draft.host,
                draft.port,
                draft.database,
                draft.username,
                draft.password,
                draft.ssl,
                draft.active,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| HowdahError::storage(format!("Failed to save profile: {e}"), None))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(profile_id = id, name = %draft.name, "Connection profile saved");

        Ok(ConnectionProfile {
            id,
            name: draft.name.clone(),
            host: draft.host.clone(),
            port: draft.port,
            database: draft.database.clone(),
            username: draft.username.clone(),
            password: draft.password.clone(),
            ssl: draft.ssl,
            last_connected_at: None,
            active: draft.active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Load a connection profile by id.
    pub fn get_profile(&self, id: i64) -> Result<Option<ConnectionProfile>, HowdahError> {
        let conn = self.connection.lock();

        conn.query_row(
            "SELECT profile_id, name, host, port, database_name, username, password,
                    ssl, active, created_at, updated_at, last_connected_at
             FROM connection_profiles WHERE profile_id = ?",
            [id],
            row_to_profile,
        )
        .optional()
        .map_err(|e| HowdahError::storage(format!("Failed to load profile: {e}"), None))
    }

    /// Load all connection profiles, most recently connected first.
    pub fn list_profiles(&self) -> Result<Vec<ConnectionProfile>, HowdahError> {
        let conn = self.connection.lock();

        let mut stmt = conn
            .prepare(
                "SELECT profile_id, name, host, port, database_name, username, password,
                        ssl, active, created_at, updated_at, last_connected_at
                 FROM connection_profiles
                 ORDER BY last_connected_at DESC NULLS LAST, name",
            )
            .map_err(|e| HowdahError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt
            .query_map([], row_to_profile)
            .map_err(|e| HowdahError::storage(format!("Failed to query profiles: {e}"), None))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| HowdahError::storage(format!("Failed to read profiles: {e}"), None))
    }

    /// Overwrite a profile's fields. Fails with NotFound for an unknown id.
    pub fn update_profile(
        &self,
        id: i64,
        draft: &ProfileDraft,
    ) -> Result<ConnectionProfile, HowdahError> {
        {
            let conn = self.connection.lock();
            let changed = conn
                .execute(
                    "UPDATE connection_profiles SET
                        name = ?1, host = ?2, port = ?3, database_name = ?4,
                        username = ?5, password = ?6, ssl = ?7, active = ?8,
                        updated_at = ?9
                     WHERE profile_id = ?10",
                    params![
                        draft.name,
                        draft.host,
                        draft.port,
                        draft.database,
                        draft.username,
                        draft.password,
                        draft.ssl,
                        draft.active,
                        Utc::now().to_rfc3339(),
                        id,
                    ],
                )
                .map_err(|e| HowdahError::storage(format!("Failed to update profile: {e}"), None))?;

            if changed == 0 {
                return Err(HowdahError::not_found(format!("connection profile {id}")));
            }
            tracing::debug!(profile_id = id, name = %draft.name, "Connection profile updated");
        }

        self.get_profile(id)?
            .ok_or_else(|| HowdahError::not_found(format!("connection profile {id}")))
    }

    /// Delete a profile. Returns false if no such profile existed.
    pub fn delete_profile(&self, id: i64) -> Result<bool, HowdahError> {
        let conn = self.connection.lock();

        let deleted = conn
            .execute("DELETE FROM connection_profiles WHERE profile_id = ?", [id])
            .map_err(|e| HowdahError::storage(format!("Failed to delete profile: {e}"), None))?;

        if deleted > 0 {
            tracing::debug!(profile_id = id, "Connection profile deleted");
        }
        Ok(deleted > 0)
    }

    /// Record that a pool for this profile connected successfully.
    pub fn touch_last_connected(&self, id: i64) -> Result<(), HowdahError> {
        let conn = self.connection.lock();

        conn.execute(
            "UPDATE connection_profiles SET last_connected_at = ? WHERE profile_id = ?",
            params![Utc::now().to_rfc3339(), id],
        )
        .map_err(|e| HowdahError::storage(format!("Failed to update last_connected: {e}"), None))?;

        Ok(())
    }

    // ========== Saved Query Operations ==========

    /// Persist a new saved query and return it with its assigned id.
    pub fn insert_saved_query(&self, draft: &SavedQueryDraft) -> Result<SavedQuery, HowdahError> {
        let conn = self.connection.lock();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO saved_queries (profile_id, name, sql_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![draft.profile_id, draft.name, draft.sql, now.to_rfc3339()],
        )
        .map_err(|e| HowdahError::storage(format!("Failed to save query: {e}"), None))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(query_id = id, name = %draft.name, "Query saved");

        Ok(SavedQuery {
            id,
            profile_id: draft.profile_id,
            name: draft.name.clone(),
            sql: draft.sql.clone(),
            created_at: now,
        })
    }

    /// Load a saved query by id.
    pub fn get_saved_query(&self, id: i64) -> Result<Option<SavedQuery>, HowdahError> {
        let conn = self.connection.lock();

        conn.query_row(
            "SELECT query_id, profile_id, name, sql_text, created_at
             FROM saved_queries WHERE query_id = ?",
            [id],
            row_to_saved_query,
        )
        .optional()
        .map_err(|e| HowdahError::storage(format!("Failed to load saved query: {e}"), None))
    }

    /// Load all saved queries.
    pub fn list_saved_queries(&self) -> Result<Vec<SavedQuery>, HowdahError> {
        let conn = self.connection.lock();

        let mut stmt = conn
            .prepare(
                "SELECT query_id, profile_id, name, sql_text, created_at
                 FROM saved_queries ORDER BY name",
            )
            .map_err(|e| HowdahError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt
            .query_map([], row_to_saved_query)
            .map_err(|e| HowdahError::storage(format!("Failed to query saved queries: {e}"), None))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| HowdahError::storage(format!("Failed to read saved queries: {e}"), None))
    }

    /// Overwrite a saved query. Fails with NotFound for an unknown id.
    pub fn update_saved_query(
        &self,
        id: i64,
        draft: &SavedQueryDraft,
    ) -> Result<SavedQuery, HowdahError> {
        {
            let conn = self.connection.lock();
            let changed = conn
                .execute(
                    "UPDATE saved_queries SET profile_id = ?1, name = ?2, sql_text = ?3
                     WHERE query_id = ?4",
                    params![draft.profile_id, draft.name, draft.sql, id],
                )
                .map_err(|e| {
                    HowdahError::storage(format!("Failed to update saved query: {e}"), None)
                })?;

            if changed == 0 {
                return Err(HowdahError::not_found(format!("saved query {id}")));
            }
        }

        self.get_saved_query(id)?
            .ok_or_else(|| HowdahError::not_found(format!("saved query {id}")))
    }

    /// Delete a saved query. Returns false if no such query existed.
    pub fn delete_saved_query(&self, id: i64) -> Result<bool, HowdahError> {
        let conn = self.connection.lock();

        let deleted = conn
            .execute("DELETE FROM saved_queries WHERE query_id = ?", [id])
            .map_err(|e| HowdahError::storage(format!("Failed to delete saved query: {e}"), None))?;

        if deleted > 0 {
            tracing::debug!(query_id = id, "Saved query deleted");
        }
        Ok(deleted > 0)
    }

    // ========== Query History Operations ==========

    /// Append a query to history.
    pub fn add_history(&self, entry: &QueryHistoryEntry) -> Result<i64, HowdahError> {
        let conn = self.connection.lock();

        conn.execute(
            "INSERT INTO query_history (profile_id, sql_text, elapsed_ms, row_count, error_message, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.profile_id,
                entry.sql,
                entry.elapsed_ms,
                entry.row_count,
                entry.error_message,
                entry.executed_at.to_rfc3339(),
            ],
        )
        .map_err(|e| HowdahError::storage(format!("Failed to add to history: {e}"), None))?;

        let id = conn.last_insert_rowid();
        tracing::trace!(history_id = id, profile_id = entry.profile_id, "Query added to history");
        Ok(id)
    }

    /// Load recent history for a profile.
    pub fn recent_history(
        &self,
        profile_id: i64,
        limit: usize,
    ) -> Result<Vec<QueryHistoryEntry>, HowdahError> {
        let conn = self.connection.lock();

        let mut stmt = conn
            .prepare(
                "SELECT history_id, profile_id, sql_text, elapsed_ms, row_count, error_message, executed_at
                 FROM query_history
                 WHERE profile_id = ?
                 ORDER BY executed_at DESC, history_id DESC
                 LIMIT ?",
            )
            .map_err(|e| HowdahError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt
            .query_map(params![profile_id, limit as i64], |row| {
                let executed_at_str: String = row.get(6)?;
                Ok(QueryHistoryEntry {
                    id: row.get(0)?,
                    profile_id: row.get(1)?,
                    sql: row.get(2)?,
                    elapsed_ms: row.get(3)?,
                    row_count: row.get(4)?,
                    error_message: row.get(5)?,
                    executed_at: parse_timestamp(&executed_at_str),
                })
            })
            .map_err(|e| HowdahError::storage(format!("Failed to query history: {e}"), None))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| HowdahError::storage(format!("Failed to read history: {e}"), None))
    }

    /// Clear history for a profile.
    pub fn clear_history(&self, profile_id: i64) -> Result<(), HowdahError> {
        let conn = self.connection.lock();

        conn.execute("DELETE FROM query_history WHERE profile_id = ?", [profile_id])
            .map_err(|e| HowdahError::storage(format!("Failed to clear history: {e}"), None))?;

        tracing::debug!(profile_id, "Query history cleared");
        Ok(())
    }
}

// ========== Row Mapping Helpers ==========

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_timestamp_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.with_timezone(&Utc)))
}

fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<ConnectionProfile> {
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;
    let last_connected_str: Option<String> = row.get(11)?;

    Ok(ConnectionProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        host: row.get(2)?,
        port: row.get(3)?,
        database: row.get(4)?,
        username: row.get(5)?,
        password: row.get(6)?,
        ssl: row.get(7)?,
        active: row.get(8)?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
        last_connected_at: parse_timestamp_opt(last_connected_str),
    })
}

fn row_to_saved_query(row: &rusqlite::Row) -> rusqlite::Result<SavedQuery> {
    let created_at_str: String = row.get(4)?;

    Ok(SavedQuery {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        name: row.get(2)?,
        sql: row.get(3)?,
        created_at: parse_timestamp(&created_at_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (MetadataStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::open(dir.path().to_path_buf()).unwrap();
        (store, dir)
    }

    fn draft(name: &str) -> ProfileDraft {
        ProfileDraft::new(name, "db.internal", "orders", "reporter", "hunter2")
    }

    #[test]
    fn profiles_round_trip() {
        let (store, _dir) = store();

        let created = store.insert_profile(&draft("staging")).unwrap();
        assert!(created.id > 0);
        assert!(created.active);
        assert!(created.last_connected_at.is_none());

        let loaded = store.get_profile(created.id).unwrap().unwrap();
        assert_eq!(loaded.name, "staging");
        assert_eq!(loaded.host, "db.internal");
        assert_eq!(loaded.port, 5432);
        assert_eq!(loaded.password, "hunter2");
        assert!(!loaded.ssl);

        assert!(store.get_profile(created.id + 100).unwrap().is_none());
    }

    #[test]
    fn profile_ids_increase_monotonically() {
        let (store, _dir) = store();
        let a = store.insert_profile(&draft("a")).unwrap();
        let b = store.insert_profile(&draft("b")).unwrap();
        let c = store.insert_profile(&draft("c")).unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn update_overwrites_and_rejects_unknown_ids() {
        let (store, _dir) = store();
        let created = store.insert_profile(&draft("staging")).unwrap();

        let mut edited = draft("production");
        edited.port = 5433;
        edited.ssl = true;
        let updated = store.update_profile(created.id, &edited).unwrap();
        assert_eq!(updated.name, "production");
        assert_eq!(updated.port, 5433);
        assert!(updated.ssl);

        let err = store.update_profile(created.id + 100, &edited).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let (store, _dir) = store();
        let created = store.insert_profile(&draft("staging")).unwrap();
        assert!(store.delete_profile(created.id).unwrap());
        assert!(!store.delete_profile(created.id).unwrap());
        assert!(store.get_profile(created.id).unwrap().is_none());
    }

    #[test]
    fn touch_last_connected_sets_timestamp() {
        let (store, _dir) = store();
        let created = store.insert_profile(&draft("staging")).unwrap();
        store.touch_last_connected(created.id).unwrap();
        let loaded = store.get_profile(created.id).unwrap().unwrap();
        assert!(loaded.last_connected_at.is_some());
    }

    #[test]
    fn list_orders_recently_connected_first() {
        let (store, _dir) = store();
        let a = store.insert_profile(&draft("alpha")).unwrap();
        let b = store.insert_profile(&draft("beta")).unwrap();
        store.touch_last_connected(b.id).unwrap();

        let profiles = store.list_profiles().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, b.id);
        assert_eq!(profiles[1].id, a.id);
    }

    #[test]
    fn saved_queries_round_trip() {
        let (store, _dir) = store();
        let profile = store.insert_profile(&draft("staging")).unwrap();

        let q = store
            .insert_saved_query(
                &SavedQueryDraft::new("top orders", "SELECT * FROM orders LIMIT 10")
                    .for_profile(profile.id),
            )
            .unwrap();
        assert!(q.id > 0);
        assert_eq!(q.profile_id, Some(profile.id));

        let loaded = store.get_saved_query(q.id).unwrap().unwrap();
        assert_eq!(loaded.sql, "SELECT * FROM orders LIMIT 10");

        let renamed = store
            .update_saved_query(q.id, &SavedQueryDraft::new("orders", "SELECT 1"))
            .unwrap();
        assert_eq!(renamed.name, "orders");
        assert_eq!(renamed.profile_id, None);

        assert!(store.delete_saved_query(q.id).unwrap());
        assert!(store.get_saved_query(q.id).unwrap().is_none());
    }

    #[test]
    fn deleting_a_profile_orphans_its_saved_queries() {
        let (store, _dir) = store();
        let profile = store.insert_profile(&draft("staging")).unwrap();
        let q = store
            .insert_saved_query(&SavedQueryDraft::new("q", "SELECT 1").for_profile(profile.id))
            .unwrap();

        store.delete_profile(profile.id).unwrap();

        let orphan = store.get_saved_query(q.id).unwrap().unwrap();
        assert_eq!(orphan.profile_id, None);
        assert_eq!(orphan.sql, "SELECT 1");
    }

    #[test]
    fn deleting_a_profile_removes_its_history() {
        let (store, _dir) = store();
        let profile = store.insert_profile(&draft("staging")).unwrap();

        let entry = QueryHistoryEntry::from_error(profile.id, "SELECT nope", "boom");
        store.add_history(&entry).unwrap();
        assert_eq!(store.recent_history(profile.id, 10).unwrap().len(), 1);

        store.delete_profile(profile.id).unwrap();
        assert!(store.recent_history(profile.id, 10).unwrap().is_empty());
    }

    #[test]
    fn history_is_recent_first_and_bounded() {
        let (store, _dir) = store();
        let profile = store.insert_profile(&draft("staging")).unwrap();

        for i in 0..5 {
            let entry = QueryHistoryEntry {
                id: 0,
                profile_id: profile.id,
                sql: format!("SELECT {i}"),
                elapsed_ms: Some(i),
                row_count: Some(1),
                error_message: None,
                executed_at: Utc::now(),
            };
            store.add_history(&entry).unwrap();
        }

        let recent = store.recent_history(profile.id, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].sql, "SELECT 4");

        store.clear_history(profile.id).unwrap();
        assert!(store.recent_history(profile.id, 10).unwrap().is_empty());
    }

    #[test]
    fn store_reopens_with_existing_data() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = MetadataStore::open(dir.path().to_path_buf()).unwrap();
            store.insert_profile(&draft("staging")).unwrap().id
        };

        let store = MetadataStore::open(dir.path().to_path_buf()).unwrap();
        let loaded = store.get_profile(id).unwrap().unwrap();
        assert_eq!(loaded.name, "staging");
    }
}
