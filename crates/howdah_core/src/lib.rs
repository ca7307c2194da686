//! Core service layer for Howdah, a web-based PostgreSQL administration
//! tool.
//!
//! This crate provides everything behind the HTTP surface:
//!
//! - **error**: Error handling with PostgreSQL-specific details
//! - **models**: Profiles, query results, schema descriptors
//! - **services**: Pool registry, prober, introspector, executor, reader,
//!   metadata store
//! - **state**: Application state composition
//! - **logging**: Structured logging setup

pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{ErrorInfo, HowdahError};
pub use models::{
    ColumnDescriptor, ConnectionProfile, DatabaseInfo, FieldDescriptor, ForeignKeyDescriptor,
    IndexDescriptor, JsonRow, PageRequest, ProbeReport, ProfileDraft, QueryHistoryEntry,
    QueryResult, QueryType, SavedQuery, SavedQueryDraft, TablePage, TableSchema, TableSummary,
};
pub use services::{
    ConnectionPool, ConnectionProber, MetadataStore, PoolRegistry, ProfileService, QueryExecutor,
    SchemaIntrospector, TableReader,
};
pub use state::HowdahState;
