//! Saved query models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named SQL text persisted in the metadata store.
///
/// The SQL is stored verbatim; it is never parsed or validated against the
/// target schema. The profile reference is nullable and becomes NULL when
/// the owning profile is deleted.
#[derive(Debug, Clone, Serialize)]
pub struct SavedQuery {
    /// Surrogate identifier assigned on creation.
    pub id: i64,
    /// Owning connection profile, if any.
    pub profile_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// The SQL text.
    pub sql: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating a saved query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQueryDraft {
    /// Owning connection profile, if any.
    #[serde(default)]
    pub profile_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// The SQL text, stored verbatim.
    pub sql: String,
}

impl SavedQueryDraft {
    /// Create a draft not tied to any profile.
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self { profile_id: None, name: name.into(), sql: sql.into() }
    }

    /// Tie the draft to a profile.
    pub fn for_profile(mut self, profile_id: i64) -> Self {
        self.profile_id = Some(profile_id);
        self
    }
}
