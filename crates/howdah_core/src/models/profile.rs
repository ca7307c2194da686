//! Connection profile models.

use crate::error::{ErrorInfo, HowdahError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    5432
}

fn default_active() -> bool {
    true
}

/// A saved connection profile identifying one external database target.
///
/// The surrogate id is assigned by the metadata store on creation and is
/// stable for the profile's lifetime. The six connection-affecting fields
/// (host, port, database, username, password, ssl) jointly determine pool
/// identity; `settings()` exposes them for comparison.
///
/// The password is persisted in clear text in the metadata store (a flagged
/// property of the design, see DESIGN.md) but is never serialized outward
/// and never logged.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionProfile {
    /// Surrogate identifier assigned on creation.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Server hostname or IP.
    pub host: String,
    /// Server port (default 5432).
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Login username.
    pub username: String,
    /// Login password. Excluded from serialized output.
    #[serde(skip_serializing)]
    pub password: String,
    /// Whether to negotiate TLS with the target.
    pub ssl: bool,
    /// When a pool for this profile last connected successfully.
    pub last_connected_at: Option<DateTime<Utc>>,
    /// Whether the profile is active.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ConnectionProfile {
    /// Extract the connection-affecting fields as a draft.
    pub fn settings(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ssl: self.ssl,
            active: self.active,
        }
    }

    /// Get the display connection string (without password).
    pub fn display_url(&self) -> String {
        format!("postgresql://{}@{}:{}/{}", self.username, self.host, self.port, self.database)
    }
}

/// The shape of a connection profile before it has an identity.
///
/// Used as the payload for create/update operations and as the candidate
/// shape handed to the prober.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDraft {
    /// Display name.
    pub name: String,
    /// Server hostname or IP.
    pub host: String,
    /// Server port (default 5432).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Login username.
    pub username: String,
    /// Login password. Excluded from serialized output.
    #[serde(skip_serializing)]
    pub password: String,
    /// Whether to negotiate TLS with the target.
    #[serde(default)]
    pub ssl: bool,
    /// Whether the profile is active.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ProfileDraft {
    /// Create a draft with required fields and defaults for the rest.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: 5432,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            ssl: false,
            active: true,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable TLS.
    pub fn with_ssl(mut self) -> Self {
        self.ssl = true;
        self
    }

    /// Validate the draft's shape before any network call.
    pub fn validate(&self) -> Result<(), HowdahError> {
        if self.name.is_empty() || self.name.len() > 255 {
            return Err(HowdahError::validation_field("Name must be 1-255 characters", "name"));
        }
        if self.host.is_empty() {
            return Err(HowdahError::validation_field("Host is required", "host"));
        }
        if self.port == 0 {
            return Err(HowdahError::validation_field("Port must be nonzero", "port"));
        }
        if self.database.is_empty() || self.database.len() > 63 {
            return Err(HowdahError::validation_field(
                "Database name must be 1-63 characters",
                "database",
            ));
        }
        if self.username.is_empty() {
            return Err(HowdahError::validation_field("Username is required", "username"));
        }
        Ok(())
    }

    /// Whether the six pool-identity fields match another draft.
    ///
    /// Name and active flag are excluded: changing them must not invalidate
    /// a cached pool.
    pub fn connection_fields_eq(&self, other: &ProfileDraft) -> bool {
        self.host == other.host
            && self.port == other.port
            && self.database == other.database
            && self.username == other.username
            && self.password == other.password
            && self.ssl == other.ssl
    }

    /// Get the display connection string (without password).
    pub fn display_url(&self) -> String {
        format!("postgresql://{}@{}:{}/{}", self.username, self.host, self.port, self.database)
    }
}

/// Outcome of probing a candidate profile.
///
/// `success` is the probe's verdict; the rest is diagnostic context for the
/// caller to surface.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Whether a session was acquired and released successfully.
    pub success: bool,
    /// Server version string, when the probe reached the target.
    pub server_version: Option<String>,
    /// Wall-clock time the probe took.
    pub latency_ms: u64,
    /// Failure information, when the probe did not succeed.
    pub error: Option<ErrorInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProfileDraft {
        ProfileDraft::new("staging", "db.internal", "orders", "reporter", "hunter2")
    }

    #[test]
    fn validate_accepts_complete_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut d = draft();
        d.host.clear();
        let err = d.validate().unwrap_err();
        assert_eq!(err.category(), "Validation");
        assert!(err.to_string().contains("Host"));

        let mut d = draft();
        d.port = 0;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.database = "x".repeat(64);
        assert!(d.validate().is_err());
    }

    #[test]
    fn name_change_does_not_affect_pool_identity() {
        let a = draft();
        let mut b = draft();
        b.name = "production".to_string();
        b.active = false;
        assert!(a.connection_fields_eq(&b));
    }

    #[test]
    fn each_connection_field_affects_pool_identity() {
        let a = draft();

        let mut b = draft();
        b.host = "other.internal".to_string();
        assert!(!a.connection_fields_eq(&b));

        let mut b = draft();
        b.port = 5433;
        assert!(!a.connection_fields_eq(&b));

        let mut b = draft();
        b.database = "billing".to_string();
        assert!(!a.connection_fields_eq(&b));

        let mut b = draft();
        b.username = "admin".to_string();
        assert!(!a.connection_fields_eq(&b));

        let mut b = draft();
        b.password = "changed".to_string();
        assert!(!a.connection_fields_eq(&b));

        let mut b = draft();
        b.ssl = true;
        assert!(!a.connection_fields_eq(&b));
    }

    #[test]
    fn display_url_omits_password() {
        let url = draft().display_url();
        assert_eq!(url, "postgresql://reporter@db.internal:5432/orders");
        assert!(!url.contains("hunter2"));
    }

    #[test]
    fn serialized_draft_omits_password() {
        let json = serde_json::to_string(&draft()).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn draft_deserializes_with_defaults() {
        let d: ProfileDraft = serde_json::from_str(
            r#"{"name":"n","host":"h","database":"d","username":"u","password":"p"}"#,
        )
        .unwrap();
        assert_eq!(d.port, 5432);
        assert!(!d.ssl);
        assert!(d.active);
    }
}
