//! One-shot reachability and credential checks.
//!
//! A probe opens a dedicated, throwaway pool against a candidate profile —
//! persisted or not — acquires one session, and disposes of the pool on
//! every exit path. It never touches the [`PoolRegistry`]: probing must not
//! create a long-lived pool as a side effect.
//!
//! [`PoolRegistry`]: crate::services::registry::PoolRegistry

use crate::error::HowdahError;
use crate::models::{ProbeReport, ProfileDraft};
use crate::services::connection::ConnectionPool;

use std::time::{Duration, Instant};

/// Bound on connection establishment during a probe.
pub const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Service for verifying that a candidate profile's target is reachable.
pub struct ConnectionProber;

impl ConnectionProber {
    /// Check a candidate profile, returning the server version on success.
    ///
    /// Validates the draft's shape first, so an incomplete draft fails with
    /// Validation before any network I/O. Failure is reported, never
    /// retried.
    pub async fn check(draft: &ProfileDraft) -> Result<String, HowdahError> {
        draft.validate()?;

        let pool = ConnectionPool::open(draft, 1, Some(PROBE_CONNECT_TIMEOUT))?;

        let outcome = async {
            let conn = pool.get().await?;
            let row = conn.query_one("SELECT version()", &[]).await?;
            Ok::<String, HowdahError>(row.get(0))
        }
        .await;

        // Disposal is unconditional; the deliberately throwaway pool must
        // not outlive the check whatever the outcome.
        pool.close();

        match &outcome {
            Ok(version) => {
                tracing::info!(target = %draft.display_url(), version = %version, "Probe succeeded")
            }
            Err(e) => {
                tracing::warn!(target = %draft.display_url(), error = %e, "Probe failed")
            }
        }
        outcome
    }

    /// Probe a candidate profile and report the outcome.
    ///
    /// Never fails: every error is folded into the report for the caller to
    /// surface alongside the tested connection data.
    pub async fn probe(draft: &ProfileDraft) -> ProbeReport {
        let start = Instant::now();
        match Self::check(draft).await {
            Ok(version) => ProbeReport {
                success: true,
                server_version: Some(version),
                latency_ms: start.elapsed().as_millis() as u64,
                error: None,
            },
            Err(e) => ProbeReport {
                success: false,
                server_version: None,
                latency_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_error_info()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_draft_fails_before_any_network_io() {
        let mut draft = ProfileDraft::new("t", "db.internal", "orders", "reporter", "pw");
        draft.host.clear();

        let err = ConnectionProber::check(&draft).await.unwrap_err();
        assert_eq!(err.category(), "Validation");

        let report = ConnectionProber::probe(&draft).await;
        assert!(!report.success);
        assert!(report.server_version.is_none());
        assert_eq!(report.error.unwrap().category, "Validation");
    }
}
