//! Server-side SSO state tracking.
//!
//! The authorization-code flow is defended by a server-issued anti-CSRF
//! state value. States are generated with cryptographically strong
//! randomness, recorded here keyed by the state string, and consumed
//! single-use at callback time: [`SsoStates::take`] removes the entry
//! whether or not the rest of the exchange succeeds, so a replayed callback
//! URL can never be exchanged twice. Entries also expire after a TTL that
//! bounds the redirect round-trip.
//!
//! Comparison happens server-side against this record. Earlier builds of
//! the dashboard kept the state in browser storage and compared it
//! client-side before calling the server; an attacker controlling the
//! client can skip that check entirely, so the server-held record is
//! authoritative here.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::auth::password::generate_opaque_token;

/// Pending sign-in attempt stored between initiate and callback.
#[derive(Debug, Clone)]
pub struct PendingSsoState {
    pub provider_type: String,
    pub redirect_uri: String,
    pub created_at: Instant,
}

/// In-memory store of outstanding SSO states (keyed by state value).
pub struct SsoStates {
    states: DashMap<String, PendingSsoState>,
    ttl: Duration,
}

impl SsoStates {
    pub fn new(ttl: Duration) -> Self {
        Self {
            states: DashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh state for a sign-in attempt and record it.
    pub fn issue(&self, provider_type: &str, redirect_uri: &str) -> String {
        let state = generate_opaque_token();
        self.states.insert(
            state.clone(),
            PendingSsoState {
                provider_type: provider_type.to_string(),
                redirect_uri: redirect_uri.to_string(),
                created_at: Instant::now(),
            },
        );
        state
    }

    /// Take (remove and return) a pending state entry.
    ///
    /// Single-use: the entry is removed regardless of what the caller does
    /// next. Returns `None` if the state was never issued, already consumed,
    /// or has outlived the TTL - indistinguishable outcomes by design.
    pub fn take(&self, state: &str) -> Option<PendingSsoState> {
        let (_, pending) = self.states.remove(state)?;
        if pending.created_at.elapsed() > self.ttl {
            return None;
        }
        Some(pending)
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let before = self.states.len();
        self.states.retain(|_, v| v.created_at.elapsed() <= self.ttl);
        let evicted = before - self.states.len();
        if evicted > 0 {
            debug!(evicted, "Evicted expired SSO states");
        }
    }

    /// Spawn a periodic cleanup task, stopped via the cancellation token.
    pub fn spawn_cleanup_task(self: &std::sync::Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => store.cleanup(),
                }
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, state: String, pending: PendingSsoState) {
        self.states.insert(state, pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pending(provider: &str, age: Duration) -> PendingSsoState {
        PendingSsoState {
            provider_type: provider.to_string(),
            redirect_uri: "http://localhost/sso/callback".to_string(),
            created_at: Instant::now() - age,
        }
    }

    #[test]
    fn test_issued_states_are_unique_and_long() {
        let store = SsoStates::new(Duration::from_secs(600));
        let s1 = store.issue("okta", "http://localhost/cb");
        let s2 = store.issue("okta", "http://localhost/cb");

        assert_ne!(s1, s2);
        // 32 bytes of randomness, base64url
        assert_eq!(s1.len(), 43);
    }

    #[test]
    fn test_take_is_single_use() {
        let store = SsoStates::new(Duration::from_secs(600));
        let state = store.issue("okta", "http://localhost/cb");

        let taken = store.take(&state);
        assert!(taken.is_some());
        assert_eq!(taken.unwrap().provider_type, "okta");

        // Second take returns None (consumed)
        assert!(store.take(&state).is_none());
    }

    #[test]
    fn test_unknown_state_returns_none() {
        let store = SsoStates::new(Duration::from_secs(600));
        assert!(store.take("never-issued").is_none());
    }

    #[test]
    fn test_expired_state_returns_none() {
        let store = SsoStates::new(Duration::from_secs(600));
        store.insert_raw("old".to_string(), pending("okta", Duration::from_secs(700)));

        assert!(store.take("old").is_none());
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let store = SsoStates::new(Duration::from_secs(600));
        let fresh = store.issue("okta", "http://localhost/cb");
        store.insert_raw("stale".to_string(), pending("okta", Duration::from_secs(700)));

        store.cleanup();
        assert!(store.take(&fresh).is_some());
        assert!(store.take("stale").is_none());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_cancel() {
        let store = Arc::new(SsoStates::new(Duration::from_secs(600)));
        let shutdown = CancellationToken::new();
        let handle = store.spawn_cleanup_task(shutdown.clone());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
