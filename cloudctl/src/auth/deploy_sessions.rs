//! Ephemeral deployment-wizard sessions.
//!
//! A deployment session scopes one run of the deployment wizard: created
//! when the wizard opens, revalidated immediately before the terminal
//! "deploy" action, and cleared on unmount or after a successful deploy so
//! a re-opened wizard always starts from a fresh token.
//!
//! This is an advisory guard, not a security boundary. The authoritative
//! authorization for the deploy action is always the session token plus the
//! tenant gate plus the permission resolver; the deployment session exists
//! only to stop a wizard whose originating context (tenant or cloud-account
//! selection) has silently gone stale from firing a deploy against it.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::auth::password::generate_opaque_token;
use crate::config::DeploymentSessionConfig;
use crate::types::{TenantId, UserId};

/// One open wizard session.
#[derive(Debug, Clone)]
pub struct DeploymentSession {
    pub token: String,
    pub tenant_id: TenantId,
    pub expires_at: DateTime<Utc>,
}

/// In-memory store of wizard sessions, one per user.
pub struct DeploymentSessions {
    sessions: DashMap<UserId, DeploymentSession>,
    ttl: Duration,
    refresh_threshold: Duration,
}

impl DeploymentSessions {
    pub fn new(config: &DeploymentSessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_std(config.ttl).unwrap_or_else(|_| Duration::minutes(30)),
            refresh_threshold: Duration::from_std(config.refresh_threshold).unwrap_or_else(|_| Duration::minutes(5)),
        }
    }

    /// Open a wizard session for a user, bound to the tenant selected when
    /// the wizard mounted. Re-invocation before first use overwrites the
    /// previous session rather than stacking a second one.
    pub fn generate(&self, user_id: UserId, tenant_id: TenantId) -> DeploymentSession {
        let session = DeploymentSession {
            token: generate_opaque_token(),
            tenant_id,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.insert(user_id, session.clone());
        session
    }

    /// Revalidate the user's wizard session ahead of the deploy action.
    ///
    /// Returns `None` when no session was ever opened - the wizard must be
    /// mounted first. An unexpired session near its expiry gets its window
    /// extended; an expired one is regenerated once, keeping the original
    /// wizard context. Either way the caller receives the token the client
    /// must present to the deploy action.
    pub fn ensure_valid(&self, user_id: UserId) -> Option<DeploymentSession> {
        let mut entry = self.sessions.get_mut(&user_id)?;
        let now = Utc::now();

        if entry.expires_at <= now {
            // Expired: one regeneration for the same context, then the
            // client holds a fresh token again.
            debug!(user_id = %user_id, "Regenerating expired deployment session");
            entry.token = generate_opaque_token();
            entry.expires_at = now + self.ttl;
        } else if entry.expires_at - now <= self.refresh_threshold {
            entry.expires_at = now + self.ttl;
        }

        Some(entry.clone())
    }

    /// Strict check used by the deploy action itself: the presented token
    /// must match the stored session exactly and be unexpired, and the
    /// session must be bound to the tenant being deployed into.
    pub fn validate(&self, user_id: UserId, tenant_id: TenantId, token: &str) -> bool {
        match self.sessions.get(&user_id) {
            Some(session) => session.token == token && session.tenant_id == tenant_id && session.expires_at > Utc::now(),
            None => false,
        }
    }

    /// Drop the user's wizard session. Called on wizard unmount and after a
    /// successful deploy.
    pub fn clear(&self, user_id: UserId) {
        self.sessions.remove(&user_id);
    }

    /// Evict expired sessions.
    pub fn cleanup(&self) {
        let now = Utc::now();
        self.sessions.retain(|_, session| session.expires_at > now);
    }

    /// Spawn a periodic cleanup task, stopped via the cancellation token.
    pub fn spawn_cleanup_task(self: &std::sync::Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => store.cleanup(),
                }
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, user_id: UserId, session: DeploymentSession) {
        self.sessions.insert(user_id, session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn store() -> DeploymentSessions {
        DeploymentSessions::new(&DeploymentSessionConfig::default())
    }

    #[test]
    fn test_ensure_before_generate_is_none() {
        let sessions = store();
        // No wizard was ever opened: falsy, not a panic
        assert!(sessions.ensure_valid(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_generate_then_ensure_is_valid() {
        let sessions = store();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let opened = sessions.generate(user, tenant);
        let ensured = sessions.ensure_valid(user).unwrap();

        assert_eq!(ensured.token, opened.token);
        assert!(sessions.validate(user, tenant, &ensured.token));
    }

    #[test]
    fn test_regenerate_overwrites_instead_of_stacking() {
        let sessions = store();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let first = sessions.generate(user, tenant);
        let second = sessions.generate(user, tenant);

        assert_ne!(first.token, second.token);
        // Only the latest token is honored
        assert!(!sessions.validate(user, tenant, &first.token));
        assert!(sessions.validate(user, tenant, &second.token));
    }

    #[test]
    fn test_expired_session_is_regenerated_once_with_same_context() {
        let sessions = store();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        sessions.insert_raw(
            user,
            DeploymentSession {
                token: "stale-token".to_string(),
                tenant_id: tenant,
                expires_at: Utc::now() - Duration::minutes(1),
            },
        );

        let ensured = sessions.ensure_valid(user).unwrap();
        assert_ne!(ensured.token, "stale-token");
        assert_eq!(ensured.tenant_id, tenant);
        assert!(ensured.expires_at > Utc::now());

        // The stale token no longer validates
        assert!(!sessions.validate(user, tenant, "stale-token"));
        assert!(sessions.validate(user, tenant, &ensured.token));
    }

    #[test]
    fn test_near_expiry_refresh_keeps_token() {
        let sessions = store();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        sessions.insert_raw(
            user,
            DeploymentSession {
                token: "nearly-expired".to_string(),
                tenant_id: tenant,
                expires_at: Utc::now() + Duration::minutes(1),
            },
        );

        let ensured = sessions.ensure_valid(user).unwrap();
        // Same token, extended window
        assert_eq!(ensured.token, "nearly-expired");
        assert!(ensured.expires_at > Utc::now() + Duration::minutes(10));
    }

    #[test]
    fn test_validate_rejects_wrong_tenant() {
        let sessions = store();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let opened = sessions.generate(user, tenant);
        // Bound context: a different tenant does not validate
        assert!(!sessions.validate(user, Uuid::new_v4(), &opened.token));
    }

    #[test]
    fn test_clear_then_ensure_is_none() {
        let sessions = store();
        let user = Uuid::new_v4();

        sessions.generate(user, Uuid::new_v4());
        sessions.clear(user);

        assert!(sessions.ensure_valid(user).is_none());
    }

    #[test]
    fn test_cleanup_evicts_expired_only() {
        let sessions = store();
        let fresh_user = Uuid::new_v4();
        let stale_user = Uuid::new_v4();

        sessions.generate(fresh_user, Uuid::new_v4());
        sessions.insert_raw(
            stale_user,
            DeploymentSession {
                token: "old".to_string(),
                tenant_id: Uuid::new_v4(),
                expires_at: Utc::now() - Duration::minutes(1),
            },
        );

        sessions.cleanup();
        assert!(sessions.ensure_valid(fresh_user).is_some());
        assert!(sessions.ensure_valid(stale_user).is_none());
    }
}
