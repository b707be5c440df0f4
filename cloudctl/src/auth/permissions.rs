//! Permission resolution and checking.
//!
//! Effective permissions for a user are the union of the grants attached to
//! the user's role and the grants attached directly to the user. The union
//! is computed fresh on every call - permissions are never cached in the
//! session token, so a permission revoked mid-session takes effect on the
//! next request even though the token stays valid until its expiry.
//!
//! Bypass roles (`admin`, `msp`) hold every permission without grant rows.
//! That shortcut is the first guard clause of [`has_permission`], a separate
//! and faster code path from the general union - the two paths agree when a
//! bypass role also happens to hold explicit grants, since the union result
//! is simply ignored for them.

use std::collections::HashSet;

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    api::models::users::{CurrentUser, Role},
    db::handlers::Permissions,
    errors::Result,
    types::{UserId, abbrev_uuid},
};

/// Compute the effective permission set for a user: role grants unioned with
/// per-user override grants. Set semantics; duplicates collapse.
#[instrument(skip(conn), fields(user_id = %abbrev_uuid(&user_id)))]
pub async fn resolve_permissions(conn: &mut PgConnection, user_id: UserId, role: Role) -> Result<HashSet<String>> {
    let mut repo = Permissions::new(conn);
    Ok(repo.effective_for(user_id, role).await?)
}

/// Check whether a user holds a named permission.
///
/// Bypass roles return `true` immediately, without consulting the grant
/// tables - even for permission names that do not exist.
#[instrument(skip(conn, user), fields(user_id = %abbrev_uuid(&user.id)))]
pub async fn has_permission(conn: &mut PgConnection, user: &CurrentUser, permission: &str) -> Result<bool> {
    if user.role.is_bypass() {
        return Ok(true);
    }

    let effective = resolve_permissions(conn, user.id, user.role).await?;
    Ok(effective.contains(permission))
}

/// Check a permission and fail with a uniform `Forbidden` when absent.
pub async fn require_permission(conn: &mut PgConnection, user: &CurrentUser, permission: &str) -> Result<()> {
    if has_permission(conn, user, permission).await? {
        Ok(())
    } else {
        Err(crate::errors::Error::Forbidden)
    }
}
