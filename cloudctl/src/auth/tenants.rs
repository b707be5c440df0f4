//! Tenant access gating.
//!
//! Every tenant-scoped read or write must pass this gate before touching
//! tenant-scoped storage. A denied check yields a uniform `Forbidden` - the
//! response for a tenant that exists but is off-limits is byte-identical to
//! the response for a tenant that does not exist, so the error channel
//! cannot be used to probe which tenant ids are real.

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::TenantId,
};

/// Decide whether a caller may act on the named tenant.
///
/// `admin` and `msp` may act on any tenant. Everyone else may act only on
/// their own home tenant, compared by strict equality on the tenant's
/// external id.
pub fn can_access_tenant(role: Role, home_tenant: Option<TenantId>, target: TenantId) -> bool {
    if role.is_bypass() {
        return true;
    }

    home_tenant == Some(target)
}

/// Gate a tenant-scoped operation, failing closed with a uniform `Forbidden`.
pub fn require_tenant_access(user: &CurrentUser, target: TenantId) -> Result<()> {
    if can_access_tenant(user.role, user.tenant_id, target) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with(role: Role, home: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "gate@example.com".to_string(),
            display_name: None,
            role,
            tenant_id: home,
        }
    }

    #[test]
    fn test_non_bypass_user_only_reaches_home_tenant() {
        let home = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(can_access_tenant(Role::User, Some(home), home));
        assert!(!can_access_tenant(Role::User, Some(home), other));
        // No home tenant at all: nothing is reachable
        assert!(!can_access_tenant(Role::User, None, other));
    }

    #[test]
    fn test_bypass_roles_reach_arbitrary_tenants() {
        let unrelated = Uuid::new_v4();

        assert!(can_access_tenant(Role::Admin, None, unrelated));
        assert!(can_access_tenant(Role::Msp, None, unrelated));
        // Even with a home tenant set, the bypass wins
        assert!(can_access_tenant(Role::Admin, Some(Uuid::new_v4()), unrelated));
    }

    #[test]
    fn test_require_tenant_access_fails_with_uniform_forbidden() {
        let user = user_with(Role::User, Some(Uuid::new_v4()));
        let err = require_tenant_access(&user, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::Forbidden));
        // The message carries no tenant information
        assert_eq!(err.user_message(), "Forbidden");
    }
}
