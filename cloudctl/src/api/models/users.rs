//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::{TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role assigned to a user account. Each user carries exactly one role.
///
/// `Admin` and `Msp` are bypass roles: they hold every permission without
/// explicit grant rows, and `Msp` additionally acts across every tenant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Msp,
    User,
}

impl Role {
    /// Whether this role skips the grant tables and the tenant gate.
    ///
    /// Checked as an explicit guard clause at the top of both the permission
    /// resolver and the tenant access gate - an intentional shortcut, kept as
    /// its own code path so it stays auditable and testable on its own.
    pub fn is_bypass(self) -> bool {
        matches!(self, Role::Admin | Role::Msp)
    }
}

/// User response returned by the API. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub tenant_id: Option<TenantId>,
    pub auth_source: String,
    pub external_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            display_name: db.display_name,
            role: db.role,
            tenant_id: db.tenant_id,
            auth_source: db.auth_source,
            external_user_id: db.external_user_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// The authenticated caller, as resolved per request.
///
/// Identity (`id`, `email`) comes from the verified session token; `role` and
/// `tenant_id` are re-read from the credential store on every request so that
/// role or tenant changes take effect mid-session even though the token
/// itself stays valid until its embedded expiry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub tenant_id: Option<TenantId>,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            display_name: db.display_name,
            role: db.role,
            tenant_id: db.tenant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_roles() {
        assert!(Role::Admin.is_bypass());
        assert!(Role::Msp.is_bypass());
        assert!(!Role::User.is_bypass());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Msp).unwrap(), "\"msp\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
