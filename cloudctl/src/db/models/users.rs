//! Database models for users.

use crate::api::models::users::Role;
use crate::types::{TenantId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub auth_source: String,
    pub external_user_id: Option<String>,
    pub password_hash: Option<String>,
}

/// Database request for updating a user
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub tenant_id: Option<TenantId>,
    pub password_hash: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub auth_source: String,
    pub external_user_id: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
