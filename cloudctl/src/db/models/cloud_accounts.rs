//! Database models for cloud accounts.

use crate::types::{CloudAccountId, TenantId, UserId};
use chrono::{DateTime, Utc};

/// Database request for connecting a cloud account to a tenant
#[derive(Debug, Clone)]
pub struct CloudAccountCreateDBRequest {
    pub tenant_id: TenantId,
    pub name: String,
    pub provider: String,
    pub created_by: UserId,
}

/// Database response for a cloud account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CloudAccountDBResponse {
    pub id: CloudAccountId,
    pub tenant_id: TenantId,
    pub name: String,
    pub provider: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
