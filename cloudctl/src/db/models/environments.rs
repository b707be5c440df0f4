//! Database models for environments.

use crate::types::{EnvironmentId, TenantId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating an environment
#[derive(Debug, Clone)]
pub struct EnvironmentCreateDBRequest {
    pub tenant_id: TenantId,
    pub name: String,
    pub created_by: UserId,
}

/// Database response for an environment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnvironmentDBResponse {
    pub id: EnvironmentId,
    pub tenant_id: TenantId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
