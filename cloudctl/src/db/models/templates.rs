//! Database models for catalog templates.

use crate::types::{TemplateId, TenantId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a catalog template
#[derive(Debug, Clone)]
pub struct TemplateCreateDBRequest {
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// Database response for a catalog template
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateDBResponse {
    pub id: TemplateId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
