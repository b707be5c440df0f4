//! Database models for tenants.

use crate::types::TenantId;
use chrono::{DateTime, Utc};

/// Database request for creating a new tenant
#[derive(Debug, Clone)]
pub struct TenantCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Database response for a tenant
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TenantDBResponse {
    pub id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
