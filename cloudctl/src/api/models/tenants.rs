//! API request/response models for tenants.

use crate::db::models::tenants::TenantDBResponse;
use crate::types::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tenant response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TenantDBResponse> for TenantResponse {
    fn from(db: TenantDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            created_at: db.created_at,
        }
    }
}
