//! API request/response models for catalog templates.

use crate::db::models::templates::TemplateDBResponse;
use crate::types::{TemplateId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to create a catalog template
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateCreate {
    pub name: String,
    pub description: Option<String>,
}

/// Catalog template response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TemplateId,
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<TemplateDBResponse> for TemplateResponse {
    fn from(db: TemplateDBResponse) -> Self {
        Self {
            id: db.id,
            tenant_id: db.tenant_id,
            name: db.name,
            description: db.description,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}
