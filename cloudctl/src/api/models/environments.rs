//! API request/response models for environments.

use crate::db::models::environments::EnvironmentDBResponse;
use crate::types::{EnvironmentId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to create an environment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnvironmentCreate {
    pub name: String,
}

/// Environment response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnvironmentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EnvironmentId,
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
    pub name: String,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<EnvironmentDBResponse> for EnvironmentResponse {
    fn from(db: EnvironmentDBResponse) -> Self {
        Self {
            id: db.id,
            tenant_id: db.tenant_id,
            name: db.name,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}
