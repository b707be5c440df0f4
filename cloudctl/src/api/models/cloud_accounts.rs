//! API request/response models for cloud accounts.

use crate::db::models::cloud_accounts::CloudAccountDBResponse;
use crate::types::{CloudAccountId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to connect a cloud account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloudAccountCreate {
    pub name: String,
    /// Cloud provider identifier (e.g. "aws", "azure", "gcp")
    pub provider: String,
}

/// Cloud account response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloudAccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CloudAccountId,
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
    pub name: String,
    pub provider: String,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<CloudAccountDBResponse> for CloudAccountResponse {
    fn from(db: CloudAccountDBResponse) -> Self {
        Self {
            id: db.id,
            tenant_id: db.tenant_id,
            name: db.name,
            provider: db.provider,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}
