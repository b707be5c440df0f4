//! API request/response models for deployments.

use crate::db::models::deployments::{DeploymentDBResponse, DeploymentStatus};
use crate::types::{CloudAccountId, DeploymentId, EnvironmentId, TemplateId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to create a deployment (the wizard's terminal "deploy" action)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentCreate {
    pub name: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub template_id: Option<TemplateId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub cloud_account_id: Option<CloudAccountId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub environment_id: Option<EnvironmentId>,
}

/// Deployment response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DeploymentId,
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
    pub name: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub template_id: Option<TemplateId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub cloud_account_id: Option<CloudAccountId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub environment_id: Option<EnvironmentId>,
    pub status: DeploymentStatus,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeploymentDBResponse> for DeploymentResponse {
    fn from(db: DeploymentDBResponse) -> Self {
        Self {
            id: db.id,
            tenant_id: db.tenant_id,
            name: db.name,
            template_id: db.template_id,
            cloud_account_id: db.cloud_account_id,
            environment_id: db.environment_id,
            status: db.status,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
