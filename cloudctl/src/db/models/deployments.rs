//! Database models for deployments.

use crate::types::{CloudAccountId, DeploymentId, EnvironmentId, TemplateId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a deployment. Execution itself is driven by an
/// external engine; this subsystem only records the state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "deployment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Database request for creating a deployment
#[derive(Debug, Clone)]
pub struct DeploymentCreateDBRequest {
    pub tenant_id: TenantId,
    pub name: String,
    pub template_id: Option<TemplateId>,
    pub cloud_account_id: Option<CloudAccountId>,
    pub environment_id: Option<EnvironmentId>,
    pub created_by: UserId,
}

/// Database request for updating a deployment
#[derive(Debug, Clone, Default)]
pub struct DeploymentUpdateDBRequest {
    pub status: Option<DeploymentStatus>,
}

/// Database response for a deployment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeploymentDBResponse {
    pub id: DeploymentId,
    pub tenant_id: TenantId,
    pub name: String,
    pub template_id: Option<TemplateId>,
    pub cloud_account_id: Option<CloudAccountId>,
    pub environment_id: Option<EnvironmentId>,
    pub status: DeploymentStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
