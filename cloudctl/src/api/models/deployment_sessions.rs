//! API request/response models for deployment wizard sessions.

use crate::types::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to open a wizard session, bound to the tenant the wizard was
/// opened against.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentSessionOpen {
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
}

/// An open wizard session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentSessionResponse {
    pub token: String,
    #[schema(value_type = String, format = "uuid")]
    pub tenant_id: TenantId,
    pub expires_at: DateTime<Utc>,
}

/// Result of revalidating a wizard session before the deploy action.
///
/// `valid: false` means no session was ever opened (or it was cleared); the
/// wizard must be re-opened. When valid, `token` is the value the client
/// must present - it may differ from the one originally issued if the
/// session was regenerated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentSessionRefreshResponse {
    pub valid: bool,
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
