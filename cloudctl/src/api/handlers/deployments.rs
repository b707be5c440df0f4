use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    AppState,
    api::models::{
        deployments::{DeploymentCreate, DeploymentResponse},
        users::CurrentUser,
    },
    auth::{permissions::require_permission, tenants::require_tenant_access},
    db::{
        handlers::{Deployments, Repository, deployments::DeploymentFilter},
        models::deployments::DeploymentCreateDBRequest,
    },
    errors::Error,
    types::TenantId,
};

/// Header carrying the deployment wizard session token on the deploy action.
pub const DEPLOYMENT_SESSION_HEADER: &str = "x-deployment-session";

/// List deployments for a tenant
#[utoipa::path(
    get,
    path = "/tenants/{tenant_id}/deployments",
    tag = "deployments",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Deployments in the tenant", body = Vec<DeploymentResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_deployments(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<DeploymentResponse>>, Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "view:deployments").await?;

    let mut repo = Deployments::new(&mut conn);
    let deployments = repo.list(&DeploymentFilter::new(0, i64::MAX).with_tenant(tenant_id)).await?;

    Ok(Json(deployments.into_iter().map(DeploymentResponse::from).collect()))
}

/// Launch a deployment (the wizard's terminal action)
///
/// Authorization is the session token plus the tenant gate plus the
/// permission resolver - the wizard session is checked only after all of
/// those, as an advisory staleness guard: a missing or stale wizard session
/// yields 409 and never changes who *may* deploy. On success the wizard
/// session is cleared, so a re-opened wizard starts fresh.
#[utoipa::path(
    post,
    path = "/tenants/{tenant_id}/deployments",
    request_body = DeploymentCreate,
    tag = "deployments",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 201, description = "Deployment created", body = DeploymentResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Deployment wizard session stale or missing"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_deployment(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Json(request): Json<DeploymentCreate>,
) -> Result<(StatusCode, Json<DeploymentResponse>), Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "create:deployment").await?;

    // Advisory wizard-session check, strictly after authorization
    let wizard_token = headers
        .get(DEPLOYMENT_SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::StaleDeploymentSession)?;
    if !state.deployment_sessions.validate(current_user.id, tenant_id, wizard_token) {
        return Err(Error::StaleDeploymentSession);
    }

    let mut repo = Deployments::new(&mut conn);
    let deployment = repo
        .create(&DeploymentCreateDBRequest {
            tenant_id,
            name: request.name,
            template_id: request.template_id,
            cloud_account_id: request.cloud_account_id,
            environment_id: request.environment_id,
            created_by: current_user.id,
        })
        .await?;

    // Successful deploy consumes the wizard session
    state.deployment_sessions.clear(current_user.id);

    Ok((StatusCode::CREATED, Json(DeploymentResponse::from(deployment))))
}
