use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::deployment_sessions::{DeploymentSessionOpen, DeploymentSessionRefreshResponse, DeploymentSessionResponse},
    api::models::users::CurrentUser,
    auth::tenants::require_tenant_access,
    errors::Error,
};

/// Open a deployment wizard session
///
/// Called when the wizard mounts, bound to the tenant the wizard was opened
/// against. Re-invocation overwrites any previous session for the caller.
#[utoipa::path(
    post,
    path = "/deployment-sessions",
    request_body = DeploymentSessionOpen,
    tag = "deployment-sessions",
    responses(
        (status = 200, description = "Wizard session opened", body = DeploymentSessionResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn open_deployment_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<DeploymentSessionOpen>,
) -> Result<Json<DeploymentSessionResponse>, Error> {
    require_tenant_access(&current_user, request.tenant_id)?;

    let session = state.deployment_sessions.generate(current_user.id, request.tenant_id);

    Ok(Json(DeploymentSessionResponse {
        token: session.token,
        tenant_id: session.tenant_id,
        expires_at: session.expires_at,
    }))
}

/// Revalidate the caller's wizard session ahead of the deploy action
///
/// Returns `valid: false` when no session exists; otherwise the (possibly
/// refreshed or regenerated) token the deploy action must present.
#[utoipa::path(
    post,
    path = "/deployment-sessions/current/refresh",
    tag = "deployment-sessions",
    responses(
        (status = 200, description = "Revalidation result", body = DeploymentSessionRefreshResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_deployment_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Json<DeploymentSessionRefreshResponse> {
    match state.deployment_sessions.ensure_valid(current_user.id) {
        Some(session) => Json(DeploymentSessionRefreshResponse {
            valid: true,
            token: Some(session.token),
            expires_at: Some(session.expires_at),
        }),
        None => Json(DeploymentSessionRefreshResponse {
            valid: false,
            token: None,
            expires_at: None,
        }),
    }
}

/// Close the caller's wizard session
///
/// Called on wizard unmount (cancel, navigate-away). A re-opened wizard
/// always starts from a fresh token.
#[utoipa::path(
    delete,
    path = "/deployment-sessions/current",
    tag = "deployment-sessions",
    responses(
        (status = 204, description = "Wizard session cleared"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn close_deployment_session(State(state): State<AppState>, current_user: CurrentUser) -> StatusCode {
    state.deployment_sessions.clear(current_user.id);
    StatusCode::NO_CONTENT
}
