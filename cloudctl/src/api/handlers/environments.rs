use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        environments::{EnvironmentCreate, EnvironmentResponse},
        users::CurrentUser,
    },
    auth::{permissions::require_permission, tenants::require_tenant_access},
    db::{handlers::Environments, models::environments::EnvironmentCreateDBRequest},
    errors::Error,
    types::TenantId,
};

/// List environments for a tenant
#[utoipa::path(
    get,
    path = "/tenants/{tenant_id}/environments",
    tag = "environments",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Environments in the tenant", body = Vec<EnvironmentResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_environments(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<EnvironmentResponse>>, Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "view:environments").await?;

    let mut repo = Environments::new(&mut conn);
    let environments = repo.list_for_tenant(tenant_id).await?;

    Ok(Json(environments.into_iter().map(EnvironmentResponse::from).collect()))
}

/// Create an environment in a tenant
#[utoipa::path(
    post,
    path = "/tenants/{tenant_id}/environments",
    request_body = EnvironmentCreate,
    tag = "environments",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 201, description = "Environment created", body = EnvironmentResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_environment(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
    Json(request): Json<EnvironmentCreate>,
) -> Result<(StatusCode, Json<EnvironmentResponse>), Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "manage:environments").await?;

    let mut repo = Environments::new(&mut conn);
    let environment = repo
        .create(&EnvironmentCreateDBRequest {
            tenant_id,
            name: request.name,
            created_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(EnvironmentResponse::from(environment))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_state, create_test_user, session_token_for};
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    async fn test_environments_follow_gate_and_grants(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let t2 = crate::test_utils::create_test_tenant(&pool, "t2").await;
        let user = create_test_user(&pool, Role::User, Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        // Home tenant, view permission granted via role
        let response = server
            .get(&format!("/tenants/{}/environments", Uuid::nil()))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        // Foreign tenant blocked by the gate before any grant check
        let response = server
            .get(&format!("/tenants/{}/environments", t2.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);

        // manage:environments is not part of the user role
        let response = server
            .post(&format!("/tenants/{}/environments", Uuid::nil()))
            .authorization_bearer(&token)
            .json(&EnvironmentCreate {
                name: "staging".to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_msp_creates_environments_anywhere(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let t2 = crate::test_utils::create_test_tenant(&pool, "t2").await;
        let msp = create_test_user(&pool, Role::Msp, Uuid::nil()).await;
        let token = session_token_for(&msp, &state.config);

        let response = server
            .post(&format!("/tenants/{}/environments", t2.id))
            .authorization_bearer(&token)
            .json(&EnvironmentCreate {
                name: "production".to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
    }
}
