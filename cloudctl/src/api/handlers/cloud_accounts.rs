use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        cloud_accounts::{CloudAccountCreate, CloudAccountResponse},
        users::CurrentUser,
    },
    auth::{permissions::require_permission, tenants::require_tenant_access},
    db::{handlers::CloudAccounts, models::cloud_accounts::CloudAccountCreateDBRequest},
    errors::Error,
    types::TenantId,
};

/// List cloud accounts connected to a tenant
#[utoipa::path(
    get,
    path = "/tenants/{tenant_id}/cloud-accounts",
    tag = "cloud-accounts",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Cloud accounts in the tenant", body = Vec<CloudAccountResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_cloud_accounts(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<CloudAccountResponse>>, Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "view:cloud-accounts").await?;

    let mut repo = CloudAccounts::new(&mut conn);
    let accounts = repo.list_for_tenant(tenant_id).await?;

    Ok(Json(accounts.into_iter().map(CloudAccountResponse::from).collect()))
}

/// Connect a cloud account to a tenant
#[utoipa::path(
    post,
    path = "/tenants/{tenant_id}/cloud-accounts",
    request_body = CloudAccountCreate,
    tag = "cloud-accounts",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 201, description = "Cloud account connected", body = CloudAccountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_cloud_account(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
    Json(request): Json<CloudAccountCreate>,
) -> Result<(StatusCode, Json<CloudAccountResponse>), Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "manage:cloud-accounts").await?;

    let mut repo = CloudAccounts::new(&mut conn);
    let account = repo
        .create(&CloudAccountCreateDBRequest {
            tenant_id,
            name: request.name,
            provider: request.provider,
            created_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CloudAccountResponse::from(account))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_state, create_test_user, session_token_for};
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    async fn test_standard_user_can_view_but_not_manage(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        // view:cloud-accounts comes with the user role
        let response = server
            .get(&format!("/tenants/{}/cloud-accounts", Uuid::nil()))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        // manage:cloud-accounts does not
        let response = server
            .post(&format!("/tenants/{}/cloud-accounts", Uuid::nil()))
            .authorization_bearer(&token)
            .json(&CloudAccountCreate {
                name: "prod-aws".to_string(),
                provider: "aws".to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_override_grant_unlocks_manage(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        {
            let mut conn = pool.acquire().await.unwrap();
            let mut permissions = crate::db::handlers::Permissions::new(&mut conn);
            permissions.grant_to_user(user.id, "manage:cloud-accounts").await.unwrap();
        }

        let response = server
            .post(&format!("/tenants/{}/cloud-accounts", Uuid::nil()))
            .authorization_bearer(&token)
            .json(&CloudAccountCreate {
                name: "prod-aws".to_string(),
                provider: "aws".to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: CloudAccountResponse = response.json();
        assert_eq!(body.provider, "aws");
        assert_eq!(body.created_by, user.id);
    }

    #[sqlx::test]
    async fn test_admin_bypasses_grants(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin, Uuid::nil()).await;
        let token = session_token_for(&admin, &state.config);

        let response = server
            .post(&format!("/tenants/{}/cloud-accounts", Uuid::nil()))
            .authorization_bearer(&token)
            .json(&CloudAccountCreate {
                name: "admin-azure".to_string(),
                provider: "azure".to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
    }
}
