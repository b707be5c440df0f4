use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        templates::{TemplateCreate, TemplateResponse},
        users::CurrentUser,
    },
    auth::{permissions::require_permission, tenants::require_tenant_access},
    db::{handlers::Templates, models::templates::TemplateCreateDBRequest},
    errors::Error,
    types::TenantId,
};

/// List catalog templates for a tenant
#[utoipa::path(
    get,
    path = "/tenants/{tenant_id}/templates",
    tag = "templates",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Templates in the tenant catalog", body = Vec<TemplateResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_templates(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<TemplateResponse>>, Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "view:catalog").await?;

    let mut repo = Templates::new(&mut conn);
    let templates = repo.list_for_tenant(tenant_id).await?;

    Ok(Json(templates.into_iter().map(TemplateResponse::from).collect()))
}

/// Add a template to a tenant's catalog
#[utoipa::path(
    post,
    path = "/tenants/{tenant_id}/templates",
    request_body = TemplateCreate,
    tag = "templates",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_template(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    current_user: CurrentUser,
    Json(request): Json<TemplateCreate>,
) -> Result<(StatusCode, Json<TemplateResponse>), Error> {
    require_tenant_access(&current_user, tenant_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    require_permission(&mut conn, &current_user, "manage:catalog").await?;

    let mut repo = Templates::new(&mut conn);
    let template = repo
        .create(&TemplateCreateDBRequest {
            tenant_id,
            name: request.name,
            description: request.description,
            created_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_state, create_test_user, session_token_for};
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    async fn test_catalog_visible_to_user_but_not_writable(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        let response = server
            .get(&format!("/tenants/{}/templates", Uuid::nil()))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        let response = server
            .post(&format!("/tenants/{}/templates", Uuid::nil()))
            .authorization_bearer(&token)
            .json(&TemplateCreate {
                name: "three-tier".to_string(),
                description: None,
            })
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_admin_manages_catalog_across_tenants(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let state = create_test_state(pool.clone()).await;
        let other = crate::test_utils::create_test_tenant(&pool, "other").await;
        let admin = create_test_user(&pool, Role::Admin, Uuid::nil()).await;
        let token = session_token_for(&admin, &state.config);

        let response = server
            .post(&format!("/tenants/{}/templates", other.id))
            .authorization_bearer(&token)
            .json(&TemplateCreate {
                name: "kafka-cluster".to_string(),
                description: Some("Managed Kafka".to_string()),
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: TemplateResponse = response.json();
        assert_eq!(body.tenant_id, other.id);
    }
}
