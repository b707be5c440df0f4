//! Database repository for deployments.

use crate::types::{DeploymentId, TenantId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::deployments::{DeploymentCreateDBRequest, DeploymentDBResponse, DeploymentUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing deployments
#[derive(Debug, Clone)]
pub struct DeploymentFilter {
    pub tenant_id: Option<TenantId>,
    pub skip: i64,
    pub limit: i64,
}

impl DeploymentFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            tenant_id: None,
            skip,
            limit,
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }
}

pub struct Deployments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Deployments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Deployments<'c> {
    type CreateRequest = DeploymentCreateDBRequest;
    type UpdateRequest = DeploymentUpdateDBRequest;
    type Response = DeploymentDBResponse;
    type Id = DeploymentId;
    type Filter = DeploymentFilter;

    #[instrument(skip(self, request), fields(name = %request.name, tenant_id = %abbrev_uuid(&request.tenant_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let deployment = sqlx::query_as::<_, DeploymentDBResponse>(
            r#"
            INSERT INTO deployments (tenant_id, name, template_id, cloud_account_id, environment_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.tenant_id)
        .bind(&request.name)
        .bind(request.template_id)
        .bind(request.cloud_account_id)
        .bind(request.environment_id)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(deployment)
    }

    #[instrument(skip(self), fields(deployment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let deployment = sqlx::query_as::<_, DeploymentDBResponse>("SELECT * FROM deployments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(deployment)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let deployments = sqlx::query_as::<_, DeploymentDBResponse>(
            r#"
            SELECT * FROM deployments
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.tenant_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(deployments)
    }

    #[instrument(skip(self), fields(deployment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deployments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await
            .map_err(DbError::from)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(deployment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let deployment = sqlx::query_as::<_, DeploymentDBResponse>(
            r#"
            UPDATE deployments SET
                status = COALESCE($2, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::Users;
    use crate::db::models::deployments::DeploymentStatus;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn create_user(pool: &PgPool) -> Uuid {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                email: format!("{}@example.com", Uuid::new_v4()),
                display_name: None,
                role: Role::User,
                tenant_id: Some(Uuid::nil()),
                auth_source: "native".to_string(),
                external_user_id: None,
                password_hash: None,
            })
            .await
            .unwrap()
            .id
    }

    fn create_request(tenant_id: Uuid, name: &str, created_by: Uuid) -> DeploymentCreateDBRequest {
        DeploymentCreateDBRequest {
            tenant_id,
            name: name.to_string(),
            template_id: None,
            cloud_account_id: None,
            environment_id: None,
            created_by,
        }
    }

    #[sqlx::test]
    async fn test_create_starts_pending(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut deployments = Deployments::new(&mut conn);

        let created = deployments.create(&create_request(Uuid::nil(), "web-tier", user_id)).await.unwrap();
        assert_eq!(created.status, DeploymentStatus::Pending);
        assert_eq!(created.tenant_id, Uuid::nil());
    }

    #[sqlx::test]
    async fn test_list_is_scoped_to_tenant(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let other_tenant = {
            let mut tenants = crate::db::handlers::Tenants::new(&mut conn);
            tenants
                .create(&crate::db::models::tenants::TenantCreateDBRequest {
                    name: "Other".to_string(),
                    description: None,
                })
                .await
                .unwrap()
        };

        let mut deployments = Deployments::new(&mut conn);
        deployments.create(&create_request(Uuid::nil(), "default-app", user_id)).await.unwrap();
        deployments.create(&create_request(other_tenant.id, "other-app", user_id)).await.unwrap();

        let scoped = deployments
            .list(&DeploymentFilter::new(0, 100).with_tenant(other_tenant.id))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "other-app");
    }

    #[sqlx::test]
    async fn test_update_status(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut deployments = Deployments::new(&mut conn);

        let created = deployments.create(&create_request(Uuid::nil(), "job", user_id)).await.unwrap();
        let updated = deployments
            .update(
                created.id,
                &DeploymentUpdateDBRequest {
                    status: Some(DeploymentStatus::Running),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, DeploymentStatus::Running);

        assert!(deployments.delete(created.id).await.unwrap());
    }
}
