//! Database repository for environments.

use crate::types::{TenantId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::environments::{EnvironmentCreateDBRequest, EnvironmentDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Environments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Environments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name, tenant_id = %abbrev_uuid(&request.tenant_id)), err)]
    pub async fn create(&mut self, request: &EnvironmentCreateDBRequest) -> Result<EnvironmentDBResponse> {
        let environment = sqlx::query_as::<_, EnvironmentDBResponse>(
            r#"
            INSERT INTO environments (tenant_id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.tenant_id)
        .bind(&request.name)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(environment)
    }

    #[instrument(skip(self), fields(tenant_id = %abbrev_uuid(&tenant_id)), err)]
    pub async fn list_for_tenant(&mut self, tenant_id: TenantId) -> Result<Vec<EnvironmentDBResponse>> {
        let environments = sqlx::query_as::<_, EnvironmentDBResponse>("SELECT * FROM environments WHERE tenant_id = $1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(environments)
    }
}
