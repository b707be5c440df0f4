//! Database repository for catalog templates.

use crate::types::{TenantId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::templates::{TemplateCreateDBRequest, TemplateDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Templates<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Templates<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name, tenant_id = %abbrev_uuid(&request.tenant_id)), err)]
    pub async fn create(&mut self, request: &TemplateCreateDBRequest) -> Result<TemplateDBResponse> {
        let template = sqlx::query_as::<_, TemplateDBResponse>(
            r#"
            INSERT INTO templates (tenant_id, name, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.tenant_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(template)
    }

    #[instrument(skip(self), fields(tenant_id = %abbrev_uuid(&tenant_id)), err)]
    pub async fn list_for_tenant(&mut self, tenant_id: TenantId) -> Result<Vec<TemplateDBResponse>> {
        let templates = sqlx::query_as::<_, TemplateDBResponse>("SELECT * FROM templates WHERE tenant_id = $1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(templates)
    }
}
