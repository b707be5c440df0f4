//! Database repository for cloud accounts.

use crate::types::{TenantId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::cloud_accounts::{CloudAccountCreateDBRequest, CloudAccountDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct CloudAccounts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> CloudAccounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name, tenant_id = %abbrev_uuid(&request.tenant_id)), err)]
    pub async fn create(&mut self, request: &CloudAccountCreateDBRequest) -> Result<CloudAccountDBResponse> {
        let account = sqlx::query_as::<_, CloudAccountDBResponse>(
            r#"
            INSERT INTO cloud_accounts (tenant_id, name, provider, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.tenant_id)
        .bind(&request.name)
        .bind(&request.provider)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(account)
    }

    #[instrument(skip(self), fields(tenant_id = %abbrev_uuid(&tenant_id)), err)]
    pub async fn list_for_tenant(&mut self, tenant_id: TenantId) -> Result<Vec<CloudAccountDBResponse>> {
        let accounts = sqlx::query_as::<_, CloudAccountDBResponse>(
            "SELECT * FROM cloud_accounts WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(accounts)
    }
}
