//! Database repository for tenants.

use crate::types::{TenantId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::tenants::{TenantCreateDBRequest, TenantDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Tenants<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Tenants<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &TenantCreateDBRequest) -> Result<TenantDBResponse> {
        let tenant = sqlx::query_as::<_, TenantDBResponse>(
            r#"
            INSERT INTO tenants (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(tenant)
    }

    #[instrument(skip(self), fields(tenant_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: TenantId) -> Result<Option<TenantDBResponse>> {
        let tenant = sqlx::query_as::<_, TenantDBResponse>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tenant)
    }

    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<TenantDBResponse>> {
        let tenants = sqlx::query_as::<_, TenantDBResponse>("SELECT * FROM tenants ORDER BY created_at")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tenants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    async fn test_default_tenant_is_seeded(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut tenants = Tenants::new(&mut conn);

        let default = tenants.get_by_id(Uuid::nil()).await.unwrap();
        assert!(default.is_some());
        assert_eq!(default.unwrap().name, "Default");
    }

    #[sqlx::test]
    async fn test_create_and_list(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut tenants = Tenants::new(&mut conn);

        let created = tenants
            .create(&TenantCreateDBRequest {
                name: "Acme Corp".to_string(),
                description: Some("Primary customer".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Acme Corp");

        let all = tenants.list_all().await.unwrap();
        // Seeded default plus the one we created
        assert_eq!(all.len(), 2);
    }
}
