//! Database repository for users.

use crate::types::{UserId, abbrev_uuid};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Look up a user by email. Emails are unique case-insensitively, so the
    /// comparison folds case on both sides.
    #[instrument(skip(self), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Always generate a new ID for users
        let user_id = Uuid::new_v4();

        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (id, email, display_name, role, tenant_id, auth_source, external_user_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(request.role)
        .bind(request.tenant_id)
        .bind(&request.auth_source)
        .bind(&request.external_user_id)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await
            .map_err(DbError::from)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                role = COALESCE($3, role),
                tenant_id = COALESCE($4, tenant_id),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(request.role)
        .bind(request.tenant_id)
        .bind(&request.password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use sqlx::PgPool;

    fn create_request(email: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            email: email.to_string(),
            display_name: Some("Test User".to_string()),
            role,
            tenant_id: Some(Uuid::nil()),
            auth_source: "native".to_string(),
            external_user_id: None,
            password_hash: None,
        }
    }

    #[sqlx::test]
    async fn test_create_and_get_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&create_request("alice@example.com", Role::User)).await.unwrap();
        assert_eq!(created.email, "alice@example.com");
        assert_eq!(created.role, Role::User);
        assert_eq!(created.tenant_id, Some(Uuid::nil()));

        let fetched = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, created.email);
    }

    #[sqlx::test]
    async fn test_email_lookup_is_case_insensitive(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        users.create(&create_request("Bob@Example.COM", Role::User)).await.unwrap();

        let fetched = users.get_user_by_email("bob@example.com").await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().email, "Bob@Example.COM");
    }

    #[sqlx::test]
    async fn test_duplicate_email_rejected_case_insensitively(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        users.create(&create_request("carol@example.com", Role::User)).await.unwrap();
        let err = users.create(&create_request("CAROL@example.com", Role::User)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_update_role_and_password(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&create_request("dave@example.com", Role::User)).await.unwrap();

        let updated = users
            .update(
                created.id,
                &UserUpdateDBRequest {
                    role: Some(Role::Msp),
                    password_hash: Some("argon2-hash".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Msp);
        assert_eq!(updated.password_hash.as_deref(), Some("argon2-hash"));
        // Untouched fields survive the partial update
        assert_eq!(updated.display_name, created.display_name);
    }

    #[sqlx::test]
    async fn test_update_missing_user_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let err = users.update(Uuid::new_v4(), &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    async fn test_list_and_delete(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let a = users.create(&create_request("erin@example.com", Role::User)).await.unwrap();
        users.create(&create_request("frank@example.com", Role::User)).await.unwrap();

        let listed = users.list(&UserFilter::new(0, 100)).await.unwrap();
        assert_eq!(listed.len(), 2);

        assert!(users.delete(a.id).await.unwrap());
        assert!(!users.delete(a.id).await.unwrap());

        let listed = users.list(&UserFilter::new(0, 100)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
