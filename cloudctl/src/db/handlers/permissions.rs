//! Database repository for permission grants.
//!
//! Two grant sources exist: role grants (`role_permissions`) and per-user
//! override grants (`user_permissions`). Effective permissions are the union
//! of both, computed fresh on every call - nothing here is cached, so a
//! revocation takes effect on the caller's next request.

use std::collections::HashSet;

use crate::api::models::users::Role;
use crate::types::{UserId, abbrev_uuid};
use crate::db::errors::{DbError, Result};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Permissions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Permissions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The effective permission set for a user: role grants unioned with the
    /// user's own override grants. Duplicates collapse in SQL.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn effective_for(&mut self, user_id: UserId, role: Role) -> Result<HashSet<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id AND rp.role = $2
            UNION
            SELECT p.name FROM permissions p
            JOIN user_permissions up ON up.permission_id = p.id AND up.user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(names.into_iter().collect())
    }

    /// Permissions granted to a role.
    #[instrument(skip(self), err)]
    pub async fn role_grants(&mut self, role: Role) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role = $1
            ORDER BY p.name
            "#,
        )
        .bind(role)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(names)
    }

    /// Override permissions granted directly to a user.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn user_grants(&mut self, user_id: UserId) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name FROM permissions p
            JOIN user_permissions up ON up.permission_id = p.id
            WHERE up.user_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(names)
    }

    /// Grant a named permission directly to a user. Granting an already-held
    /// permission is a no-op.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn grant_to_user(&mut self, user_id: UserId, permission: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id)
            SELECT $1, id FROM permissions WHERE name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(permission)
        .execute(&mut *self.db)
        .await
        .map_err(DbError::from)?;

        // Zero rows means either the permission name does not exist or the
        // grant was already present; distinguish by probing the catalog.
        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM permissions WHERE name = $1)")
                .bind(permission)
                .fetch_one(&mut *self.db)
                .await?;
            if !exists {
                return Err(DbError::NotFound);
            }
        }

        Ok(())
    }

    /// Revoke a direct user grant. Returns whether a grant was removed.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn revoke_from_user(&mut self, user_id: UserId, permission: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_permissions up
            USING permissions p
            WHERE up.permission_id = p.id AND up.user_id = $1 AND p.name = $2
            "#,
        )
        .bind(user_id)
        .bind(permission)
        .execute(&mut *self.db)
        .await
        .map_err(DbError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
