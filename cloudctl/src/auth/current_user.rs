//! Extractor for the authenticated caller.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Pull the bearer session token out of the request, preferring the
/// Authorization header and falling back to the session cookie.
fn extract_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name == cookie_name
        {
            return Some(value.to_string());
        }
    }

    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Authenticate a request from its session token.
    ///
    /// The token asserts identity; role and home tenant are re-read from the
    /// credential store on every request, so a role change or tenant move
    /// takes effect immediately even though the token itself cannot be
    /// revoked before its expiry. A verified token whose account no longer
    /// exists fails exactly like a bad token.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = match extract_token(parts, &state.config.auth.native.session.cookie_name) {
            Some(token) => token,
            None => {
                trace!("No session token found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let claims_user = session::verify_session_token(&token, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut users = Users::new(&mut conn);

        match users.get_by_id(claims_user.id).await? {
            Some(db_user) => Ok(CurrentUser::from(db_user)),
            None => Err(Error::InvalidToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_state, create_test_user, session_token_for};
    use axum::extract::FromRequestParts as _;
    use sqlx::PgPool;

    fn parts_with_header(name: &str, value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(name, value)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    async fn test_bearer_token_authenticates(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, uuid::Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        let mut parts = parts_with_header("authorization", &format!("Bearer {token}"));
        let current = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(current.id, user.id);
        assert_eq!(current.email, user.email);
        // Refreshed from the store, not the token
        assert_eq!(current.tenant_id, Some(uuid::Uuid::nil()));
    }

    #[sqlx::test]
    async fn test_cookie_authenticates(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, uuid::Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        let cookie_name = &state.config.auth.native.session.cookie_name;
        let mut parts = parts_with_header("cookie", &format!("other=1; {cookie_name}={token}"));
        let current = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current.id, user.id);
    }

    #[sqlx::test]
    async fn test_missing_token_is_unauthenticated(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_garbage_token_is_invalid(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;

        let mut parts = parts_with_header("authorization", "Bearer not-a-real-token");
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[sqlx::test]
    async fn test_token_for_deleted_user_fails_like_bad_token(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, uuid::Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            users.delete(user.id).await.unwrap();
        }

        let mut parts = parts_with_header("authorization", &format!("Bearer {token}"));
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[sqlx::test]
    async fn test_role_change_applies_mid_session(pool: PgPool) {
        let state = create_test_state(pool.clone()).await;
        let user = create_test_user(&pool, Role::User, uuid::Uuid::nil()).await;
        let token = session_token_for(&user, &state.config);

        {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            users
                .update(
                    user.id,
                    &crate::db::models::users::UserUpdateDBRequest {
                        role: Some(Role::Msp),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        // Token still asserts Role::User, but the store wins
        let mut parts = parts_with_header("authorization", &format!("Bearer {token}"));
        let current = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current.role, Role::Msp);
    }
}
