//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    auth::{password, session},
    config::{Config, DummySsoConfig, SsoProviderConfig},
    db::{
        handlers::{Repository, Tenants, Users},
        models::{
            tenants::{TenantCreateDBRequest, TenantDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    types::TenantId,
};

/// Config for tests: native auth with a fixed signing key, SSO enabled with
/// the in-process dummy provider.
pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        ..Default::default()
    };
    config.auth.sso.enabled = true;
    config
        .auth
        .sso
        .providers
        .insert("dummy".to_string(), SsoProviderConfig::Dummy(DummySsoConfig { allow_first_login: true }));
    config
}

/// Build an AppState over an existing pool with the test config.
pub async fn create_test_state(pool: PgPool) -> AppState {
    AppState::from_config(pool, create_test_config())
}

/// Build a TestServer over the full router with the test config.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Build a TestServer over the full router with a custom config.
pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> TestServer {
    let state = AppState::from_config(pool, config);
    let router = crate::build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Create a user with a random email, no password.
pub async fn create_test_user(pool: &PgPool, role: Role, tenant_id: TenantId) -> UserDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    let mut users = Users::new(&mut conn);
    users
        .create(&UserCreateDBRequest {
            email: format!("user-{}@test.com", Uuid::new_v4()),
            display_name: Some("Test User".to_string()),
            role,
            tenant_id: Some(tenant_id),
            auth_source: "native".to_string(),
            external_user_id: None,
            password_hash: None,
        })
        .await
        .expect("Failed to create test user")
}

/// Create a user with a random email and the given password.
pub async fn create_test_user_with_password(pool: &PgPool, role: Role, tenant_id: TenantId, plaintext: &str) -> UserDBResponse {
    let password_hash = password::hash_string(plaintext).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.unwrap();
    let mut users = Users::new(&mut conn);
    users
        .create(&UserCreateDBRequest {
            email: format!("user-{}@test.com", Uuid::new_v4()),
            display_name: Some("Test User".to_string()),
            role,
            tenant_id: Some(tenant_id),
            auth_source: "native".to_string(),
            external_user_id: None,
            password_hash: Some(password_hash),
        })
        .await
        .expect("Failed to create test user")
}

/// Create a tenant with the given name.
pub async fn create_test_tenant(pool: &PgPool, name: &str) -> TenantDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    let mut tenants = Tenants::new(&mut conn);
    tenants
        .create(&TenantCreateDBRequest {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("Failed to create test tenant")
}

/// Issue a session token for a user with the given config's signing key.
pub fn session_token_for(user: &UserDBResponse, config: &Config) -> String {
    let current_user = CurrentUser::from(user.clone());
    session::create_session_token(&current_user, config).expect("Failed to create session token")
}
