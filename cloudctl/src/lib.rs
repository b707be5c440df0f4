//! # cloudctl: control plane for a multi-tenant cloud management dashboard
//!
//! `cloudctl` is the backend for a multi-tenant cloud-management dashboard:
//! template catalogs, deployment wizards, and the resource views that sit in
//! front of them. The heart of the crate - and the part where correctness
//! actually matters - is session and authorization handling: signed session
//! tokens, role-plus-override permission resolution, tenant access gating,
//! an OAuth2 authorization-code SSO exchange with server-side anti-CSRF
//! state, and the ephemeral session that scopes one run of the deployment
//! wizard.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! ### Request Flow
//!
//! Every authenticated request carries a bearer session token (or the
//! session cookie set at login). The [`auth::current_user`] extractor
//! verifies the token statelessly against the process-wide signing key and
//! then re-reads the user row, so role and tenant changes take effect
//! mid-session while the token itself remains valid until its embedded
//! expiry. The resolved caller then passes through two independent checks
//! before any tenant-scoped storage is touched: the tenant access gate
//! ([`auth::tenants`]) and the permission resolver ([`auth::permissions`]).
//! Both fail closed with a uniform `Forbidden` so error responses cannot be
//! used to enumerate tenants.
//!
//! A separate SSO flow ([`api::handlers::sso`]) produces fresh session
//! tokens for federated logins: initiate issues a single-use, TTL-bound
//! anti-CSRF state held server-side ([`auth::sso`]), and the callback
//! consumes it - success or failure - before any identity-provider call is
//! made. Identity providers themselves sit behind the [`sso_providers`]
//! trait.
//!
//! Orthogonal to all of that, the deployment wizard is scoped by an
//! ephemeral deployment session ([`auth::deploy_sessions`]): generated when
//! the wizard opens, revalidated immediately before the deploy action
//! fires, and cleared on unmount or success. It is an advisory staleness
//! guard, never an authorization input.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use cloudctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = cloudctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     cloudctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod sso_providers;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use bon::Builder;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::models::users::Role,
    auth::{deploy_sessions::DeploymentSessions, password, sso::SsoStates},
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
    sso_providers::SsoProvider,
};

pub use config::Config;
pub use types::{CloudAccountId, DEFAULT_TENANT_ID, DeploymentId, EnvironmentId, PermissionId, TemplateId, TenantId, UserId};

/// Application state shared across all request handlers.
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from file/environment
/// - `sso_states`: server-held, single-use anti-CSRF states for SSO
/// - `deployment_sessions`: open deployment-wizard sessions
/// - `sso_providers`: configured identity providers, keyed by provider type
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub sso_states: Arc<SsoStates>,
    pub deployment_sessions: Arc<DeploymentSessions>,
    pub sso_providers: Arc<HashMap<String, Arc<dyn SsoProvider>>>,
}

impl AppState {
    /// Build the state and its in-process stores from configuration.
    pub fn from_config(db: PgPool, config: Config) -> Self {
        let sso_states = Arc::new(SsoStates::new(config.auth.sso.state_ttl));
        let deployment_sessions = Arc::new(DeploymentSessions::new(&config.deployment_sessions));
        let sso_providers = Arc::new(sso_providers::build_providers(&config.auth.sso));

        AppState::builder()
            .db(db)
            .config(config)
            .sso_states(sso_states)
            .deployment_sessions(deployment_sessions)
            .sso_providers(sso_providers)
            .build()
    }
}

/// Get the cloudctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin on first startup, or updates the password
/// of the existing account when one is supplied. Ensures there is always an
/// admin able to log in.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, admin_password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match admin_password {
        Some(password) => Some(password::hash_string(password).map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &UserUpdateDBRequest {
                        password_hash,
                        ..Default::default()
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created = user_repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: None,
            role: Role::Admin,
            tenant_id: Some(DEFAULT_TENANT_ID),
            auth_source: "system".to_string(),
            external_user_id: None,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/verify", get(api::handlers::auth::verify))
        .route("/auth/tenants", get(api::handlers::auth::list_visible_tenants))
        .route("/auth/permission/{name}", get(api::handlers::auth::check_permission))
        .route("/sso/login", post(api::handlers::sso::sso_login))
        .route("/sso/callback", post(api::handlers::sso::sso_callback));

    let deployment_session_routes = Router::new()
        .route("/deployment-sessions", post(api::handlers::deployment_sessions::open_deployment_session))
        .route(
            "/deployment-sessions/current/refresh",
            post(api::handlers::deployment_sessions::refresh_deployment_session),
        )
        .route(
            "/deployment-sessions/current",
            delete(api::handlers::deployment_sessions::close_deployment_session),
        );

    // Every route in this group invokes the tenant access gate before
    // touching tenant-scoped storage.
    let tenant_routes = Router::new()
        .route(
            "/tenants/{tenant_id}/deployments",
            get(api::handlers::deployments::list_deployments).post(api::handlers::deployments::create_deployment),
        )
        .route(
            "/tenants/{tenant_id}/cloud-accounts",
            get(api::handlers::cloud_accounts::list_cloud_accounts).post(api::handlers::cloud_accounts::create_cloud_account),
        )
        .route(
            "/tenants/{tenant_id}/templates",
            get(api::handlers::templates::list_templates).post(api::handlers::templates::create_template),
        )
        .route(
            "/tenants/{tenant_id}/environments",
            get(api::handlers::environments::list_environments).post(api::handlers::environments::create_environment),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(deployment_session_routes)
        .merge(tenant_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for background tasks and their lifecycle management.
///
/// The in-process stores (SSO states, deployment sessions) are TTL-bound
/// and periodically swept by small cleanup tasks. Dropping the guard
/// cancels the shutdown token, which stops the sweepers.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    fn start(state: &AppState) -> Self {
        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let drop_guard = shutdown_token.clone().drop_guard();

        let background_tasks = vec![
            state.sso_states.spawn_cleanup_task(shutdown_token.clone()),
            state.deployment_sessions.spawn_cleanup_task(shutdown_token.clone()),
        ];

        Self {
            background_tasks,
            shutdown_token,
            drop_guard: Some(drop_guard),
        }
    }

    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();
        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the initial admin, and starts the cleanup tasks
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application over an existing pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let pool = match pool {
            Some(pool) => pool,
            None => {
                let settings = &config.database.pool;
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .min_connections(settings.min_connections)
                    .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
                    .connect(&config.database.url)
                    .await?
            }
        };

        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let state = AppState::from_config(pool.clone(), config.clone());
        let bg_services = BackgroundServices::start(&state);
        let router = build_router(&state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("cloudctl listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        self.bg_services.shutdown().await;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_create_initial_admin_user_is_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("root@example.com", Some("hunter2"), &pool).await.unwrap();
        let second = create_initial_admin_user("root@example.com", Some("rotated"), &pool).await.unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let admin = users.get_user_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.auth_source, "system");
        // Password was rotated on the second call
        assert!(password::verify_string("rotated", admin.password_hash.as_ref().unwrap()).unwrap());
    }

    #[sqlx::test]
    async fn test_healthz(pool: PgPool) {
        let server = crate::test_utils::create_test_app(pool).await;
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }
}
