//! OpenAPI documentation assembly.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::verify,
        crate::api::handlers::auth::list_visible_tenants,
        crate::api::handlers::auth::check_permission,
        crate::api::handlers::sso::sso_login,
        crate::api::handlers::sso::sso_callback,
        crate::api::handlers::deployment_sessions::open_deployment_session,
        crate::api::handlers::deployment_sessions::refresh_deployment_session,
        crate::api::handlers::deployment_sessions::close_deployment_session,
        crate::api::handlers::deployments::list_deployments,
        crate::api::handlers::deployments::create_deployment,
        crate::api::handlers::cloud_accounts::list_cloud_accounts,
        crate::api::handlers::cloud_accounts::create_cloud_account,
        crate::api::handlers::templates::list_templates,
        crate::api::handlers::templates::create_template,
        crate::api::handlers::environments::list_environments,
        crate::api::handlers::environments::create_environment,
    ),
    components(schemas(
        models::users::Role,
        models::users::UserResponse,
        models::users::CurrentUser,
        models::auth::LoginRequest,
        models::auth::AuthResponse,
        models::auth::PermissionCheckResponse,
        models::sso::SsoLoginRequest,
        models::sso::SsoLoginResponse,
        models::sso::SsoCallbackRequest,
        models::sso::SsoExchangeResponse,
        models::tenants::TenantResponse,
        models::deployments::DeploymentCreate,
        models::deployments::DeploymentResponse,
        models::cloud_accounts::CloudAccountCreate,
        models::cloud_accounts::CloudAccountResponse,
        models::templates::TemplateCreate,
        models::templates::TemplateResponse,
        models::environments::EnvironmentCreate,
        models::environments::EnvironmentResponse,
        models::deployment_sessions::DeploymentSessionOpen,
        models::deployment_sessions::DeploymentSessionResponse,
        models::deployment_sessions::DeploymentSessionRefreshResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Login, verification, tenants and permissions"),
        (name = "sso", description = "OAuth2 authorization-code sign-in"),
        (name = "deployment-sessions", description = "Deployment wizard sessions"),
        (name = "deployments", description = "Tenant-scoped deployments"),
        (name = "cloud-accounts", description = "Tenant-scoped cloud accounts"),
        (name = "templates", description = "Tenant-scoped catalog templates"),
        (name = "environments", description = "Tenant-scoped environments"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
