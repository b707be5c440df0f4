//! Authentication and authorization system.
//!
//! This module is the security core of the control plane:
//!
//! - Session tokens: signed, time-boxed `{userId, email, role}` assertions,
//!   verified statelessly on every request
//! - Password hashing and verification using Argon2
//! - Permission resolution: role grants unioned with per-user overrides,
//!   with a bypass shortcut for platform-wide roles
//! - Tenant access gating for every tenant-scoped read and write
//! - Server-side, single-use SSO state tracking for the OAuth2
//!   authorization-code exchange
//! - Ephemeral deployment-wizard sessions
//!
//! # Authentication
//!
//! Browser and API clients present the session token either as an
//! `Authorization: Bearer` header or in the session cookie set at login.
//! The [`current_user`] extractor verifies the token and re-reads the user
//! row so role and tenant changes take effect mid-session.
//!
//! # Authorization
//!
//! Two independent checks gate every tenant-scoped operation:
//!
//! - [`tenants::require_tenant_access`]: may this caller act on this tenant
//!   at all?
//! - [`permissions::require_permission`]: does this caller hold the named
//!   capability?
//!
//! Both fail closed with a uniform `Forbidden` that carries no information
//! about whether the target exists.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use cloudctl::api::models::users::CurrentUser;
//!
//! async fn protected_handler(
//!     current_user: CurrentUser,
//!     State(state): State<AppState>,
//! ) -> Result<String, Error> {
//!     Ok(format!("Hello, {}!", current_user.email))
//! }
//! ```

pub mod current_user;
pub mod deploy_sessions;
pub mod password;
pub mod permissions;
pub mod session;
pub mod sso;
pub mod tenants;
