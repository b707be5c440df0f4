//! Identity provider abstraction layer
//!
//! This module defines the `SsoProvider` trait which abstracts the OAuth2
//! authorization-code exchange across identity providers. The provider side
//! of the flow - the authorization endpoint the browser is sent to, and the
//! token/userinfo endpoints the server exchanges against - is intentionally
//! opaque to the rest of the system.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use url::Url;

use crate::config::{SsoConfig, SsoProviderConfig};
use crate::errors::Error;

pub mod dummy;
pub mod oidc;

/// Create a provider from configuration
///
/// This is the single point where config becomes provider instances.
/// Adding a new provider kind requires adding a match arm here.
pub fn create_provider(config: &SsoProviderConfig) -> Arc<dyn SsoProvider> {
    match config {
        SsoProviderConfig::Oidc(oidc_config) => Arc::new(oidc::OidcProvider::new(oidc_config.clone())),
        SsoProviderConfig::Dummy(dummy_config) => Arc::new(dummy::DummyProvider::new(dummy_config.clone())),
    }
}

/// Build the provider registry for all configured provider types.
pub fn build_providers(config: &SsoConfig) -> HashMap<String, Arc<dyn SsoProvider>> {
    config
        .providers
        .iter()
        .map(|(provider_type, provider_config)| (provider_type.clone(), create_provider(provider_config)))
        .collect()
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, SsoError>;

/// Errors that can occur while talking to an identity provider
#[derive(Debug, thiserror::Error)]
pub enum SsoError {
    /// The provider rejected or failed the request. Carries a short
    /// human-readable description only - raw provider payloads are logged,
    /// never surfaced.
    #[error("identity provider error: {0}")]
    ProviderApi(String),

    /// The provider answered with something we could not interpret
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<SsoError> for Error {
    fn from(err: SsoError) -> Self {
        Error::SsoProvider {
            description: err.to_string(),
        }
    }
}

/// A federated identity returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Stable subject identifier at the provider
    pub subject: String,
    /// Email asserted by the provider
    pub email: String,
    /// Display name, if the provider supplies one
    pub display_name: Option<String>,
}

/// Abstract identity provider interface
#[async_trait]
pub trait SsoProvider: Send + Sync {
    /// Build the authorization URL the browser is redirected to.
    ///
    /// `state` is the server-issued anti-CSRF value; `domain` is an optional
    /// hint forwarded to providers that support narrowing the login surface
    /// to one organization.
    fn authorization_url(&self, state: &str, redirect_uri: &str, domain: Option<&str>) -> Result<Url>;

    /// Exchange an authorization code for a federated identity.
    ///
    /// Called only after the state comparison has already passed.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<FederatedIdentity>;

    /// Whether unknown federated identities may be provisioned on first login
    fn allow_first_login(&self) -> bool;
}
