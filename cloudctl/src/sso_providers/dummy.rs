//! In-process identity provider for testing.
//!
//! Accepts any authorization code and derives a synthetic identity from it:
//! a code containing `@` is treated as the email verbatim, anything else
//! gets `@sso.test` appended. Never talks to the network.

use async_trait::async_trait;
use url::Url;

use super::{FederatedIdentity, Result, SsoError, SsoProvider};
use crate::config::DummySsoConfig;

pub struct DummyProvider {
    config: DummySsoConfig,
}

impl DummyProvider {
    pub fn new(config: DummySsoConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SsoProvider for DummyProvider {
    fn authorization_url(&self, state: &str, redirect_uri: &str, _domain: Option<&str>) -> Result<Url> {
        let mut url = Url::parse("https://sso.invalid/authorize").expect("static URL parses");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<FederatedIdentity> {
        if code.is_empty() {
            return Err(SsoError::ProviderApi("empty authorization code".to_string()));
        }

        let email = if code.contains('@') {
            code.to_string()
        } else {
            format!("{code}@sso.test")
        };

        Ok(FederatedIdentity {
            subject: format!("dummy|{code}"),
            email,
            display_name: None,
        })
    }

    fn allow_first_login(&self) -> bool {
        self.config.allow_first_login
    }
}
