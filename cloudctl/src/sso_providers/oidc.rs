//! Generic OAuth2/OIDC authorization-code provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{FederatedIdentity, Result, SsoError, SsoProvider};
use crate::config::OidcProviderConfig;

/// Response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
    #[allow(dead_code)]
    expires_in: Option<i64>,
}

/// Response from the provider's userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

pub struct OidcProvider {
    http: reqwest::Client,
    config: OidcProviderConfig,
}

impl OidcProvider {
    pub fn new(config: OidcProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SsoProvider for OidcProvider {
    fn authorization_url(&self, state: &str, redirect_uri: &str, domain: Option<&str>) -> Result<Url> {
        let mut url = self.config.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("state", state);
            if let Some(domain) = domain {
                query.append_pair("domain_hint", domain);
            }
        }
        Ok(url)
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<FederatedIdentity> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| SsoError::ProviderApi(format!("token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            // Bodies can carry sensitive detail; log them, surface the status only
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body, "Token exchange rejected by provider");
            return Err(SsoError::ProviderApi(format!("token endpoint returned HTTP {status}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SsoError::InvalidResponse(format!("token response: {e}")))?;

        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| SsoError::ProviderApi(format!("userinfo endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SsoError::ProviderApi(format!("userinfo endpoint returned HTTP {status}")));
        }

        let userinfo: UserinfoResponse = response
            .json()
            .await
            .map_err(|e| SsoError::InvalidResponse(format!("userinfo response: {e}")))?;

        let email = userinfo
            .email
            .ok_or_else(|| SsoError::InvalidResponse("userinfo response carried no email claim".to_string()))?;

        Ok(FederatedIdentity {
            subject: userinfo.sub,
            email,
            display_name: userinfo.name,
        })
    }

    fn allow_first_login(&self) -> bool {
        self.config.allow_first_login
    }
}
