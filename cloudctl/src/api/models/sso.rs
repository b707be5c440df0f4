//! API request/response models for SSO login.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::UserResponse;

/// Initiate request: which provider to sign in with.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SsoLoginRequest {
    /// Provider type as configured (e.g. "okta", "azuread")
    pub provider_type: String,
    /// Optional organization domain hint forwarded to the provider
    pub domain: Option<String>,
    /// Where the provider should send the browser back to. Defaults to the
    /// dashboard's SSO callback route.
    pub redirect_uri: Option<String>,
}

/// Initiate response: where to send the browser, and the anti-CSRF state
/// the client must hold for the redirect round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SsoLoginResponse {
    pub authorization_url: String,
    pub state: String,
}

/// Callback request: what the provider sent back through the browser.
///
/// `code`/`state` are present on success; `error`/`error_description` on
/// provider-side failure. Everything is optional at the wire level so
/// validation order is controlled by the handler rather than by
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SsoCallbackRequest {
    pub provider_type: String,
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Successful exchange payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SsoExchangeResponse {
    pub user: UserResponse,
    pub token: String,
    pub token_type: String,
    pub is_new_user: bool,
}

/// Callback response carrying the session cookie alongside the JSON body.
#[derive(Debug)]
pub struct SsoCallbackResponse {
    pub exchange: SsoExchangeResponse,
    pub cookie: String,
}

impl IntoResponse for SsoCallbackResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self.exchange)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        response
    }
}
