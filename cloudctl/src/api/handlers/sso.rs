use axum::{Json, extract::State};

use crate::{
    AppState,
    api::handlers::auth::create_session_cookie,
    api::models::{
        sso::{SsoCallbackRequest, SsoCallbackResponse, SsoExchangeResponse, SsoLoginRequest, SsoLoginResponse},
        users::{CurrentUser, Role, UserResponse},
    },
    auth::session,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    errors::Error,
    types::DEFAULT_TENANT_ID,
};

/// Initiate an SSO sign-in
///
/// Issues a fresh anti-CSRF state, records it server-side, and returns the
/// provider authorization URL the browser should navigate to. The state is
/// always generated here - caller-supplied state values are never accepted.
#[utoipa::path(
    post,
    path = "/sso/login",
    request_body = SsoLoginRequest,
    tag = "sso",
    responses(
        (status = 200, description = "Authorization URL and state", body = SsoLoginResponse),
        (status = 400, description = "SSO disabled or unknown provider"),
    )
)]
#[tracing::instrument(skip_all, fields(provider_type = %request.provider_type))]
pub async fn sso_login(State(state): State<AppState>, Json(request): Json<SsoLoginRequest>) -> Result<Json<SsoLoginResponse>, Error> {
    if !state.config.auth.sso.enabled {
        return Err(Error::BadRequest {
            message: "SSO is disabled".to_string(),
        });
    }

    let provider = state.sso_providers.get(&request.provider_type).ok_or_else(|| Error::BadRequest {
        message: format!("Unknown SSO provider '{}'", request.provider_type),
    })?;

    let redirect_uri = request
        .redirect_uri
        .unwrap_or_else(|| format!("{}/sso/callback", state.config.dashboard_url.trim_end_matches('/')));

    let state_value = state.sso_states.issue(&request.provider_type, &redirect_uri);
    let authorization_url = provider.authorization_url(&state_value, &redirect_uri, request.domain.as_deref())?;

    Ok(Json(SsoLoginResponse {
        authorization_url: authorization_url.to_string(),
        state: state_value,
    }))
}

/// Complete an SSO sign-in (callback exchange)
///
/// Validation order matters, and everything must pass before the identity
/// provider is contacted:
///
/// 1. a provider-reported `error` aborts immediately, surfacing its
///    description (and still consumes the state so the URL cannot be
///    replayed);
/// 2. `code` and `state` must both be present;
/// 3. the state must match an outstanding sign-in attempt for the same
///    provider - single-use, server-held, TTL-bound. A mismatch is treated
///    as a possible CSRF attempt and fails closed;
/// 4. only then is the code exchanged and a session token issued.
#[utoipa::path(
    post,
    path = "/sso/callback",
    request_body = SsoCallbackRequest,
    tag = "sso",
    responses(
        (status = 200, description = "Exchange successful", body = SsoExchangeResponse),
        (status = 400, description = "Missing code or state"),
        (status = 403, description = "State mismatch (possible CSRF)"),
        (status = 502, description = "Identity provider failure"),
    )
)]
#[tracing::instrument(skip_all, fields(provider_type = %request.provider_type))]
pub async fn sso_callback(State(state): State<AppState>, Json(request): Json<SsoCallbackRequest>) -> Result<SsoCallbackResponse, Error> {
    if !state.config.auth.sso.enabled {
        return Err(Error::BadRequest {
            message: "SSO is disabled".to_string(),
        });
    }

    // Provider-side failure: abort before any exchange, but burn the state
    if let Some(error) = &request.error {
        if let Some(state_value) = &request.state {
            state.sso_states.take(state_value);
        }
        return Err(Error::SsoProvider {
            description: request.error_description.clone().unwrap_or_else(|| error.clone()),
        });
    }

    let (code, state_value) = match (&request.code, &request.state) {
        (Some(code), Some(state_value)) => (code, state_value),
        _ => {
            return Err(Error::BadRequest {
                message: "SSO callback requires both code and state".to_string(),
            });
        }
    };

    // Single-use comparison against the server-held record. Unknown,
    // expired, and already-consumed states are indistinguishable.
    let pending = state.sso_states.take(state_value).ok_or(Error::SsoStateMismatch)?;
    if pending.provider_type != request.provider_type {
        return Err(Error::SsoStateMismatch);
    }

    let provider = state.sso_providers.get(&request.provider_type).ok_or_else(|| Error::BadRequest {
        message: format!("Unknown SSO provider '{}'", request.provider_type),
    })?;

    let identity = provider.exchange_code(code, &pending.redirect_uri).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    let (db_user, is_new_user) = match user_repo.get_user_by_email(&identity.email).await? {
        Some(user) => (user, false),
        None => {
            if !provider.allow_first_login() {
                return Err(Error::Forbidden);
            }
            let created = user_repo
                .create(&UserCreateDBRequest {
                    email: identity.email.clone(),
                    display_name: identity.display_name.clone(),
                    role: Role::User,
                    tenant_id: Some(DEFAULT_TENANT_ID),
                    auth_source: request.provider_type.clone(),
                    external_user_id: Some(identity.subject.clone()),
                    password_hash: None,
                })
                .await?;
            (created, true)
        }
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let user_response = UserResponse::from(db_user);
    let current_user = CurrentUser {
        id: user_response.id,
        email: user_response.email.clone(),
        display_name: user_response.display_name.clone(),
        role: user_response.role,
        tenant_id: user_response.tenant_id,
    };

    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(SsoCallbackResponse {
        exchange: SsoExchangeResponse {
            user: user_response,
            token,
            token_type: "Bearer".to_string(),
            is_new_user,
        },
        cookie,
    })
}
