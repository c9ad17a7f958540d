use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{clear_session_cookie, OrganizationId, Session, SessionUser};
use crate::error::ApiError;
use crate::handlers::with_session_cookie;
use crate::middleware::ApiResponse;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub organization_id: Option<String>,
}

/// A freshly minted session and the token that carries it
#[derive(Debug, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

/// GET /auth/sign-in - where the session gate sends unauthenticated callers
pub async fn sign_in_page(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": "sign-in",
            "message": "Sign in to continue",
            "dev_sign_in": state.config.auth.enable_dev_sign_in && state.issuer.is_some(),
        }
    }))
}

/// POST /auth/sign-in - mint a session without credentials (development only)
///
/// Real sign-in belongs to the external auth server; this exists so the gates
/// can be driven locally with the jwt provider.
///
/// Expected Input:
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "organizationId": "org_123" }
/// ```
pub async fn sign_in(State(state): State<AppState>, Json(payload): Json<SignInRequest>) -> Result<Response, ApiError> {
    if !state.config.auth.enable_dev_sign_in {
        return Err(ApiError::not_found("Development sign-in is disabled"));
    }

    let issuer = state
        .issuer
        .as_ref()
        .ok_or_else(|| ApiError::conflict("Development sign-in requires the jwt session provider"))?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::field_error("name", "must not be empty"));
    }

    let user = SessionUser {
        id: payload
            .user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: name.to_string(),
        email: payload.email,
    };
    let organization = payload
        .organization_id
        .filter(|id| !id.trim().is_empty())
        .map(OrganizationId::from);

    let (token, session) = issuer.issue(&user, organization)?;
    tracing::info!("Issued development session {} for user {}", session.session.id, user.id);

    let expires_at = session.session.expires_at;
    let body = ApiResponse::created(IssuedSession {
        token: token.clone(),
        session,
    });
    Ok(with_session_cookie(&state, &token, expires_at, body))
}

/// POST /auth/sign-out - expire the session cookie
pub async fn sign_out(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(&state.config.auth.session_cookie, state.config.security.secure_cookies);
    let body = ApiResponse::success(json!({ "signed_out": true }));

    ([(header::SET_COOKIE, cookie)], body).into_response()
}
