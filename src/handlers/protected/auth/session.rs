use axum::{
    extract::{Extension, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{OrganizationId, Session};
use crate::error::ApiError;
use crate::handlers::public::auth::session::IssuedSession;
use crate::handlers::with_session_cookie;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveOrganizationRequest {
    pub organization_id: String,
}

/// GET /api/auth/session - the caller's session
pub async fn session_get(Extension(session): Extension<Session>) -> ApiResult<Session> {
    Ok(ApiResponse::success(session))
}

/// GET /onboarding - where the organization gate sends callers without an active organization
pub async fn onboarding_page(Extension(session): Extension<Session>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": "onboarding",
            "message": "Select or create an organization to continue",
            "user": session.user,
            "active_organization_id": session.active_organization_id(),
            "set_active_organization": "/api/auth/organization/active",
        }
    }))
}

/// POST /api/auth/organization/active - select the active organization
///
/// Re-issues the caller's session token with the organization set. The
/// current request keeps the session it was resolved with; the new token takes
/// effect from the next request.
///
/// Expected Input:
/// ```json
/// { "organizationId": "org_123" }
/// ```
pub async fn organization_active_set(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<SetActiveOrganizationRequest>,
) -> Result<Response, ApiError> {
    let organization_id = payload.organization_id.trim();
    if organization_id.is_empty() {
        return Err(ApiError::field_error("organizationId", "must not be empty"));
    }

    let issuer = state
        .issuer
        .as_ref()
        .ok_or_else(|| ApiError::conflict("Active organization is managed by the auth server"))?;

    let (token, updated) = issuer.switch_organization(&session, OrganizationId::from(organization_id))?;
    tracing::info!(
        "User {} switched session {} to organization {}",
        updated.user.id,
        updated.session.id,
        organization_id
    );

    let expires_at = updated.session.expires_at;
    let body = ApiResponse::success(IssuedSession {
        token: token.clone(),
        session: updated,
    });
    Ok(with_session_cookie(&state, &token, expires_at, body))
}
