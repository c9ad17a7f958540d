use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::gate::{Destination, Gate, RequestContext};
use crate::server::AppState;

/// Middleware for routes that need a signed-in user.
///
/// Injects the [`Session`](crate::auth::Session) into request extensions, or
/// answers with a redirect to the sign-in page.
pub async fn require_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = request_context(&request)?;

    match context.require_session().await? {
        Gate::Continue(session) => {
            request.extensions_mut().insert(session);
            Ok(next.run(request).await)
        }
        Gate::Redirect(destination) => Ok(redirect(destination, &state.config.auth)),
    }
}

/// Middleware for organization-scoped routes.
///
/// Runs the session gate before the organization gate, then injects both the
/// [`Session`](crate::auth::Session) and the active
/// [`OrganizationId`](crate::auth::OrganizationId).
pub async fn require_organization_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = request_context(&request)?;

    let organization_id = match context.require_active_organization_id().await?.into_result() {
        Ok(organization_id) => organization_id,
        Err(destination) => return Ok(redirect(destination, &state.config.auth)),
    };

    // Memoized by the organization gate above
    if let Gate::Continue(session) = context.require_session().await? {
        request.extensions_mut().insert(session);
    }
    request.extensions_mut().insert(organization_id);

    Ok(next.run(request).await)
}

fn request_context(request: &Request) -> Result<Arc<RequestContext>, ApiError> {
    request.extensions().get::<Arc<RequestContext>>().cloned().ok_or_else(|| {
        tracing::error!("Request context missing; session_context_middleware is not installed");
        ApiError::internal_server_error("Request context unavailable")
    })
}

/// `303 See Other` to the destination's configured path
pub fn redirect(destination: Destination, auth: &AuthConfig) -> Response {
    let path = destination.path(auth);
    tracing::debug!("Redirecting request to {} ({})", path, destination.denial());
    Redirect::to(path).into_response()
}
