use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gate::RequestContext;
use crate::server::AppState;

/// Attach a fresh [`RequestContext`] to every request.
///
/// The context lives in the request's extensions and is dropped with the
/// request, taking any memoized session with it.
pub async fn session_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = Arc::new(RequestContext::new(request.headers().clone(), state.provider.clone()));
    request.extensions_mut().insert(context.clone());

    let response = next.run(request).await;
    tracing::debug!(
        session_resolved = context.is_resolved(),
        status = %response.status(),
        "Request finished"
    );
    response
}
