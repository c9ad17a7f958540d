// handlers/mod.rs - Handler tiers
//
// Public (no session) → Protected (session gate, or session + organization gate)
//
// Gating happens in middleware layered per route group in `server.rs`;
// protected handlers read `Session` / `OrganizationId` from request extensions.
pub mod protected;
pub mod public;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::auth::session_cookie;
use crate::server::AppState;

/// Attach a `Set-Cookie` header carrying `token` to a response.
///
/// The cookie expires together with the session it carries.
pub(crate) fn with_session_cookie(
    state: &AppState,
    token: &str,
    expires_at: DateTime<Utc>,
    body: impl IntoResponse,
) -> Response {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(
        &state.config.auth.session_cookie,
        token,
        max_age,
        state.config.security.secure_cookies,
    );

    ([(header::SET_COOKIE, cookie)], body).into_response()
}
