// handlers/public/mod.rs - Public handlers (no session required)
//
// Service info, health and the sign-in entry points. These are the only
// routes an unauthenticated caller can reach without being redirected.
pub mod auth;

pub use auth::*;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::server::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let auth = &state.config.auth;

    Json(json!({
        "success": true,
        "data": {
            "name": "Taskboard API",
            "version": version,
            "session_provider": state.provider.name(),
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "sign_in": format!("{} (public)", auth.sign_in_path),
                "sign_out": "/auth/sign-out (public)",
                "onboarding": format!("{} (session required)", auth.onboarding_path),
                "session": "/api/auth/session (session required)",
                "active_organization": "/api/auth/organization/active (session required)",
                "organization": "/api/organization (active organization required)",
            }
        }
    }))
}

/// GET /health - liveness, plus a database ping when sessions live in the database
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
