use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{DatabaseSessionProvider, JwtSessionProvider, SessionProvider};
use crate::config::{AppConfig, ProviderKind, SecurityConfig, DEFAULT_SIGN_IN_PATH};
use crate::database::{DatabaseError, DatabaseManager};
use crate::handlers::{protected, public};
use crate::middleware::{require_organization_middleware, require_session_middleware, session_context_middleware};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn SessionProvider>,
    /// Token issuer, present when sessions are self-contained JWTs
    pub issuer: Option<Arc<JwtSessionProvider>>,
    /// Auth database pool, present when sessions live in the database
    pub pool: Option<PgPool>,
}

impl AppState {
    /// State around an arbitrary provider
    pub fn new(config: AppConfig, provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            issuer: None,
            pool: None,
        }
    }

    /// State using the jwt provider, which can also issue tokens
    pub fn with_jwt(config: AppConfig) -> Self {
        let issuer = Arc::new(JwtSessionProvider::from_config(&config.auth));
        Self {
            config: Arc::new(config),
            provider: issuer.clone(),
            issuer: Some(issuer),
            pool: None,
        }
    }

    /// State using the database provider
    pub fn with_database(config: AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        let provider = Arc::new(DatabaseSessionProvider::new(pool.clone(), config.auth.session_cookie.clone()));
        Ok(Self {
            config: Arc::new(config),
            provider,
            issuer: None,
            pool: Some(pool),
        })
    }

    pub fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        match config.auth.provider {
            ProviderKind::Jwt => Ok(Self::with_jwt(config)),
            ProviderKind::Database => Self::with_database(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes(&state))
        // Session gate
        .merge(session_routes(&state))
        // Session + organization gate
        .merge(organization_routes(&state))
        // Every request gets its own context before any gate runs
        .layer(from_fn_with_state(state.clone(), session_context_middleware))
        .layer(cors_layer(&state.config.security));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Routes mounted whatever the configuration says
const FIXED_ROUTES: &[&str] = &[
    "/",
    "/health",
    "/auth/sign-out",
    "/api/auth/session",
    "/api/auth/organization/active",
    "/api/organization",
];

/// Local route for a configured redirect target.
///
/// Targets may point at an external UI (`https://...`); those and targets that
/// would shadow another route get no local landing page. Redirects still use
/// the configured value unchanged.
fn landing_route<'a>(target: &'a str, taken: &[&str]) -> Option<&'a str> {
    let is_local_path = target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains(&['?', '#', ':', '*', '{', '}'][..]);
    if !is_local_path {
        tracing::debug!("Redirect target '{}' is external; no local landing route", target);
        return None;
    }
    if FIXED_ROUTES.contains(&target) || taken.contains(&target) {
        tracing::warn!("Redirect target '{}' collides with another route; no local landing route", target);
        return None;
    }
    Some(target)
}

/// Where the sign-in page and development sign-in are served locally
fn sign_in_route(state: &AppState) -> &str {
    landing_route(&state.config.auth.sign_in_path, &[]).unwrap_or(DEFAULT_SIGN_IN_PATH)
}

fn auth_public_routes(state: &AppState) -> Router<AppState> {
    use public::auth;

    Router::new()
        .route(sign_in_route(state), get(auth::sign_in_page).post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
}

fn session_routes(state: &AppState) -> Router<AppState> {
    use protected::auth;

    let router = Router::new()
        .route("/api/auth/session", get(auth::session_get))
        .route("/api/auth/organization/active", post(auth::organization_active_set));

    let router = match landing_route(&state.config.auth.onboarding_path, &[sign_in_route(state)]) {
        Some(path) => router.route(path, get(auth::onboarding_page)),
        None => router,
    };

    router.route_layer(from_fn_with_state(state.clone(), require_session_middleware))
}

fn organization_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/organization", get(protected::organization_get))
        .route_layer(from_fn_with_state(state.clone(), require_organization_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // Credentialed CORS cannot use a wildcard origin
            Ok(_) if origin == "*" => {
                tracing::warn!("Ignoring wildcard CORS origin; list origins explicitly");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Bind and serve until ctrl-c
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let port = config.api.port;
    let state = AppState::from_config(config)?;
    tracing::info!("Resolving sessions with the {} provider", state.provider.name());

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Taskboard API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_get_landing_routes() {
        assert_eq!(landing_route("/login", &[]), Some("/login"));
        assert_eq!(landing_route("/auth/sign-in", &[]), Some("/auth/sign-in"));
    }

    #[test]
    fn external_targets_get_no_landing_route() {
        for target in [
            "https://app.example.com/auth/sign-in",
            "//app.example.com/auth/sign-in",
            "auth/sign-in",
            "",
            "/auth/sign-in?next=/board",
            "/org/:id",
        ] {
            assert_eq!(landing_route(target, &[]), None, "{}", target);
        }
    }

    #[test]
    fn colliding_targets_get_no_landing_route() {
        assert_eq!(landing_route("/api/organization", &[]), None);
        assert_eq!(landing_route("/health", &[]), None);
        assert_eq!(landing_route("/auth/sign-in", &["/auth/sign-in"]), None);
    }
}
