#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use taskboard_api::auth::{
    generate_jwt, Claims, JwtSessionProvider, OrganizationId, ProviderError, Session, SessionProvider, SessionUser,
};
use taskboard_api::config::AppConfig;
use taskboard_api::server::{app, AppState};

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.api.enable_request_logging = false;
    config
}

pub fn jwt_app() -> Router {
    app(AppState::with_jwt(test_config()))
}

pub fn user(id: &str) -> SessionUser {
    SessionUser {
        id: id.to_string(),
        name: format!("User {}", id),
        email: Some(format!("{}@example.com", id)),
    }
}

/// Token for `user_id`, signed with the test secret
pub fn token_for(user_id: &str, org: Option<&str>) -> String {
    let config = test_config();
    let issuer = JwtSessionProvider::from_config(&config.auth);
    let (token, _) = issuer
        .issue(&user(user_id), org.map(OrganizationId::from))
        .expect("issue token");
    token
}

/// Correctly signed token that expired an hour ago
pub fn expired_token_for(user_id: &str, org: Option<&str>) -> String {
    let config = test_config();
    let mut claims = Claims::new(&user(user_id), org.map(OrganizationId::from), 1).expect("build claims");
    claims.iat -= 3 * 3600;
    claims.exp = claims.iat + 3600;
    generate_jwt(&claims, &config.auth.jwt_secret).expect("sign token")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    /// `name=value` from the Set-Cookie header, ready to send back
    pub fn cookie(&self) -> Option<String> {
        let set_cookie = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        set_cookie.split(';').next().map(|pair| pair.trim().to_string())
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Result<TestResponse> {
    let response = app.oneshot(request).await.context("router failed")?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Ok(TestResponse { status, headers, body })
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

/// Wraps another provider and counts lookups
pub struct CountingProvider<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingProvider<P> {
    pub fn new(inner: P) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: SessionProvider> SessionProvider for CountingProvider<P> {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_session(headers).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Provider whose backing store is down
pub struct UnavailableProvider;

#[async_trait]
impl SessionProvider for UnavailableProvider {
    async fn get_session(&self, _headers: &HeaderMap) -> Result<Option<Session>, ProviderError> {
        Err(ProviderError::Unavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
