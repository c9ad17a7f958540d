use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    extract_session_token, OrganizationId, ProviderError, Session, SessionProvider, SessionRecord, SessionUser,
};
use crate::config::DEFAULT_SESSION_COOKIE;

/// Build a session for `user` with an optional active organization
pub fn session_for(user: &str, org: Option<&str>) -> Session {
    Session {
        session: SessionRecord {
            id: format!("sess_{}", user),
            user_id: user.to_string(),
            expires_at: Utc::now() + ChronoDuration::hours(1),
            active_organization_id: org.map(OrganizationId::from),
        },
        user: SessionUser {
            id: user.to_string(),
            name: user.to_string(),
            email: Some(format!("{}@example.com", user)),
        },
    }
}

/// Headers carrying `token` as a bearer credential
pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header value"),
    );
    headers
}

/// In-memory provider mapping tokens to sessions and counting lookups
#[derive(Default)]
pub struct StubProvider {
    sessions: HashMap<String, Session>,
    delay: Option<Duration>,
    fail_next: AtomicBool,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as a session for a user named after the token
    pub fn with_session(mut self, token: &str, org: Option<&str>) -> Self {
        self.sessions.insert(token.to_string(), session_for(token, org));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_once(self) -> Self {
        self.fail_next.store(true, Ordering::SeqCst);
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for StubProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("stub outage".to_string()));
        }

        Ok(extract_session_token(headers, DEFAULT_SESSION_COOKIE).and_then(|token| self.sessions.get(&token).cloned()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
