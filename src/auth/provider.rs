use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

use super::session::Session;

/// Failure to reach a verdict about the session, as opposed to a verdict of "no session"
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Session provider misconfigured: {0}")]
    Misconfigured(String),

    #[error("Session provider unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for ProviderError {
    fn from(err: sqlx::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Authentication backend that turns request headers into a session.
///
/// `Ok(None)` means the request carries no valid session (missing, expired or
/// forged token). `Err` is reserved for the provider being unable to answer.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
