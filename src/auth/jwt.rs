use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::provider::{ProviderError, SessionProvider};
use super::session::{OrganizationId, Session, SessionRecord, SessionUser};
use super::token::extract_session_token;
use crate::config::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub sid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &SessionUser, org: Option<OrganizationId>, ttl_hours: u64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = expiry(now, ttl_hours)?;

        Ok(Self {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            sid: Uuid::new_v4().to_string(),
            org: org.map(OrganizationId::into_inner),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Same session with a different active organization and a fresh expiry
    pub fn with_organization(&self, org: OrganizationId, ttl_hours: u64) -> Result<Self, TokenError> {
        let now = Utc::now();
        Ok(Self {
            org: Some(org.into_inner()),
            exp: expiry(now, ttl_hours)?.timestamp(),
            iat: now.timestamp(),
            ..self.clone()
        })
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// `now + ttl_hours`, or an error when the lifetime does not fit a timestamp
fn expiry(now: DateTime<Utc>, ttl_hours: u64) -> Result<DateTime<Utc>, TokenError> {
    i64::try_from(ttl_hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| TokenError::Generation(format!("session lifetime of {} hours is out of range", ttl_hours)))
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Session {
            session: SessionRecord {
                id: claims.sid,
                user_id: claims.sub.clone(),
                expires_at,
                active_organization_id: claims.org.map(OrganizationId::from),
            },
            user: SessionUser {
                id: claims.sub,
                name: claims.name,
                email: claims.email,
            },
        }
    }
}

impl From<&Session> for Claims {
    fn from(session: &Session) -> Self {
        let now = Utc::now();
        Self {
            sub: session.user.id.clone(),
            name: session.user.name.clone(),
            email: session.user.email.clone(),
            sid: session.session.id.clone(),
            org: session.session.active_organization_id.clone().map(OrganizationId::into_inner),
            exp: session.session.expires_at.timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Decode and validate signature and expiry
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Session provider backed by self-contained HS256 session tokens
#[derive(Clone)]
pub struct JwtSessionProvider {
    secret: String,
    cookie_name: String,
    ttl_hours: u64,
}

impl JwtSessionProvider {
    pub fn new(secret: impl Into<String>, cookie_name: impl Into<String>, ttl_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: cookie_name.into(),
            ttl_hours,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(auth.jwt_secret.clone(), auth.session_cookie.clone(), auth.session_ttl_hours)
    }

    /// Start a new session for `user`
    pub fn issue(&self, user: &SessionUser, org: Option<OrganizationId>) -> Result<(String, Session), TokenError> {
        let claims = Claims::new(user, org, self.ttl_hours)?;
        self.sign(claims)
    }

    /// Re-issue an existing session with `org` selected
    pub fn switch_organization(&self, session: &Session, org: OrganizationId) -> Result<(String, Session), TokenError> {
        let claims = Claims::from(session).with_organization(org, self.ttl_hours)?;
        self.sign(claims)
    }

    fn sign(&self, claims: Claims) -> Result<(String, Session), TokenError> {
        let token = generate_jwt(&claims, &self.secret)?;
        Ok((token, Session::from(claims)))
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, ProviderError> {
        if self.secret.is_empty() {
            return Err(ProviderError::Misconfigured("JWT secret not configured".to_string()));
        }

        let Some(token) = extract_session_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        match decode_jwt(&token, &self.secret) {
            Ok(claims) => Ok(Some(Session::from(claims))),
            Err(e) => {
                tracing::debug!("Rejecting session token: {}", e);
                Ok(None)
            }
        }
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}
