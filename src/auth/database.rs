use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::provider::{ProviderError, SessionProvider};
use super::session::{OrganizationId, Session, SessionRecord, SessionUser};
use super::token::extract_session_token;

/// Session row joined with its user, as stored by the auth server
#[derive(Debug, Clone, FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    expires_at: DateTime<Utc>,
    active_organization_id: Option<String>,
    name: String,
    email: Option<String>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            session: SessionRecord {
                id: row.id,
                user_id: row.user_id.clone(),
                expires_at: row.expires_at,
                active_organization_id: row.active_organization_id.map(OrganizationId::from),
            },
            user: SessionUser {
                id: row.user_id,
                name: row.name,
                email: row.email,
            },
        }
    }
}

const SESSION_QUERY: &str = r#"
    SELECT
        s.id,
        s."userId" AS user_id,
        s."expiresAt" AS expires_at,
        s."activeOrganizationId" AS active_organization_id,
        u.name,
        u.email
    FROM session s
    JOIN "user" u ON u.id = s."userId"
    WHERE s.token = $1
    AND s."expiresAt" > now()
"#;

/// Session provider that looks opaque tokens up in the auth server's tables
#[derive(Clone)]
pub struct DatabaseSessionProvider {
    pool: PgPool,
    cookie_name: String,
}

impl DatabaseSessionProvider {
    pub fn new(pool: PgPool, cookie_name: impl Into<String>) -> Self {
        Self {
            pool,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for DatabaseSessionProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, ProviderError> {
        let Some(token) = extract_session_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        // Signed cookies carry "<token>.<signature>"; the table stores the bare token
        let token = token.split('.').next().unwrap_or_default();

        let row = sqlx::query_as::<_, SessionRow>(SESSION_QUERY)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database error resolving session: {}", e);
                ProviderError::from(e)
            })?;

        if row.is_none() {
            tracing::debug!("No live session row for presented token");
        }

        Ok(row.map(Session::from))
    }

    fn name(&self) -> &'static str {
        "database"
    }
}
