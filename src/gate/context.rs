use axum::http::HeaderMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use super::{Denial, Gate};
use crate::auth::{OrganizationId, ProviderError, Session, SessionProvider};

/// Per-request cache for the gating pipeline.
///
/// One context is built for each incoming request and dropped with it, so a
/// memoized session can never be observed by another request. Each stage is
/// computed at most once; a provider error or a cancelled lookup leaves the
/// cell empty and the next call asks the provider again.
pub struct RequestContext {
    headers: HeaderMap,
    provider: Arc<dyn SessionProvider>,
    session: OnceCell<Option<Session>>,
    session_gate: OnceCell<Gate<Session>>,
    organization_gate: OnceCell<Gate<OrganizationId>>,
}

impl RequestContext {
    pub fn new(headers: HeaderMap, provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            headers,
            provider,
            session: OnceCell::new(),
            session_gate: OnceCell::new(),
            organization_gate: OnceCell::new(),
        }
    }

    /// Resolve the request's session, querying the provider on first use only
    pub async fn session(&self) -> Result<Option<Session>, ProviderError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let resolved = self.provider.get_session(&self.headers).await.map_err(|e| {
                    error!("Session provider '{}' failed: {}", self.provider.name(), e);
                    e
                })?;
                debug!(
                    provider = self.provider.name(),
                    present = resolved.is_some(),
                    "Resolved request session"
                );
                Ok::<_, ProviderError>(resolved)
            })
            .await?;

        Ok(session.clone())
    }

    /// Session gate: redirect to sign-in unless the request has a session
    pub async fn require_session(&self) -> Result<Gate<Session>, ProviderError> {
        let gate = self
            .session_gate
            .get_or_try_init(|| async {
                let gate = match self.session().await? {
                    Some(session) => Gate::Continue(session),
                    None => {
                        debug!("Session gate denied request: {}", Denial::NoSession);
                        Gate::Redirect(Denial::NoSession.destination())
                    }
                };
                Ok::<_, ProviderError>(gate)
            })
            .await?;

        Ok(gate.clone())
    }

    /// Organization gate: the session gate first, then redirect to onboarding
    /// unless the session has an active organization
    pub async fn require_active_organization_id(&self) -> Result<Gate<OrganizationId>, ProviderError> {
        let gate = self
            .organization_gate
            .get_or_try_init(|| async {
                let session = match self.require_session().await? {
                    Gate::Continue(session) => session,
                    Gate::Redirect(destination) => return Ok(Gate::Redirect(destination)),
                };

                let gate = match session.active_organization_id() {
                    Some(org) => Gate::Continue(org.clone()),
                    None => {
                        debug!(
                            user = %session.user.id,
                            "Organization gate denied request: {}",
                            Denial::NoActiveOrganization
                        );
                        Gate::Redirect(Denial::NoActiveOrganization.destination())
                    }
                };
                Ok::<_, ProviderError>(gate)
            })
            .await?;

        Ok(gate.clone())
    }

    /// Whether the provider has already been consulted successfully
    pub fn is_resolved(&self) -> bool {
        self.session.initialized()
    }
}
