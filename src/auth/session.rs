use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the organization a principal currently has selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

impl OrganizationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrganizationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OrganizationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The authenticated principal behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// Provider-side session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub active_organization_id: Option<OrganizationId>,
}

/// A session as returned by a [`SessionProvider`](super::SessionProvider).
///
/// Either a provider returns one of these whole or it returns nothing; this
/// crate never builds or mutates one on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session: SessionRecord,
    pub user: SessionUser,
}

impl Session {
    /// Active organization, treating an empty identifier as unset
    pub fn active_organization_id(&self) -> Option<&OrganizationId> {
        self.session
            .active_organization_id
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(org: Option<&str>) -> Session {
        Session {
            session: SessionRecord {
                id: "sess_1".to_string(),
                user_id: "user_1".to_string(),
                expires_at: Utc::now(),
                active_organization_id: org.map(OrganizationId::from),
            },
            user: SessionUser {
                id: "user_1".to_string(),
                name: "Ada".to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn active_organization_present() {
        let session = session_with(Some("org_123"));
        assert_eq!(session.active_organization_id().map(|o| o.as_str()), Some("org_123"));
    }

    #[test]
    fn blank_organization_counts_as_absent() {
        assert!(session_with(None).active_organization_id().is_none());
        assert!(session_with(Some("")).active_organization_id().is_none());
        assert!(session_with(Some("  ")).active_organization_id().is_none());
    }

    #[test]
    fn serializes_with_camel_case_record() {
        let value = serde_json::to_value(session_with(Some("org_123"))).unwrap();
        assert_eq!(value["session"]["activeOrganizationId"], "org_123");
        assert_eq!(value["session"]["userId"], "user_1");
        assert_eq!(value["user"]["name"], "Ada");
    }
}
