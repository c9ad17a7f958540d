// handlers/protected/auth/mod.rs - Session-gated auth endpoints
pub mod session;

pub use session::{onboarding_page, organization_active_set, session_get, SetActiveOrganizationRequest};
