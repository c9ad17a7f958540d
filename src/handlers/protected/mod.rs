// handlers/protected/mod.rs - Protected handlers
//
// Two gates guard this tier:
// - session routes (`/api/auth/*`, onboarding) sit behind require_session_middleware
//   and read `Extension<Session>`
// - organization routes (`/api/organization*`) sit behind
//   require_organization_middleware and also get `Extension<OrganizationId>`
pub mod auth;
pub mod organization;

pub use auth::*;
pub use organization::*;
