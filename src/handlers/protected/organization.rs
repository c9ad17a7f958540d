use axum::extract::Extension;
use serde::Serialize;

use crate::auth::{OrganizationId, Session};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct ActiveOrganization {
    pub organization_id: OrganizationId,
    pub user_id: String,
}

/// GET /api/organization - the organization this request is scoped to
pub async fn organization_get(
    Extension(session): Extension<Session>,
    Extension(organization_id): Extension<OrganizationId>,
) -> ApiResult<ActiveOrganization> {
    Ok(ApiResponse::success(ActiveOrganization {
        organization_id,
        user_id: session.user.id,
    }))
}
