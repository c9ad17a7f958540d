pub mod gates;
pub mod response;
pub mod session_context;

pub use gates::{redirect, require_organization_middleware, require_session_middleware};
pub use response::{ApiResponse, ApiResult};
pub use session_context::session_context_middleware;
