pub mod database;
pub mod jwt;
pub mod provider;
pub mod session;
pub mod token;

pub use database::DatabaseSessionProvider;
pub use jwt::{decode_jwt, generate_jwt, Claims, JwtSessionProvider, TokenError};
pub use provider::{ProviderError, SessionProvider};
pub use session::{OrganizationId, Session, SessionRecord, SessionUser};
pub use token::{clear_session_cookie, extract_session_token, session_cookie};
