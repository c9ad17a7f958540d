// handlers/public/auth/mod.rs - Sign-in entry points
pub mod session;

pub use session::{sign_in, sign_in_page, sign_out, SignInRequest};
