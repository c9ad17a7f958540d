//! Request gating: session resolution, the sign-in gate and the organization gate.
//!
//! A gate either lets a value through ([`Gate::Continue`]) or names where the
//! caller must be sent instead ([`Gate::Redirect`]). Callers stop handling the
//! request on a redirect; nothing here performs the navigation itself.

pub mod context;

pub use context::RequestContext;

use thiserror::Error;

use crate::config::AuthConfig;

/// Outcome of a gate
#[must_use = "a redirect must stop further handling of the request"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Continue(T),
    Redirect(Destination),
}

impl<T> Gate<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gate<U> {
        match self {
            Gate::Continue(value) => Gate::Continue(f(value)),
            Gate::Redirect(destination) => Gate::Redirect(destination),
        }
    }

    pub fn into_result(self) -> Result<T, Destination> {
        match self {
            Gate::Continue(value) => Ok(value),
            Gate::Redirect(destination) => Err(destination),
        }
    }
}

/// Where a denied request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    SignIn,
    Onboarding,
}

impl Destination {
    pub fn path(self, auth: &AuthConfig) -> &str {
        match self {
            Destination::SignIn => &auth.sign_in_path,
            Destination::Onboarding => &auth.onboarding_path,
        }
    }

    pub fn denial(self) -> Denial {
        match self {
            Destination::SignIn => Denial::NoSession,
            Destination::Onboarding => Denial::NoActiveOrganization,
        }
    }
}

/// Why a gate redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("no valid session for request")]
    NoSession,

    #[error("session has no active organization")]
    NoActiveOrganization,
}

impl Denial {
    pub fn destination(self) -> Destination {
        match self {
            Denial::NoSession => Destination::SignIn,
            Denial::NoActiveOrganization => Destination::Onboarding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn destinations_use_configured_paths() {
        let mut config = AppConfig::development();
        assert_eq!(Destination::SignIn.path(&config.auth), "/auth/sign-in");
        assert_eq!(Destination::Onboarding.path(&config.auth), "/onboarding");

        config.auth.onboarding_path = "/welcome".to_string();
        assert_eq!(Destination::Onboarding.path(&config.auth), "/welcome");
    }

    #[test]
    fn denials_pair_with_destinations() {
        for denial in [Denial::NoSession, Denial::NoActiveOrganization] {
            assert_eq!(denial.destination().denial(), denial);
        }
    }

    #[test]
    fn map_leaves_redirects_alone() {
        let redirect: Gate<u8> = Gate::Redirect(Destination::SignIn);
        assert_eq!(redirect.map(|v| v + 1), Gate::Redirect(Destination::SignIn));
        assert_eq!(Gate::Continue(1u8).map(|v| v + 1).into_result(), Ok(2));
    }
}
