use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which backend answers "who is this request?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Self-contained HS256 session tokens
    Jwt,
    /// Opaque tokens looked up in the `session` table
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub provider: ProviderKind,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub session_ttl_hours: u64,
    pub session_cookie: String,
    pub sign_in_path: String,
    pub onboarding_path: String,
    pub enable_dev_sign_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
}

pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/sign-in";
pub const DEFAULT_ONBOARDING_PATH: &str = "/onboarding";
pub const DEFAULT_SESSION_COOKIE: &str = "taskboard.session_token";
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Auth overrides
        if let Ok(v) = env::var("AUTH_PROVIDER") {
            match v.to_ascii_lowercase().as_str() {
                "jwt" => self.auth.provider = ProviderKind::Jwt,
                "database" | "db" => self.auth.provider = ProviderKind::Database,
                other => tracing::warn!("Ignoring unknown AUTH_PROVIDER '{}'", other),
            }
        }
        if let Ok(v) = env::var("AUTH_JWT_SECRET").or_else(|_| env::var("JWT_SECRET")) {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_SESSION_TTL_HOURS") {
            self.auth.session_ttl_hours = parse_session_ttl_hours(&v, self.auth.session_ttl_hours);
        }
        if let Ok(v) = env::var("AUTH_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }
        if let Ok(v) = env::var("AUTH_SIGN_IN_PATH") {
            self.auth.sign_in_path = v;
        }
        if let Ok(v) = env::var("AUTH_ONBOARDING_PATH") {
            self.auth.onboarding_path = v;
        }
        if let Ok(v) = env::var("AUTH_ENABLE_DEV_SIGN_IN") {
            self.auth.enable_dev_sign_in = v.parse().unwrap_or(self.auth.enable_dev_sign_in);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("TASKBOARD_API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            auth: AuthConfig {
                provider: ProviderKind::Jwt,
                jwt_secret: "development-only-secret".to_string(),
                session_ttl_hours: 24 * 7, // 1 week
                session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
                sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
                onboarding_path: DEFAULT_ONBOARDING_PATH.to_string(),
                enable_dev_sign_in: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            auth: AuthConfig {
                provider: ProviderKind::Database,
                jwt_secret: String::new(),
                session_ttl_hours: 24,
                session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
                sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
                onboarding_path: DEFAULT_ONBOARDING_PATH.to_string(),
                enable_dev_sign_in: false,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                secure_cookies: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            auth: AuthConfig {
                provider: ProviderKind::Database,
                jwt_secret: String::new(),
                session_ttl_hours: 24 * 7,
                session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
                sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
                onboarding_path: DEFAULT_ONBOARDING_PATH.to_string(),
                enable_dev_sign_in: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                secure_cookies: true,
            },
        }
    }
}

/// Session lifetime from `AUTH_SESSION_TTL_HOURS`, capped at [`MAX_SESSION_TTL_HOURS`]
fn parse_session_ttl_hours(value: &str, current: u64) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!("Ignoring AUTH_SESSION_TTL_HOURS=0; keeping {} hours", current);
            current
        }
        Ok(hours) if hours > MAX_SESSION_TTL_HOURS => {
            tracing::warn!(
                "AUTH_SESSION_TTL_HOURS={} exceeds the maximum; using {} hours",
                hours,
                MAX_SESSION_TTL_HOURS
            );
            MAX_SESSION_TTL_HOURS
        }
        Ok(hours) => hours,
        Err(_) => {
            tracing::warn!("Ignoring invalid AUTH_SESSION_TTL_HOURS '{}'", value);
            current
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.auth.provider, ProviderKind::Jwt);
        assert_eq!(config.auth.sign_in_path, "/auth/sign-in");
        assert_eq!(config.auth.onboarding_path, "/onboarding");
        assert!(config.auth.enable_dev_sign_in);
        assert!(!config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.auth.provider, ProviderKind::Database);
        assert!(!config.auth.enable_dev_sign_in);
        assert!(config.security.secure_cookies);
        assert!(config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let value = serde_json::to_value(AppConfig::development().auth).unwrap();
        assert!(value.get("jwt_secret").is_none());
        assert_eq!(value["session_cookie"], DEFAULT_SESSION_COOKIE);
    }

    #[test]
    fn test_session_ttl_is_capped() {
        assert_eq!(parse_session_ttl_hours("48", 24), 48);
        assert_eq!(parse_session_ttl_hours("10000000000", 24), MAX_SESSION_TTL_HOURS);
        assert_eq!(parse_session_ttl_hours("0", 24), 24);
        assert_eq!(parse_session_ttl_hours("-5", 24), 24);
        assert_eq!(parse_session_ttl_hours("soon", 24), 24);
    }
}
