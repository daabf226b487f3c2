//! Service Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use std::env;
use std::path::PathBuf;

/// Authentication configuration loaded from environment
///
/// Constructed once at process start and passed by reference into the
/// token keys, hasher, and auth service. Never read from ambient state
/// after startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for signing access tokens (from ACCESS_TOKEN_SECRET env var)
    pub access_secret: String,

    /// Secret for signing refresh tokens (from REFRESH_TOKEN_SECRET env var)
    pub refresh_secret: String,

    /// Access token lifetime in seconds (from ACCESS_TOKEN_TTL env var)
    pub access_ttl: i64,

    /// Refresh token lifetime in seconds (from REFRESH_TOKEN_TTL env var)
    pub refresh_ttl: i64,

    /// Login rate limit window in seconds (from LOGIN_RATE_WINDOW env var)
    pub rate_limit_window: u64,

    /// Login attempts allowed per window (from LOGIN_RATE_MAX env var)
    pub rate_limit_max: u32,

    /// Credential store lookup timeout in milliseconds (from STORE_TIMEOUT_MS env var)
    pub store_timeout_ms: u64,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Directory for audit log files (from AUDIT_LOG_DIR env var)
    pub audit_log_dir: PathBuf,

    /// Listen address (from BIND_ADDR env var)
    pub bind_addr: String,
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if ACCESS_TOKEN_SECRET or REFRESH_TOKEN_SECRET is not set
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET environment variable must be set"),

            refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET environment variable must be set"),

            access_ttl: env::var("ACCESS_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600), // 10 minutes default

            refresh_ttl: env::var("REFRESH_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800), // 7 days default

            rate_limit_window: env::var("LOGIN_RATE_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            rate_limit_max: env::var("LOGIN_RATE_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            audit_log_dir: env::var("AUDIT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5050".to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.access_secret.len() < 32 {
            return Err("ACCESS_TOKEN_SECRET must be at least 32 characters".to_string());
        }

        if self.refresh_secret.len() < 32 {
            return Err("REFRESH_TOKEN_SECRET must be at least 32 characters".to_string());
        }

        // Key separation: a leaked refresh secret must not forge access
        // tokens, which a shared secret would allow.
        if self.access_secret == self.refresh_secret {
            return Err("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string());
        }

        if self.access_ttl <= 0 {
            return Err("ACCESS_TOKEN_TTL must be positive".to_string());
        }

        if self.refresh_ttl <= self.access_ttl {
            return Err("REFRESH_TOKEN_TTL must be greater than ACCESS_TOKEN_TTL".to_string());
        }

        if self.rate_limit_max == 0 {
            return Err("LOGIN_RATE_MAX must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Configuration for unit tests: valid secrets, short TTLs, cheap hashing.
#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        access_secret: "a".repeat(32),
        refresh_secret: "r".repeat(32),
        access_ttl: 600,
        refresh_ttl: 604800,
        rate_limit_window: 60,
        rate_limit_max: 5,
        store_timeout_ms: 5000,
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        audit_log_dir: std::env::temp_dir().join("crewnotes-auth-test-logs"),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig {
            access_secret: "short".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_shared_secret() {
        let config = AuthConfig {
            refresh_secret: "a".repeat(32),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_refresh_ttl_must_exceed_access_ttl() {
        let config = AuthConfig {
            access_ttl: 900,
            refresh_ttl: 900,
            ..test_config()
        };
        assert!(config.validate().is_err());
    }
}
