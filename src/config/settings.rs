use std::str::FromStr;
use std::time::Duration;

use crate::config::{EnvironmentProvider, SettingsError};

/// Deployment environment; controls the `Secure` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, AppEnvironment::Production)
    }
}

/// Password strength rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Settings read once at startup
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub database_url: String,
    pub audit_database_url: String,
    pub bind_address: String,
    pub environment: AppEnvironment,
    pub session_max_age: Duration,
    pub password_policy: PasswordPolicy,
    pub hashing: HashingParams,
    pub login_failure_delay: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://wendessen-admin.db?mode=rwc".to_string(),
            audit_database_url: "sqlite://wendessen-audit.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            environment: AppEnvironment::Development,
            session_max_age: Duration::from_secs(7 * 24 * 60 * 60),
            password_policy: PasswordPolicy::default(),
            hashing: HashingParams::default(),
            login_failure_delay: Duration::from_millis(500),
        }
    }
}

impl AuthSettings {
    /// Load settings, falling back to defaults for anything unset
    pub fn from_env(env: &dyn EnvironmentProvider) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let environment = match env.get_var("APP_ENV") {
            None => defaults.environment,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "production" | "prod" => AppEnvironment::Production,
                "development" | "dev" | "test" => AppEnvironment::Development,
                _ => {
                    return Err(SettingsError::invalid_format(
                        "APP_ENV",
                        "production or development",
                        &value,
                    ))
                }
            },
        };

        let session_days: u64 = parse_or(env, "SESSION_MAX_AGE_DAYS", 7)?;
        if session_days == 0 {
            return Err(SettingsError::out_of_range("SESSION_MAX_AGE_DAYS", "must be at least 1"));
        }
        let session_secs = session_days
            .checked_mul(24 * 60 * 60)
            .ok_or_else(|| SettingsError::out_of_range("SESSION_MAX_AGE_DAYS", "too large"))?;

        let min_length: usize = parse_or(env, "PASSWORD_MIN_LENGTH", defaults.password_policy.min_length)?;
        if min_length == 0 || min_length > defaults.password_policy.max_length {
            return Err(SettingsError::out_of_range(
                "PASSWORD_MIN_LENGTH",
                format!("must be between 1 and {}", defaults.password_policy.max_length),
            ));
        }

        let hashing = HashingParams {
            memory_kib: parse_or(env, "PASSWORD_HASH_MEMORY_KIB", defaults.hashing.memory_kib)?,
            iterations: parse_or(env, "PASSWORD_HASH_ITERATIONS", defaults.hashing.iterations)?,
            parallelism: defaults.hashing.parallelism,
        };

        let delay_ms: u64 = parse_or(env, "LOGIN_FAILURE_DELAY_MS", 500)?;

        Ok(Self {
            database_url: env.get_var("DATABASE_URL").unwrap_or(defaults.database_url),
            audit_database_url: env
                .get_var("AUDIT_DATABASE_URL")
                .unwrap_or(defaults.audit_database_url),
            bind_address: env.get_var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            environment,
            session_max_age: Duration::from_secs(session_secs),
            password_policy: PasswordPolicy {
                min_length,
                ..defaults.password_policy
            },
            hashing,
            login_failure_delay: Duration::from_millis(delay_ms),
        })
    }

    /// Whether issued cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

fn parse_or<T: FromStr>(env: &dyn EnvironmentProvider, name: &str, default: T) -> Result<T, SettingsError> {
    match env.get_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SettingsError::invalid_format(name, "unsigned integer", &raw)),
    }
}
