use std::fmt;

use crate::config::{EnvironmentProvider, SecretConfig, SecretType};

/// Custom error type for secret-related failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Holds the session signing key and the password pepper
pub struct SecretManager {
    session_secret: String,
    password_pepper: String,
}

impl SecretManager {
    /// Load and validate all secrets
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or too short
    pub fn init(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        let session_secret = Self::load_secret(env, &Self::session_secret_config())?;
        let password_pepper = Self::load_secret(env, &Self::pepper_config())?;

        Ok(Self {
            session_secret,
            password_pepper,
        })
    }

    /// Build directly from known values (tests, embedded use)
    pub fn from_values(session_secret: impl Into<String>, password_pepper: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            password_pepper: password_pepper.into(),
        }
    }

    fn session_secret_config() -> SecretConfig {
        SecretConfig::env("SESSION_SECRET").min_length(32)
    }

    fn pepper_config() -> SecretConfig {
        SecretConfig::env("PASSWORD_PEPPER").min_length(16)
    }

    /// HMAC key for session cookies
    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    /// Pepper mixed into password hashes
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    pub(crate) fn load_secret(env: &dyn EnvironmentProvider, config: &SecretConfig) -> Result<String, SecretError> {
        let name = config.name();
        let value = match &config.secret_type {
            SecretType::EnvVar { name } => env.get_var(name),
        };

        let value = match value {
            Some(v) => v,
            None if !config.required => return Ok(String::new()),
            None => return Err(SecretError::missing(name)),
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::invalid_length(name, min_len, value.len()));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("session_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 2 }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    const SECRET: &str = "this-is-a-valid-session-secret-32-chars";
    const PEPPER: &str = "valid-pepper-16ch";

    #[test]
    fn test_successful_initialization_with_valid_secrets() {
        let env = MockEnvironment::empty()
            .with_var("SESSION_SECRET", SECRET)
            .with_var("PASSWORD_PEPPER", PEPPER);

        let manager = SecretManager::init(&env).unwrap();
        assert_eq!(manager.session_secret(), SECRET);
        assert_eq!(manager.password_pepper(), PEPPER);
    }

    #[test]
    fn test_error_when_session_secret_missing() {
        let env = MockEnvironment::empty().with_var("PASSWORD_PEPPER", PEPPER);

        match SecretManager::init(&env) {
            Err(SecretError::Missing { secret_name }) => assert_eq!(secret_name, "SESSION_SECRET"),
            other => panic!("Expected Missing error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_error_when_pepper_missing() {
        let env = MockEnvironment::empty().with_var("SESSION_SECRET", SECRET);

        match SecretManager::init(&env) {
            Err(SecretError::Missing { secret_name }) => assert_eq!(secret_name, "PASSWORD_PEPPER"),
            other => panic!("Expected Missing error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_error_when_session_secret_too_short() {
        let env = MockEnvironment::empty()
            .with_var("SESSION_SECRET", "short-secret")
            .with_var("PASSWORD_PEPPER", PEPPER);

        match SecretManager::init(&env) {
            Err(SecretError::InvalidLength { secret_name, expected, actual }) => {
                assert_eq!(secret_name, "SESSION_SECRET");
                assert_eq!(expected, 32);
                assert_eq!(actual, 12);
            }
            other => panic!("Expected InvalidLength error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_error_when_pepper_too_short() {
        let env = MockEnvironment::empty()
            .with_var("SESSION_SECRET", SECRET)
            .with_var("PASSWORD_PEPPER", "short");

        assert!(matches!(
            SecretManager::init(&env),
            Err(SecretError::InvalidLength { expected: 16, .. })
        ));
    }

    #[test]
    fn test_optional_secret_may_be_absent() {
        let config = SecretConfig::env("OPTIONAL")
            .required(false)
            .min_length(8);

        let value = SecretManager::load_secret(&MockEnvironment::empty(), &config).unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_debug_and_display_redact_secrets() {
        let manager = SecretManager::from_values(SECRET, PEPPER);

        let debug = format!("{:?}", manager);
        let display = format!("{}", manager);
        assert!(!debug.contains(SECRET));
        assert!(!debug.contains(PEPPER));
        assert!(!display.contains(SECRET));
    }
}
