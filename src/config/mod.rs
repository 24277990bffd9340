pub mod database;
mod env_provider;
mod errors;
mod logging;
mod secret_config;
mod secret_manager;
mod settings;

pub use database::DatabaseConnections;
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use env_provider::{EnvironmentProvider, SystemEnvironment};
pub use errors::SettingsError;
pub use logging::{init_logging, LoggingConfig, LoggingError};
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::{SecretError, SecretManager};
pub use settings::{AppEnvironment, AuthSettings, HashingParams, PasswordPolicy};
