use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::database::DatabaseConnections;
use crate::config::{AuthSettings, SecretManager};
use crate::errors::InternalError;
use crate::providers::{
    AuthenticationProvider, AuthorizationProvider, CryptoProvider, PasswordValidatorProvider,
    PermissionCatalog, SessionCodec,
};
use crate::stores::{AuditStore, CredentialStore, UserStore};

/// Providers built once at startup and shared by all coordinators
pub struct Providers {
    pub crypto_provider: Arc<CryptoProvider>,
    pub session_codec: Arc<SessionCodec>,
    pub password_validator: Arc<PasswordValidatorProvider>,
    pub permission_catalog: PermissionCatalog,
    pub authentication_provider: Arc<AuthenticationProvider>,
    pub authorization_provider: Arc<AuthorizationProvider>,
}

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ↓ creates once
///   ├─ audit_store (Arc<AuditStore>)        audit database
///   ├─ credential_store (Arc<dyn CredentialStore>)  auth database
///   ├─ audit_logger (Arc<AuditLogger>)
///   └─ providers (crypto, session codec, validator, authenticator, authorizer)
///   ↓ wrapped in Arc<AppData>
///   ├─ LoginCoordinator::new(app_data)
///   └─ AdminCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub settings: AuthSettings,
    pub secret_manager: Arc<SecretManager>,
    pub audit_store: Arc<AuditStore>,
    pub credential_store: Arc<dyn CredentialStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub providers: Providers,
}

impl AppData {
    /// Initialize all application data
    ///
    /// Database connections should be migrated before calling this.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::Crypto` when the hashing parameters are rejected
    pub fn init(
        connections: DatabaseConnections,
        settings: AuthSettings,
        secret_manager: SecretManager,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");
        let secret_manager = Arc::new(secret_manager);

        tracing::debug!("Creating stores...");
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let credential_store: Arc<dyn CredentialStore> = Arc::new(UserStore::new(connections.auth.clone()));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        tracing::debug!("Creating providers...");
        let crypto_provider = Arc::new(CryptoProvider::new(
            secret_manager.password_pepper(),
            settings.hashing,
        )?);
        let session_codec = Arc::new(SessionCodec::new(
            secret_manager.session_secret(),
            crypto_provider.clone(),
        ));
        let password_validator = Arc::new(PasswordValidatorProvider::new(settings.password_policy));
        let permission_catalog = PermissionCatalog::new();

        let authentication_provider = Arc::new(AuthenticationProvider::new(
            credential_store.clone(),
            crypto_provider.clone(),
            session_codec.clone(),
            password_validator.clone(),
            settings.session_max_age,
            settings.secure_cookies(),
        ));
        let authorization_provider = Arc::new(AuthorizationProvider::new(permission_catalog));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            connections,
            settings,
            secret_manager,
            audit_store,
            credential_store,
            audit_logger,
            providers: Providers {
                crypto_provider,
                session_codec,
                password_validator,
                permission_catalog,
                authentication_provider,
                authorization_provider,
            },
        })
    }
}
