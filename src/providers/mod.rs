// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate. They perform actual work like hashing,
// session signing, validation and permission checks.

pub mod authentication_provider;
pub mod authorization_provider;
pub mod crypto_provider;
pub mod password_validator_provider;
pub mod permission_catalog;
pub mod session_codec;

// Re-export providers for clean imports
pub use authentication_provider::AuthenticationProvider;
pub use authorization_provider::AuthorizationProvider;
pub use crypto_provider::CryptoProvider;
pub use password_validator_provider::{PasswordValidationError, PasswordValidatorProvider};
pub use permission_catalog::{PermissionCatalog, RoleDefinition};
pub use session_codec::SessionCodec;
