use thiserror::Error;

pub mod audit;
pub mod authorization;
pub mod credential;
pub mod database;
pub mod session;

pub use audit::AuditError;
pub use authorization::AuthorizationError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use session::SessionCodecError;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors (database, parse, crypto) are shared; domain errors
/// carry their own enums. Not exposed via API - endpoints must convert to
/// AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Session(#[from] SessionCodecError),
}

impl InternalError {
    pub fn database(operation: impl Into<String>, source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.into(),
            source,
        })
    }

    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> Self {
        InternalError::Parse {
            value_type: value_type.into(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        InternalError::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
