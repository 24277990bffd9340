use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Password validation failed: {0}")]
    PasswordValidationFailed(String),

    #[error("User already exists: {0}")]
    DuplicateUsername(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User ID not found: {user_id}")]
    UserIdNotFound { user_id: i32 },

    #[error("Admin users already exist; bootstrap refused")]
    AlreadyBootstrapped,
}
