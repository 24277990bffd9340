use thiserror::Error;

/// Outcome of a failed authorization gate or grant check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No valid session
    #[error("Authentication required")]
    Unauthorized,

    /// Caller must change their password before doing anything else
    #[error("Password change required")]
    PasswordChangeRequired,

    #[error("Missing permission: {permission}")]
    Forbidden { permission: String },

    #[error("Admins cannot modify their own role or permissions")]
    SelfModification,

    /// Actor tried to grant a permission they do not hold themselves
    #[error("Cannot grant permission not held: {permission}")]
    Escalation { permission: String },

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
