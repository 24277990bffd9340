use crate::errors::internal::{AuthorizationError, CredentialError, InternalError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Current password is incorrect (for password change)
    #[oai(status = 401)]
    IncorrectPassword(Json<AuthErrorResponse>),

    /// Password validation failed
    #[oai(status = 400)]
    PasswordValidationFailed(Json<AuthErrorResponse>),

    /// No valid session cookie
    #[oai(status = 401)]
    Unauthorized(Json<AuthErrorResponse>),

    /// Password must be changed before any other action
    #[oai(status = 403)]
    PasswordChangeRequired(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(AuthErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid username or password".to_string(),
            status_code: 401,
        }))
    }

    pub fn incorrect_password() -> Self {
        AuthError::IncorrectPassword(Json(AuthErrorResponse {
            error: "incorrect_password".to_string(),
            message: "Current password is incorrect".to_string(),
            status_code: 401,
        }))
    }

    pub fn password_validation_failed(message: String) -> Self {
        AuthError::PasswordValidationFailed(Json(AuthErrorResponse {
            error: "password_validation_failed".to_string(),
            message,
            status_code: 400,
        }))
    }

    pub fn unauthorized() -> Self {
        AuthError::Unauthorized(Json(AuthErrorResponse {
            error: "unauthorized".to_string(),
            message: "Authentication required".to_string(),
            status_code: 401,
        }))
    }

    pub fn password_change_required() -> Self {
        AuthError::PasswordChangeRequired(Json(AuthErrorResponse {
            error: "password_change_required".to_string(),
            message: "Password change required. Please change your password at /api/auth/change-password"
                .to_string(),
            status_code: 403,
        }))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Database error in auth operation: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }

            InternalError::Credential(CredentialError::InvalidCredentials) => {
                tracing::debug!("Invalid credentials attempt");
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::IncorrectPassword) => {
                tracing::debug!("Incorrect password for password change");
                Self::incorrect_password()
            }
            InternalError::Credential(CredentialError::PasswordValidationFailed(message)) => {
                tracing::debug!("Password validation failed: {}", message);
                Self::password_validation_failed(message.clone())
            }
            // A session pointing at a vanished user is treated as no session
            InternalError::Credential(CredentialError::UserIdNotFound { user_id }) => {
                tracing::warn!("Session references missing user {}", user_id);
                Self::unauthorized()
            }
            InternalError::Authorization(auth_err) => Self::from(auth_err.clone()),

            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Generic internal server error; never exposes internal details
    fn internal_server_error() -> Self {
        AuthError::InternalError(Json(AuthErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    /// Get the machine-readable error code
    pub fn code(&self) -> &str {
        &self.body().error
    }

    fn body(&self) -> &AuthErrorResponse {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::IncorrectPassword(json)
            | AuthError::PasswordValidationFailed(json)
            | AuthError::Unauthorized(json)
            | AuthError::PasswordChangeRequired(json)
            | AuthError::InternalError(json) => &json.0,
        }
    }
}

impl From<AuthorizationError> for AuthError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthorized => Self::unauthorized(),
            AuthorizationError::PasswordChangeRequired => Self::password_change_required(),
            other => {
                tracing::error!("Unexpected authorization error in auth operation: {}", other);
                Self::internal_server_error()
            }
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
