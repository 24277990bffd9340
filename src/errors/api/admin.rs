use crate::errors::internal::{AuthorizationError, CredentialError, InternalError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for admin endpoints
#[derive(Object, Debug)]
pub struct AdminErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Admin operation error types
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// No valid session cookie
    #[oai(status = 401)]
    Unauthorized(Json<AdminErrorResponse>),

    /// Password change required
    #[oai(status = 403)]
    PasswordChangeRequired(Json<AdminErrorResponse>),

    /// Caller lacks the required permission
    #[oai(status = 403)]
    Forbidden(Json<AdminErrorResponse>),

    /// Cannot modify your own role or permissions
    #[oai(status = 403)]
    SelfModificationDenied(Json<AdminErrorResponse>),

    /// Cannot grant a permission you do not hold
    #[oai(status = 403)]
    PermissionEscalation(Json<AdminErrorResponse>),

    /// Request references an unknown permission or role
    #[oai(status = 400)]
    InvalidGrant(Json<AdminErrorResponse>),

    /// Password validation failed
    #[oai(status = 400)]
    PasswordValidationFailed(Json<AdminErrorResponse>),

    /// User not found
    #[oai(status = 404)]
    UserNotFound(Json<AdminErrorResponse>),

    /// Username already taken
    #[oai(status = 409)]
    DuplicateUsername(Json<AdminErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AdminErrorResponse>),
}

fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<AdminErrorResponse> {
    Json(AdminErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    })
}

impl AdminError {
    pub fn unauthorized() -> Self {
        AdminError::Unauthorized(body("unauthorized", "Authentication required", 401))
    }

    pub fn password_change_required() -> Self {
        AdminError::PasswordChangeRequired(body(
            "password_change_required",
            "Password change required. Please change your password at /api/auth/change-password",
            403,
        ))
    }

    pub fn forbidden(permission: &str) -> Self {
        AdminError::Forbidden(body(
            "forbidden",
            format!("Missing permission: {}", permission),
            403,
        ))
    }

    pub fn self_modification_denied() -> Self {
        AdminError::SelfModificationDenied(body(
            "self_modification_denied",
            "You cannot modify your own role or permissions",
            403,
        ))
    }

    pub fn permission_escalation(permission: &str) -> Self {
        AdminError::PermissionEscalation(body(
            "permission_escalation",
            format!("You cannot grant a permission you do not hold: {}", permission),
            403,
        ))
    }

    pub fn invalid_grant(message: String) -> Self {
        AdminError::InvalidGrant(body("invalid_grant", message, 400))
    }

    pub fn password_validation_failed(reason: String) -> Self {
        AdminError::PasswordValidationFailed(body("password_validation_failed", reason, 400))
    }

    pub fn user_not_found(user: String) -> Self {
        AdminError::UserNotFound(body(
            "user_not_found",
            format!("User not found: {}", user),
            404,
        ))
    }

    pub fn duplicate_username() -> Self {
        AdminError::DuplicateUsername(body("duplicate_username", "Username already exists", 409))
    }

    /// Convert InternalError to AdminError
    ///
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Database error in admin operation: {}", err);
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

            InternalError::Credential(CredentialError::UserNotFound(user)) => {
                Self::user_not_found(user.clone())
            }
            InternalError::Credential(CredentialError::UserIdNotFound { user_id }) => {
                Self::user_not_found(user_id.to_string())
            }
            InternalError::Credential(CredentialError::DuplicateUsername(username)) => {
                tracing::warn!("Duplicate username attempt: {}", username);
                Self::duplicate_username()
            }
            InternalError::Credential(CredentialError::PasswordValidationFailed(reason)) => {
                Self::password_validation_failed(reason.clone())
            }
            InternalError::Authorization(auth_err) => Self::from(auth_err.clone()),

            _ => {
                tracing::error!("Unexpected error in admin operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn internal_server_error() -> Self {
        AdminError::InternalError(body("internal_error", "An internal error occurred", 500))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.response().message.clone()
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        self.response().status_code
    }

    fn response(&self) -> &AdminErrorResponse {
        match self {
            AdminError::Unauthorized(json)
            | AdminError::PasswordChangeRequired(json)
            | AdminError::Forbidden(json)
            | AdminError::SelfModificationDenied(json)
            | AdminError::PermissionEscalation(json)
            | AdminError::InvalidGrant(json)
            | AdminError::PasswordValidationFailed(json)
            | AdminError::UserNotFound(json)
            | AdminError::DuplicateUsername(json)
            | AdminError::InternalError(json) => &json.0,
        }
    }
}

impl From<AuthorizationError> for AdminError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthorized => Self::unauthorized(),
            AuthorizationError::PasswordChangeRequired => Self::password_change_required(),
            AuthorizationError::Forbidden { permission } => Self::forbidden(&permission),
            AuthorizationError::SelfModification => Self::self_modification_denied(),
            AuthorizationError::Escalation { permission } => Self::permission_escalation(&permission),
            AuthorizationError::UnknownPermission(key) => {
                Self::invalid_grant(format!("Unknown permission: {}", key))
            }
            AuthorizationError::UnknownRole(role) => {
                Self::invalid_grant(format!("Unknown role: {}", role))
            }
        }
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
