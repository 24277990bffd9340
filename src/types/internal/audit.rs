use std::fmt;

/// Security-relevant actions recorded in the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditAction {
    LoginSuccess,
    LoginFailure,
    Logout,
    PasswordChanged,
    PasswordReset,
    UserCreated,
    UserPermissionsUpdated,
    UserBootstrapped,
    PermissionDenied,
    Custom(String),
}

impl AuditAction {
    /// String representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::Logout => "logout",
            Self::PasswordChanged => "password_changed",
            Self::PasswordReset => "password_reset",
            Self::UserCreated => "user_created",
            Self::UserPermissionsUpdated => "user_permissions_updated",
            Self::UserBootstrapped => "user_bootstrapped",
            Self::PermissionDenied => "permission_denied",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit log entry as handed to the audit store
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub user_id: Option<i32>,
    pub username: Option<String>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, resource_type: impl Into<String>) -> Self {
        Self {
            user_id: None,
            username: None,
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
        }
    }
}
