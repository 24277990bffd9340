use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::internal::{AdminUser, CurrentUser};

/// Request model for admin login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Current session as seen by the client
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: i32,
    pub username: String,
    pub role_name: Option<String>,
    pub role_display_name: Option<String>,
    pub verein_id: Option<i32>,

    /// When true, only the password change endpoint is usable
    pub must_change_password: bool,

    /// Effective permission keys (role defaults plus overrides)
    pub permissions: Vec<String>,
}

impl SessionResponse {
    pub fn from_user(user: &AdminUser, permissions: Vec<String>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role_name: user.role_name.clone(),
            role_display_name: user.role_display_name.clone(),
            verein_id: user.verein_id,
            must_change_password: user.must_change_password,
            permissions,
        }
    }

    pub fn from_caller(caller: &CurrentUser, permissions: Vec<String>) -> Self {
        Self {
            must_change_password: caller.must_change_password(),
            ..Self::from_user(&caller.user, permissions)
        }
    }
}

/// Request model for changing the caller's own password
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    pub current_password: String,

    pub new_password: String,
}

/// Generic acknowledgement
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
