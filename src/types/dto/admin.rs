use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::internal::{AdminUser, Permission};

/// Single permission in the catalog
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct PermissionDto {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl From<&Permission> for PermissionDto {
    fn from(permission: &Permission) -> Self {
        Self {
            key: permission.key.to_string(),
            label: permission.label.to_string(),
            description: permission.description.to_string(),
        }
    }
}

/// Permissions grouped under one category (news, events, ...)
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCategoryDto {
    pub category: String,
    pub permissions: Vec<PermissionDto>,
}

/// Role with its default permission set
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct RoleDto {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub default_permissions: Vec<String>,
}

/// Response for the permission catalog endpoint
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionCatalogResponse {
    pub categories: Vec<PermissionCategoryDto>,
    pub roles: Vec<RoleDto>,
}

/// Admin account summary (never includes the password hash)
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserDto {
    pub id: i32,
    pub username: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
    pub role_display_name: Option<String>,
    pub custom_permissions: Vec<String>,
    pub verein_id: Option<i32>,
    pub must_change_password: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&AdminUser> for AdminUserDto {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role_id: user.role_id,
            role_name: user.role_name.clone(),
            role_display_name: user.role_display_name.clone(),
            custom_permissions: user.custom_permissions.iter().map(|k| k.to_string()).collect(),
            verein_id: user.verein_id,
            must_change_password: user.must_change_password,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request to provision a new admin account
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,

    /// Role name, e.g. `redakteur`
    pub role: Option<String>,

    #[oai(default)]
    #[serde(default)]
    pub custom_permissions: Vec<String>,

    pub verein_id: Option<i32>,

    /// Initial password; generated when omitted
    pub password: Option<String>,
}

/// Response after provisioning an admin account
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: AdminUserDto,

    /// Present only when the password was generated by the server
    pub generated_password: Option<String>,
}

/// Request to replace a user's role and permission overrides
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdatePermissionsRequest {
    /// Role name; `null` removes the role
    pub role: Option<String>,

    #[oai(default)]
    #[serde(default)]
    pub custom_permissions: Vec<String>,
}

/// Response after an administrative password reset
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ResetPasswordResponse {
    pub user_id: i32,
    pub generated_password: String,
}
