use std::fmt;

use crate::types::db::{role, user};
use crate::types::internal::permission::PermissionKey;
use crate::types::internal::session::Session;

/// Admin user as seen by providers and coordinators
///
/// Built from the `admin_users` row joined with its role.
#[derive(Clone, PartialEq)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
    pub role_display_name: Option<String>,
    pub custom_permissions: Vec<PermissionKey>,
    pub verein_id: Option<i32>,
    pub must_change_password: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AdminUser {
    /// Build from database models
    ///
    /// Unparseable permission entries are dropped with a warning; they can never grant anything.
    pub fn from_models(model: user::Model, role: Option<role::Model>) -> Self {
        let custom_permissions = parse_custom_permissions(model.id, model.custom_permissions.as_deref());

        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            role_id: model.role_id,
            role_name: role.as_ref().map(|r| r.name.clone()),
            role_display_name: role.map(|r| r.display_name),
            custom_permissions,
            verein_id: model.verein_id,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.custom_permissions.iter().any(PermissionKey::is_wildcard)
    }
}

// Password hash stays out of logs
impl fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role_name", &self.role_name)
            .field("custom_permissions", &self.custom_permissions)
            .field("verein_id", &self.verein_id)
            .field("must_change_password", &self.must_change_password)
            .finish()
    }
}

fn parse_custom_permissions(user_id: i32, raw: Option<&str>) -> Vec<PermissionKey> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Ignoring unparseable custom permissions for user {}: {}", user_id, e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry.as_str().map(PermissionKey::parse) {
            Some(Ok(key)) => Some(key),
            _ => {
                tracing::warn!("Ignoring invalid permission entry {} for user {}", entry, user_id);
                None
            }
        })
        .collect()
}

/// Fields for inserting a new admin user; the password is already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminUser {
    pub username: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub custom_permissions: Vec<PermissionKey>,
    pub verein_id: Option<i32>,
    pub must_change_password: bool,
}

/// Authenticated caller resolved for a single request
///
/// Pairs the decoded session snapshot with the live user record.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user: AdminUser,
    pub session: Session,
}

impl CurrentUser {
    pub fn new(user: AdminUser, session: Session) -> Self {
        Self { user, session }
    }

    /// Gate applies if either the session snapshot or the live record has the flag set
    pub fn must_change_password(&self) -> bool {
        self.session.must_change_password || self.user.must_change_password
    }

    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}
