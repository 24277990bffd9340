use async_trait::async_trait;

use crate::errors::InternalError;
use crate::types::db::role;
use crate::types::internal::{AdminUser, NewAdminUser, PermissionKey};

/// Persistence boundary for admin users and roles
///
/// Implementations must not hash or validate passwords; callers hand in
/// finished hashes. Users are never hard-deleted.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AdminUser>, InternalError>;

    async fn find_user_by_id(&self, user_id: i32) -> Result<Option<AdminUser>, InternalError>;

    /// Replace the password hash and set the must-change flag in one write
    ///
    /// Fails with `CredentialError::UserIdNotFound` when no row matches.
    async fn update_password_hash(
        &self,
        user_id: i32,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<(), InternalError>;

    /// Replace role and custom permission overrides, returning the updated user
    async fn update_role_and_permissions(
        &self,
        user_id: i32,
        role_id: Option<i32>,
        custom_permissions: &[PermissionKey],
    ) -> Result<AdminUser, InternalError>;

    /// Fails with `CredentialError::DuplicateUsername` when the name is taken
    async fn create_user(&self, new_user: NewAdminUser) -> Result<AdminUser, InternalError>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<AdminUser>, InternalError>;

    async fn count_users(&self) -> Result<u64, InternalError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<role::Model>, InternalError>;

    async fn list_roles(&self) -> Result<Vec<role::Model>, InternalError>;
}
