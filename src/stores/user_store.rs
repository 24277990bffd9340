use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::stores::CredentialStore;
use crate::types::db::{role, user};
use crate::types::internal::{AdminUser, NewAdminUser, PermissionKey};

/// SeaORM-backed credential store over the `admin_users` and `roles` tables
#[derive(Clone)]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn serialize_permissions(custom_permissions: &[PermissionKey]) -> Result<String, InternalError> {
        serde_json::to_string(custom_permissions)
            .map_err(|e| InternalError::parse("custom_permissions", e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for UserStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AdminUser>, InternalError> {
        let row = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))?;

        Ok(row.map(|(model, role)| AdminUser::from_models(model, role)))
    }

    async fn find_user_by_id(&self, user_id: i32) -> Result<Option<AdminUser>, InternalError> {
        let row = user::Entity::find_by_id(user_id)
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))?;

        Ok(row.map(|(model, role)| AdminUser::from_models(model, role)))
    }

    async fn update_password_hash(
        &self,
        user_id: i32,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<(), InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::MustChangePassword, Expr::value(must_change_password))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("update_password_hash", e))?;

        if result.rows_affected == 0 {
            return Err(CredentialError::UserIdNotFound { user_id }.into());
        }

        tracing::debug!("Password hash updated for user {}", user_id);
        Ok(())
    }

    async fn update_role_and_permissions(
        &self,
        user_id: i32,
        role_id: Option<i32>,
        custom_permissions: &[PermissionKey],
    ) -> Result<AdminUser, InternalError> {
        let permissions_json = Self::serialize_permissions(custom_permissions)?;

        let result = user::Entity::update_many()
            .col_expr(user::Column::RoleId, Expr::value(role_id))
            .col_expr(user::Column::CustomPermissions, Expr::value(permissions_json))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("update_role_and_permissions", e))?;

        if result.rows_affected == 0 {
            return Err(CredentialError::UserIdNotFound { user_id }.into());
        }

        self.find_user_by_id(user_id)
            .await?
            .ok_or_else(|| CredentialError::UserIdNotFound { user_id }.into())
    }

    async fn create_user(&self, new_user: NewAdminUser) -> Result<AdminUser, InternalError> {
        if self.find_user_by_username(&new_user.username).await?.is_some() {
            return Err(CredentialError::DuplicateUsername(new_user.username).into());
        }

        let now = Utc::now().timestamp();
        let username = new_user.username.clone();

        let model = user::ActiveModel {
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            role_id: Set(new_user.role_id),
            custom_permissions: Set(Some(Self::serialize_permissions(&new_user.custom_permissions)?)),
            verein_id: Set(new_user.verein_id),
            must_change_password: Set(new_user.must_change_password),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            // Lost a race against a concurrent insert
            if e.to_string().contains("UNIQUE") {
                CredentialError::DuplicateUsername(username.clone()).into()
            } else {
                InternalError::database("create_user", e)
            }
        })?;

        tracing::info!("Admin user {} created with id {}", model.username, model.id);

        self.find_user_by_id(model.id)
            .await?
            .ok_or_else(|| CredentialError::UserNotFound(username).into())
    }

    async fn list_users(&self) -> Result<Vec<AdminUser>, InternalError> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .find_also_related(role::Entity)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_users", e))?;

        Ok(rows
            .into_iter()
            .map(|(model, role)| AdminUser::from_models(model, role))
            .collect())
    }

    async fn count_users(&self) -> Result<u64, InternalError> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_users", e))
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))
    }

    async fn list_roles(&self) -> Result<Vec<role::Model>, InternalError> {
        role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_roles", e))
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("db", &"<connection>").finish()
    }
}
