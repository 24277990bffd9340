use std::sync::Arc;

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::errors::internal::{AuthorizationError, CredentialError};
use crate::errors::InternalError;
use crate::providers::{AuthenticationProvider, AuthorizationProvider};
use crate::stores::CredentialStore;
use crate::types::dto::admin::{
    AdminUserDto, CreateUserRequest, CreateUserResponse, PermissionCatalogResponse,
    PermissionCategoryDto, PermissionDto, ResetPasswordResponse, RoleDto, UpdatePermissionsRequest,
};
use crate::types::internal::audit::AuditAction;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AdminUser, NewAdminUser, PermissionKey};

const USERS_VIEW: PermissionKey = PermissionKey::from_static("users.view");
const USERS_CREATE: PermissionKey = PermissionKey::from_static("users.create");
const USERS_EDIT: PermissionKey = PermissionKey::from_static("users.edit");

const BOOTSTRAP_ROLE: &str = "super_admin";

/// Admin coordinator that orchestrates admin account management
///
/// Every operation runs its permission gate first; mutations happen strictly
/// after the gate and the grant checks pass, and each one is audited.
pub struct AdminCoordinator {
    credential_store: Arc<dyn CredentialStore>,
    authentication_provider: Arc<AuthenticationProvider>,
    authorization_provider: Arc<AuthorizationProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AdminCoordinator {
    /// Create AdminCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            credential_store: Arc::clone(&app_data.credential_store),
            authentication_provider: Arc::clone(&app_data.providers.authentication_provider),
            authorization_provider: Arc::clone(&app_data.providers.authorization_provider),
            audit_logger: Arc::clone(&app_data.audit_logger),
        }
    }

    /// Permission catalog grouped by category plus the roles with their defaults
    ///
    /// # Authorization
    /// Requires `users.view`
    pub async fn permission_catalog(&self, ctx: &RequestContext) -> Result<PermissionCatalogResponse, InternalError> {
        self.authorization_provider.require_permission(ctx, &USERS_VIEW)?;

        let catalog = self.authorization_provider.catalog();
        let categories = catalog
            .list_permissions_by_category()
            .into_iter()
            .map(|(category, permissions)| PermissionCategoryDto {
                category: category.to_string(),
                permissions: permissions.into_iter().map(PermissionDto::from).collect(),
            })
            .collect();

        let roles = self
            .credential_store
            .list_roles()
            .await?
            .into_iter()
            .map(|role| RoleDto {
                default_permissions: catalog
                    .get_role_default_permissions(&role.name)
                    .into_iter()
                    .map(String::from)
                    .collect(),
                id: role.id,
                name: role.name,
                display_name: role.display_name,
                description: role.description,
            })
            .collect();

        Ok(PermissionCatalogResponse { categories, roles })
    }

    /// # Authorization
    /// Requires `users.view`
    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<AdminUserDto>, InternalError> {
        self.authorization_provider.require_permission(ctx, &USERS_VIEW)?;

        let users = self.credential_store.list_users().await?;
        Ok(users.iter().map(AdminUserDto::from).collect())
    }

    /// Provision a new admin account
    ///
    /// Coordinates:
    /// 1. Gate on `users.create`
    /// 2. Parse permission keys and check the grant against the actor's own permissions
    /// 3. Resolve the role, hash the supplied password or generate one
    /// 4. Insert with must-change-password set and audit
    ///
    /// The generated password is returned exactly once.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        request: CreateUserRequest,
    ) -> Result<CreateUserResponse, InternalError> {
        let actor = self.authorization_provider.require_permission(ctx, &USERS_CREATE)?;

        let custom_permissions = parse_permission_keys(&request.custom_permissions)?;
        self.authorization_provider.check_grant(
            &actor.user,
            None,
            request.role.as_deref(),
            &custom_permissions,
        )?;
        let role_id = self.resolve_role_id(request.role.as_deref()).await?;

        let (password_hash, generated_password) = match request.password.as_deref() {
            Some(password) => (
                self.authentication_provider.hash_new_password(password, &request.username)?,
                None,
            ),
            None => {
                let password = self.authentication_provider.generate_password();
                (self.authentication_provider.hash_password(&password)?, Some(password))
            }
        };

        let user = self
            .credential_store
            .create_user(NewAdminUser {
                username: request.username,
                password_hash,
                role_id,
                custom_permissions,
                verein_id: request.verein_id,
                must_change_password: true,
            })
            .await?;

        self.audit_logger
            .builder(AuditAction::UserCreated)
            .with_context(ctx)
            .resource("admin_user", user.id)
            .add_field("target_username", &user.username)
            .add_field("role", &user.role_name)
            .add_field("custom_permissions", &user.custom_permissions)
            .add_field("generated_password", generated_password.is_some())
            .emit()
            .await;

        tracing::info!("Admin user {} created by {}", user.id, actor.id());

        Ok(CreateUserResponse {
            user: AdminUserDto::from(&user),
            generated_password,
        })
    }

    /// Replace a user's role and custom permissions
    ///
    /// # Authorization
    /// Requires `users.edit`. The actor may not edit themselves, may not grant
    /// anything they do not hold and may not edit an account holding
    /// permissions they lack.
    pub async fn update_role_and_permissions(
        &self,
        ctx: &RequestContext,
        target_id: i32,
        request: UpdatePermissionsRequest,
    ) -> Result<AdminUserDto, InternalError> {
        let actor = self.authorization_provider.require_permission(ctx, &USERS_EDIT)?;

        let custom_permissions = parse_permission_keys(&request.custom_permissions)?;
        self.authorization_provider.check_grant(
            &actor.user,
            Some(target_id),
            request.role.as_deref(),
            &custom_permissions,
        )?;

        let target = self.find_target(target_id).await?;
        self.check_target_rank(&actor.user, &target)?;

        let role_id = self.resolve_role_id(request.role.as_deref()).await?;
        let updated = self
            .credential_store
            .update_role_and_permissions(target_id, role_id, &custom_permissions)
            .await?;

        self.audit_logger
            .builder(AuditAction::UserPermissionsUpdated)
            .with_context(ctx)
            .resource("admin_user", target_id)
            .add_field("old_role", &target.role_name)
            .add_field("new_role", &updated.role_name)
            .add_field("old_custom_permissions", &target.custom_permissions)
            .add_field("new_custom_permissions", &updated.custom_permissions)
            .emit()
            .await;

        tracing::info!("Permissions of user {} updated by {}", target_id, actor.id());
        Ok(AdminUserDto::from(&updated))
    }

    /// Reset another user's password to a generated one with must-change set
    ///
    /// # Authorization
    /// Requires `users.edit` and every permission the target holds; own
    /// password goes through the change-password flow.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        target_id: i32,
    ) -> Result<ResetPasswordResponse, InternalError> {
        let actor = self.authorization_provider.require_permission(ctx, &USERS_EDIT)?;

        if actor.id() == target_id {
            return Err(AuthorizationError::SelfModification.into());
        }
        let target = self.find_target(target_id).await?;
        self.check_target_rank(&actor.user, &target)?;

        let generated_password = self.authentication_provider.reset_password(target_id).await?;

        self.audit_logger
            .builder(AuditAction::PasswordReset)
            .with_context(ctx)
            .resource("admin_user", target_id)
            .emit()
            .await;

        Ok(ResetPasswordResponse {
            user_id: target_id,
            generated_password,
        })
    }

    /// First-run provisioning of the initial super admin (CLI only)
    ///
    /// Refuses once any admin account exists. The account gets the
    /// `super_admin` role plus the wildcard, a generated password and the
    /// must-change flag.
    pub async fn bootstrap(&self, ctx: &RequestContext, username: &str) -> Result<(AdminUser, String), InternalError> {
        if self.credential_store.count_users().await? > 0 {
            return Err(CredentialError::AlreadyBootstrapped.into());
        }

        let role_id = self.resolve_role_id(Some(BOOTSTRAP_ROLE)).await?;
        let password = self.authentication_provider.generate_password();
        let password_hash = self.authentication_provider.hash_password(&password)?;

        let user = self
            .credential_store
            .create_user(NewAdminUser {
                username: username.to_string(),
                password_hash,
                role_id,
                custom_permissions: vec![PermissionKey::WILDCARD],
                verein_id: None,
                must_change_password: true,
            })
            .await?;

        self.audit_logger
            .builder(AuditAction::UserBootstrapped)
            .with_context(ctx)
            .resource("admin_user", user.id)
            .add_field("target_username", &user.username)
            .emit()
            .await;

        tracing::info!("Bootstrapped initial super admin {}", user.id);
        Ok((user, password))
    }

    /// Operator password reset by username (CLI only, no permission gate)
    pub async fn reset_password_by_username(&self, ctx: &RequestContext, username: &str) -> Result<String, InternalError> {
        let user = self
            .credential_store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| CredentialError::UserNotFound(username.to_string()))?;

        let generated_password = self.authentication_provider.reset_password(user.id).await?;

        self.audit_logger
            .builder(AuditAction::PasswordReset)
            .with_context(ctx)
            .resource("admin_user", user.id)
            .emit()
            .await;

        Ok(generated_password)
    }

    async fn find_target(&self, target_id: i32) -> Result<AdminUser, InternalError> {
        self.credential_store
            .find_user_by_id(target_id)
            .await?
            .ok_or_else(|| CredentialError::UserIdNotFound { user_id: target_id }.into())
    }

    async fn resolve_role_id(&self, role_name: Option<&str>) -> Result<Option<i32>, InternalError> {
        let Some(role_name) = role_name else {
            return Ok(None);
        };

        match self.credential_store.find_role_by_name(role_name).await? {
            Some(role) => Ok(Some(role.id)),
            None => Err(AuthorizationError::UnknownRole(role_name.to_string()).into()),
        }
    }

    /// The actor must hold everything the target holds
    ///
    /// A wildcard holder can only be managed by another wildcard holder.
    fn check_target_rank(&self, actor: &AdminUser, target: &AdminUser) -> Result<(), AuthorizationError> {
        if target.has_wildcard() && !actor.has_wildcard() {
            return Err(AuthorizationError::Escalation {
                permission: PermissionKey::WILDCARD.to_string(),
            });
        }

        let authz = &self.authorization_provider;
        match authz
            .effective_permissions(target)
            .into_iter()
            .find(|key| !authz.has_permission(Some(actor), key))
        {
            Some(key) => Err(AuthorizationError::Escalation {
                permission: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_permission_keys(raw: &[String]) -> Result<Vec<PermissionKey>, AuthorizationError> {
    let mut keys: Vec<PermissionKey> = Vec::with_capacity(raw.len());
    for entry in raw {
        let key = PermissionKey::parse(entry)?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{context_for, create_test_user, setup_test_app};

    fn create_request(username: &str, role: Option<&str>, custom: &[&str]) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            role: role.map(str::to_string),
            custom_permissions: custom.iter().map(|s| s.to_string()).collect(),
            verein_id: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn test_permission_catalog_lists_roles_with_defaults() {
        let app = setup_test_app().await;
        let admin = create_test_user(&app, "admin", "Secret123", Some("admin"), &[], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &admin).await;

        let catalog = coordinator.permission_catalog(&ctx).await.unwrap();

        assert_eq!(catalog.categories.len(), 8);
        assert_eq!(catalog.categories[0].category, "news");
        assert_eq!(catalog.roles.len(), 4);
        let verwalter = catalog.roles.iter().find(|r| r.name == "vereinsverwalter").unwrap();
        assert_eq!(verwalter.default_permissions.len(), 11);
    }

    #[tokio::test]
    async fn test_list_users_requires_users_view() {
        let app = setup_test_app().await;
        let redakteur = create_test_user(&app, "red", "Secret123", Some("redakteur"), &[], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &redakteur).await;

        let result = coordinator.list_users(&ctx).await;

        assert!(matches!(
            result,
            Err(InternalError::Authorization(AuthorizationError::Forbidden { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_user_with_generated_password() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let response = coordinator
            .create_user(&ctx, create_request("anna", Some("redakteur"), &["vereine.edit"]))
            .await
            .unwrap();

        let password = response.generated_password.unwrap();
        assert!(response.user.must_change_password);
        assert_eq!(response.user.custom_permissions, vec!["vereine.edit".to_string()]);

        let verified = app
            .providers
            .authentication_provider
            .verify_credentials("anna", &password)
            .await
            .unwrap();
        assert!(verified.is_some());

        let entries = app.audit_store.recent_entries(1).await.unwrap();
        assert_eq!(entries[0].action, "user_created");
    }

    #[tokio::test]
    async fn test_create_user_with_weak_password_is_rejected() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let mut request = create_request("anna", None, &[]);
        request.password = Some("anna1234".to_string());
        let result = coordinator.create_user(&ctx, request).await;

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::PasswordValidationFailed(_)))
        ));
        assert_eq!(app.credential_store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let result = coordinator.create_user(&ctx, create_request("owner", None, &[])).await;

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::DuplicateUsername(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_escalation_before_mutation() {
        let app = setup_test_app().await;
        let editor = create_test_user(&app, "editor", "Secret123", Some("admin"), &["users.edit"], false).await;
        let target = create_test_user(&app, "anna", "Secret123", Some("redakteur"), &[], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &editor).await;

        let request = UpdatePermissionsRequest {
            role: Some("redakteur".to_string()),
            custom_permissions: vec!["users.create".to_string()],
        };
        let result = coordinator.update_role_and_permissions(&ctx, target.id, request).await;

        assert!(matches!(
            result,
            Err(InternalError::Authorization(AuthorizationError::Escalation { .. }))
        ));
        let reloaded = app.credential_store.find_user_by_id(target.id).await.unwrap().unwrap();
        assert!(reloaded.custom_permissions.is_empty());
    }

    #[tokio::test]
    async fn test_update_own_permissions_is_denied() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let request = UpdatePermissionsRequest {
            role: None,
            custom_permissions: vec![],
        };
        let result = coordinator.update_role_and_permissions(&ctx, owner.id, request).await;

        assert!(matches!(
            result,
            Err(InternalError::Authorization(AuthorizationError::SelfModification))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_role_and_permissions() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let target = create_test_user(&app, "anna", "Secret123", Some("redakteur"), &[], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let request = UpdatePermissionsRequest {
            role: Some("vereinsverwalter".to_string()),
            custom_permissions: vec!["vereine.edit".to_string(), "vereine.edit".to_string()],
        };
        let updated = coordinator.update_role_and_permissions(&ctx, target.id, request).await.unwrap();

        assert_eq!(updated.role_name.as_deref(), Some("vereinsverwalter"));
        assert_eq!(updated.custom_permissions, vec!["vereine.edit".to_string()]);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &owner).await;

        let request = UpdatePermissionsRequest {
            role: None,
            custom_permissions: vec![],
        };
        let result = coordinator.update_role_and_permissions(&ctx, 999, request).await;

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::UserIdNotFound { user_id: 999 }))
        ));
    }

    #[tokio::test]
    async fn test_reset_password_of_wildcard_holder_requires_wildcard() {
        let app = setup_test_app().await;
        let owner = create_test_user(&app, "owner", "Secret123", Some("super_admin"), &["*"], false).await;
        let editor = create_test_user(&app, "editor", "Secret123", Some("admin"), &["users.edit"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());

        let editor_ctx = context_for(&app, &editor).await;
        assert!(matches!(
            coordinator.reset_password(&editor_ctx, owner.id).await,
            Err(InternalError::Authorization(AuthorizationError::Escalation { .. }))
        ));

        let owner_ctx = context_for(&app, &owner).await;
        let response = coordinator.reset_password(&owner_ctx, editor.id).await.unwrap();
        let reset = app
            .providers
            .authentication_provider
            .verify_credentials("editor", &response.generated_password)
            .await
            .unwrap()
            .unwrap();
        assert!(reset.must_change_password);
    }

    #[tokio::test]
    async fn test_editor_cannot_take_over_higher_ranked_account() {
        let app = setup_test_app().await;
        let chief = create_test_user(&app, "chief", "Secret123", Some("super_admin"), &[], false).await;
        let editor = create_test_user(&app, "editor", "Secret123", Some("redakteur"), &["users.edit"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &editor).await;

        assert!(matches!(
            coordinator.reset_password(&ctx, chief.id).await,
            Err(InternalError::Authorization(AuthorizationError::Escalation { .. }))
        ));
        let still_valid = app
            .providers
            .authentication_provider
            .verify_credentials("chief", "Secret123")
            .await
            .unwrap();
        assert!(still_valid.is_some());

        let demote = UpdatePermissionsRequest {
            role: Some("redakteur".to_string()),
            custom_permissions: vec![],
        };
        assert!(matches!(
            coordinator.update_role_and_permissions(&ctx, chief.id, demote).await,
            Err(InternalError::Authorization(AuthorizationError::Escalation { .. }))
        ));
        let reloaded = app.credential_store.find_user_by_id(chief.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role_name.as_deref(), Some("super_admin"));
    }

    #[tokio::test]
    async fn test_editor_can_manage_account_within_own_permissions() {
        let app = setup_test_app().await;
        let editor = create_test_user(&app, "editor", "Secret123", Some("redakteur"), &["users.edit"], false).await;
        let peer = create_test_user(&app, "peer", "Secret123", Some("redakteur"), &[], false).await;
        let senior = create_test_user(&app, "senior", "Secret123", Some("redakteur"), &["contacts.edit"], false).await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = context_for(&app, &editor).await;

        assert!(coordinator.reset_password(&ctx, peer.id).await.is_ok());

        // A single custom key the editor lacks is enough to refuse
        match coordinator.reset_password(&ctx, senior.id).await {
            Err(InternalError::Authorization(AuthorizationError::Escalation { permission })) => {
                assert_eq!(permission, "contacts.edit");
            }
            other => panic!("Expected Escalation, got {:?}", other.map(|r| r.user_id)),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let app = setup_test_app().await;
        let coordinator = AdminCoordinator::new(app.clone());
        let ctx = RequestContext::for_cli("bootstrap");

        let (user, password) = coordinator.bootstrap(&ctx, "admin").await.unwrap();
        assert_eq!(user.role_name.as_deref(), Some("super_admin"));
        assert!(user.has_wildcard());
        assert!(user.must_change_password);
        assert!(!password.is_empty());

        assert!(matches!(
            coordinator.bootstrap(&ctx, "second").await,
            Err(InternalError::Credential(CredentialError::AlreadyBootstrapped))
        ));
    }

    #[tokio::test]
    async fn test_reset_password_by_username_unknown() {
        let app = setup_test_app().await;
        let coordinator = AdminCoordinator::new(app.clone());

        let result = coordinator
            .reset_password_by_username(&RequestContext::for_cli("reset-password"), "ghost")
            .await;

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::UserNotFound(_)))
        ));
    }
}
