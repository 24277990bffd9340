use std::collections::BTreeSet;
use std::future::Future;

use crate::errors::internal::AuthorizationError;
use crate::providers::PermissionCatalog;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AdminUser, CurrentUser, PermissionKey};

/// Authorizer: permission checks against role defaults and custom grants
///
/// Stateless apart from the static catalog. Checks always run against the
/// live user attached to the request context, so role and permission changes
/// apply on the next request without a new login.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationProvider {
    catalog: PermissionCatalog,
}

impl AuthorizationProvider {
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Whether `user` holds `key`
    ///
    /// Order: no user denies, `*` allows, a verbatim custom key allows, then
    /// membership in the role's default set.
    pub fn has_permission(&self, user: Option<&AdminUser>, key: &PermissionKey) -> bool {
        let Some(user) = user else {
            return false;
        };

        if user.has_wildcard() || user.custom_permissions.contains(key) {
            return true;
        }

        user.role_name
            .as_deref()
            .map(|role| self.catalog.get_role_default_permissions(role).contains(key))
            .unwrap_or(false)
    }

    pub fn get_role_default_permissions(&self, role_name: &str) -> BTreeSet<PermissionKey> {
        self.catalog.get_role_default_permissions(role_name)
    }

    /// Every catalog key the user holds, as reported to the front-end
    pub fn effective_permissions(&self, user: &AdminUser) -> BTreeSet<PermissionKey> {
        if user.has_wildcard() {
            return self.catalog.all().iter().map(|p| p.key.clone()).collect();
        }

        let mut permissions = user
            .role_name
            .as_deref()
            .map(|role| self.catalog.get_role_default_permissions(role))
            .unwrap_or_default();
        permissions.extend(user.custom_permissions.iter().cloned());
        permissions
    }

    /// Authenticated caller without the password-change gate
    ///
    /// Only for the endpoints a gated caller may still reach.
    pub fn require_session<'a>(&self, ctx: &'a RequestContext) -> Result<&'a CurrentUser, AuthorizationError> {
        ctx.caller().ok_or(AuthorizationError::Unauthorized)
    }

    /// Gate for privileged work
    ///
    /// # Errors
    /// * `Unauthorized` - no valid session
    /// * `PasswordChangeRequired` - caller must change their password first
    /// * `Forbidden` - caller lacks `key`
    pub fn require_permission<'a>(
        &self,
        ctx: &'a RequestContext,
        key: &PermissionKey,
    ) -> Result<&'a CurrentUser, AuthorizationError> {
        let caller = self.require_session(ctx)?;

        if caller.must_change_password() {
            tracing::debug!("User {} deflected to password change", caller.id());
            return Err(AuthorizationError::PasswordChangeRequired);
        }

        if !self.has_permission(Some(&caller.user), key) {
            tracing::warn!(
                request_id = %ctx.request_id,
                "User {} denied: missing permission {}",
                caller.id(),
                key
            );
            return Err(AuthorizationError::Forbidden {
                permission: key.to_string(),
            });
        }

        Ok(caller)
    }

    /// Run `action` only after `require_permission` passes
    ///
    /// Gate failures are converted into the caller's error type; the action is
    /// never polled when the gate fails.
    pub async fn with_permission<'a, T, E, F, Fut>(
        &self,
        ctx: &'a RequestContext,
        key: &PermissionKey,
        action: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&'a CurrentUser) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthorizationError>,
    {
        let caller = self.require_permission(ctx, key)?;
        action(caller).await
    }

    /// Check that `actor` may assign `role_name` and `custom_permissions`
    ///
    /// `target_id` is `None` when the target account does not exist yet.
    ///
    /// # Errors
    /// * `SelfModification` - actor targets their own account
    /// * `UnknownRole` / `UnknownPermission` - not in the catalog
    /// * `Escalation` - actor would grant something they do not hold
    pub fn check_grant(
        &self,
        actor: &AdminUser,
        target_id: Option<i32>,
        role_name: Option<&str>,
        custom_permissions: &[PermissionKey],
    ) -> Result<(), AuthorizationError> {
        if target_id == Some(actor.id) {
            return Err(AuthorizationError::SelfModification);
        }

        if let Some(role_name) = role_name {
            if self.catalog.role(role_name).is_none() {
                return Err(AuthorizationError::UnknownRole(role_name.to_string()));
            }
            for key in self.catalog.get_role_default_permissions(role_name) {
                if !self.has_permission(Some(actor), &key) {
                    return Err(AuthorizationError::Escalation {
                        permission: key.to_string(),
                    });
                }
            }
        }

        for key in custom_permissions {
            if key.is_wildcard() {
                if !actor.has_wildcard() {
                    return Err(AuthorizationError::Escalation {
                        permission: key.to_string(),
                    });
                }
                continue;
            }
            if !self.catalog.contains(key) {
                return Err(AuthorizationError::UnknownPermission(key.to_string()));
            }
            if !self.has_permission(Some(actor), key) {
                return Err(AuthorizationError::Escalation {
                    permission: key.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::Session;

    fn user(id: i32, role: Option<&str>, custom: &[&str]) -> AdminUser {
        AdminUser {
            id,
            username: format!("user{}", id),
            password_hash: String::new(),
            role_id: None,
            role_name: role.map(str::to_string),
            role_display_name: None,
            custom_permissions: custom.iter().map(|k| PermissionKey::parse(k).unwrap()).collect(),
            verein_id: None,
            must_change_password: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ctx_for(user: AdminUser, session_must_change: bool) -> RequestContext {
        let mut session = Session::for_user(&user, 0);
        session.must_change_password = session_must_change;
        RequestContext::for_system("test").with_caller(CurrentUser::new(user, session))
    }

    fn key(raw: &'static str) -> PermissionKey {
        PermissionKey::from_static(raw)
    }

    fn authorizer() -> AuthorizationProvider {
        AuthorizationProvider::new(PermissionCatalog::new())
    }

    #[test]
    fn test_no_user_is_denied() {
        assert!(!authorizer().has_permission(None, &key("news.view")));
    }

    #[test]
    fn test_wildcard_allows_anything() {
        let authz = authorizer();
        let owner = user(1, None, &["*"]);

        assert!(authz.has_permission(Some(&owner), &key("users.edit")));
        assert!(authz.has_permission(Some(&owner), &key("anything.at_all")));
    }

    #[test]
    fn test_custom_key_is_exact() {
        let authz = authorizer();
        let u = user(2, None, &["vereine.edit"]);

        assert!(authz.has_permission(Some(&u), &key("vereine.edit")));
        assert!(!authz.has_permission(Some(&u), &key("vereine.view")));
    }

    #[test]
    fn test_role_defaults_apply() {
        let authz = authorizer();
        let u = user(3, Some("vereinsverwalter"), &[]);

        assert!(authz.has_permission(Some(&u), &key("gallery.delete")));
        assert!(authz.has_permission(Some(&u), &key("news.delete")));
        assert!(!authz.has_permission(Some(&u), &key("events.delete")));
        assert!(!authz.has_permission(Some(&u), &key("users.view")));
    }

    #[test]
    fn test_unknown_role_grants_nothing() {
        let u = user(4, Some("owner"), &[]);
        assert!(!authorizer().has_permission(Some(&u), &key("news.view")));
    }

    #[test]
    fn test_permission_union_property() {
        let authz = authorizer();
        let catalog = PermissionCatalog::new();
        let keys: Vec<&str> = catalog.all().iter().map(|p| p.key.as_str()).collect();
        let off_catalog = "news.publish";

        let mut custom_sets: Vec<Vec<&str>> = vec![Vec::new(), vec![off_catalog]];
        for (i, k) in keys.iter().enumerate() {
            custom_sets.push(vec![*k]);
            custom_sets.push(vec![*k, keys[(i + 1) % keys.len()]]);
            custom_sets.push(vec![*k, keys[(i + keys.len() / 2) % keys.len()]]);
        }
        let with_wildcard: Vec<Vec<&str>> = custom_sets
            .iter()
            .map(|set| set.iter().copied().chain(["*"]).collect())
            .collect();
        custom_sets.extend(with_wildcard);

        let roles = [
            None,
            Some("super_admin"),
            Some("admin"),
            Some("redakteur"),
            Some("vereinsverwalter"),
            Some("owner"),
        ];
        let checked_keys: Vec<PermissionKey> = catalog
            .all()
            .iter()
            .map(|p| p.key.clone())
            .chain([key(off_catalog)])
            .collect();

        for role in roles {
            let defaults = role
                .map(|r| catalog.get_role_default_permissions(r))
                .unwrap_or_default();

            for custom in &custom_sets {
                let u = user(5, role, custom);
                let wildcard = custom.contains(&"*");

                for k in &checked_keys {
                    let expected = wildcard || defaults.contains(k) || custom.contains(&k.as_str());
                    assert_eq!(
                        authz.has_permission(Some(&u), k),
                        expected,
                        "role {:?} / custom {:?} / {}",
                        role,
                        custom,
                        k
                    );
                }
            }
        }
    }

    #[test]
    fn test_effective_permissions_union() {
        let authz = authorizer();
        let u = user(6, Some("redakteur"), &["vereine.edit"]);
        let effective = authz.effective_permissions(&u);

        assert!(effective.contains(&key("vereine.edit")));
        assert!(effective.contains(&key("news.create")));
        assert!(!effective.contains(&key("users.view")));

        let owner = user(1, None, &["*"]);
        assert_eq!(authz.effective_permissions(&owner).len(), PermissionCatalog::new().all().len());
    }

    #[test]
    fn test_require_permission_outcomes() {
        let authz = authorizer();

        let anonymous = RequestContext::for_system("test");
        assert_eq!(
            authz.require_permission(&anonymous, &key("news.view")).map(|c| c.id()),
            Err(AuthorizationError::Unauthorized)
        );

        let ctx = ctx_for(user(7, Some("redakteur"), &[]), false);
        assert_eq!(authz.require_permission(&ctx, &key("news.view")).map(|c| c.id()), Ok(7));
        assert_eq!(
            authz.require_permission(&ctx, &key("users.view")).map(|c| c.id()),
            Err(AuthorizationError::Forbidden {
                permission: "users.view".to_string()
            })
        );
    }

    #[test]
    fn test_must_change_deflects_even_with_permission() {
        let authz = authorizer();

        let from_session = ctx_for(user(8, None, &["*"]), true);
        assert_eq!(
            authz.require_permission(&from_session, &key("news.view")).map(|c| c.id()),
            Err(AuthorizationError::PasswordChangeRequired)
        );

        let mut flagged = user(9, None, &["*"]);
        flagged.must_change_password = true;
        let from_record = ctx_for(flagged, false);
        assert_eq!(
            authz.require_permission(&from_record, &key("news.view")).map(|c| c.id()),
            Err(AuthorizationError::PasswordChangeRequired)
        );

        // The session gate alone still lets the caller through
        assert!(authz.require_session(&from_record).is_ok());
    }

    #[tokio::test]
    async fn test_with_permission_skips_action_on_failure() {
        let authz = authorizer();
        let ctx = ctx_for(user(10, Some("redakteur"), &[]), false);
        let mut ran = false;

        let result: Result<(), AuthorizationError> = authz
            .with_permission(&ctx, &key("users.edit"), |_| {
                ran = true;
                async { Ok(()) }
            })
            .await;

        assert!(result.is_err());
        assert!(!ran);

        let id = authz
            .with_permission(&ctx, &key("news.edit"), |caller| async move {
                Ok::<_, AuthorizationError>(caller.id())
            })
            .await;
        assert_eq!(id, Ok(10));
    }

    #[test]
    fn test_check_grant_rejects_self_modification() {
        let actor = user(1, None, &["*"]);
        assert_eq!(
            authorizer().check_grant(&actor, Some(1), Some("admin"), &[]),
            Err(AuthorizationError::SelfModification)
        );
    }

    #[test]
    fn test_check_grant_rejects_escalation() {
        let authz = authorizer();
        let actor = user(2, Some("admin"), &["users.edit"]);

        assert!(authz.check_grant(&actor, Some(3), Some("redakteur"), &[key("vereine.edit")]).is_ok());
        assert_eq!(
            authz.check_grant(&actor, Some(3), Some("super_admin"), &[]),
            Err(AuthorizationError::Escalation {
                permission: "users.create".to_string()
            })
        );
        assert_eq!(
            authz.check_grant(&actor, Some(3), None, &[key("users.create")]),
            Err(AuthorizationError::Escalation {
                permission: "users.create".to_string()
            })
        );
        assert_eq!(
            authz.check_grant(&actor, Some(3), None, &[PermissionKey::WILDCARD]),
            Err(AuthorizationError::Escalation {
                permission: "*".to_string()
            })
        );
    }

    #[test]
    fn test_check_grant_rejects_unknown_entries() {
        let authz = authorizer();
        let actor = user(1, None, &["*"]);

        assert_eq!(
            authz.check_grant(&actor, None, Some("owner"), &[]),
            Err(AuthorizationError::UnknownRole("owner".to_string()))
        );
        assert_eq!(
            authz.check_grant(&actor, None, None, &[key("news.publish")]),
            Err(AuthorizationError::UnknownPermission("news.publish".to_string()))
        );
        assert!(authz.check_grant(&actor, None, Some("super_admin"), &[PermissionKey::WILDCARD]).is_ok());
    }
}
