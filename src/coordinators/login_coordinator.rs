use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::providers::{AuthenticationProvider, AuthorizationProvider};
use crate::types::dto::auth::SessionResponse;
use crate::types::internal::audit::AuditAction;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{PermissionKey, SessionCookie};

/// Login coordinator: session lifecycle for the caller's own account
///
/// Login, logout, reading the current session and changing one's own password.
/// All four stay reachable while the must-change-password gate is active.
pub struct LoginCoordinator {
    authentication_provider: Arc<AuthenticationProvider>,
    authorization_provider: Arc<AuthorizationProvider>,
    audit_logger: Arc<AuditLogger>,
    login_failure_delay: Duration,
}

impl LoginCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            authentication_provider: Arc::clone(&app_data.providers.authentication_provider),
            authorization_provider: Arc::clone(&app_data.providers.authorization_provider),
            audit_logger: Arc::clone(&app_data.audit_logger),
            login_failure_delay: app_data.settings.login_failure_delay,
        }
    }

    /// Orchestrate login
    ///
    /// 1. Verify credentials (unknown user and wrong password are indistinguishable)
    /// 2. On failure: audit, wait out the minimum failure delay, return `InvalidCredentials`
    /// 3. On success: issue the session cookie and audit
    pub async fn login(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
    ) -> Result<(SessionResponse, SessionCookie), InternalError> {
        let started = Instant::now();

        let Some(user) = self.authentication_provider.verify_credentials(username, password).await? else {
            self.audit_logger
                .builder(AuditAction::LoginFailure)
                .with_context(ctx)
                .add_sensitive("attempted_username", username)
                .emit()
                .await;

            tokio::time::sleep_until(started + self.login_failure_delay).await;
            return Err(CredentialError::InvalidCredentials.into());
        };

        let cookie = self.authentication_provider.create_session(&user)?;

        self.audit_logger
            .builder(AuditAction::LoginSuccess)
            .with_context(ctx)
            .actor(&user)
            .add_field("must_change_password", user.must_change_password)
            .emit()
            .await;

        tracing::info!("User {} logged in", user.id);

        let permissions = permission_strings(&self.authorization_provider.effective_permissions(&user));
        Ok((SessionResponse::from_user(&user, permissions), cookie))
    }

    /// Clear the session cookie; audited only when a valid session was presented
    pub async fn logout(&self, ctx: &RequestContext) -> SessionCookie {
        if ctx.is_authenticated() {
            self.audit_logger
                .builder(AuditAction::Logout)
                .with_context(ctx)
                .emit()
                .await;
        }

        self.authentication_provider.clear_session()
    }

    /// Current caller with effective permissions
    pub fn current_session(&self, ctx: &RequestContext) -> Result<SessionResponse, InternalError> {
        let caller = self.authorization_provider.require_session(ctx)?;
        let permissions = permission_strings(&self.authorization_provider.effective_permissions(&caller.user));

        Ok(SessionResponse::from_caller(caller, permissions))
    }

    /// Change the caller's own password
    ///
    /// Verifies `current_password` first; returns the re-issued session cookie
    /// with the must-change flag cleared.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<SessionCookie, InternalError> {
        let caller = self.authorization_provider.require_session(ctx)?;

        if self
            .authentication_provider
            .verify_credentials(caller.username(), current_password)
            .await?
            .is_none()
        {
            return Err(CredentialError::IncorrectPassword.into());
        }

        let cookie = self.authentication_provider.change_password(caller.id(), new_password).await?;

        self.audit_logger
            .builder(AuditAction::PasswordChanged)
            .with_context(ctx)
            .resource("admin_user", caller.id())
            .add_field("was_required", caller.must_change_password())
            .emit()
            .await;

        Ok(cookie)
    }
}

fn permission_strings(keys: &BTreeSet<PermissionKey>) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}
