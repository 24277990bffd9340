use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::errors::internal::{CredentialError, SessionCodecError};
use crate::errors::InternalError;
use crate::providers::{CryptoProvider, PasswordValidatorProvider, SessionCodec};
use crate::stores::CredentialStore;
use crate::types::internal::{AdminUser, CurrentUser, Session, SessionCookie};

/// Authenticator: credential checks, session issuing and password changes
pub struct AuthenticationProvider {
    store: Arc<dyn CredentialStore>,
    crypto: Arc<CryptoProvider>,
    codec: Arc<SessionCodec>,
    validator: Arc<PasswordValidatorProvider>,
    session_max_age: Duration,
    secure_cookies: bool,
}

impl AuthenticationProvider {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        crypto: Arc<CryptoProvider>,
        codec: Arc<SessionCodec>,
        validator: Arc<PasswordValidatorProvider>,
        session_max_age: Duration,
        secure_cookies: bool,
    ) -> Self {
        Self {
            store,
            crypto,
            codec,
            validator,
            session_max_age,
            secure_cookies,
        }
    }

    pub fn session_max_age(&self) -> Duration {
        self.session_max_age
    }

    /// Check a username/password pair
    ///
    /// Returns `Ok(None)` for an unknown user or a wrong password; both paths run
    /// one Argon2 verification. Errors only on persistence failure.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<AdminUser>, InternalError> {
        match self.store.find_user_by_username(username).await? {
            Some(user) => {
                if self.crypto.verify_password(password, &user.password_hash) {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => {
                self.crypto.verify_dummy(password);
                Ok(None)
            }
        }
    }

    /// Issue a session cookie snapshotting the user's current state
    pub fn create_session(&self, user: &AdminUser) -> Result<SessionCookie, InternalError> {
        let session = Session::for_user(user, Utc::now().timestamp_millis());
        let token = self.codec.encode(&session)?;

        tracing::debug!("Session issued for user {}", user.id);
        Ok(SessionCookie::issue(token, self.session_max_age, self.secure_cookies))
    }

    /// Cookie that removes the session on the client
    pub fn clear_session(&self) -> SessionCookie {
        SessionCookie::removal(self.secure_cookies)
    }

    /// Decode and validate the session carried by `cookie`
    pub fn get_session_data(&self, cookie: Option<&str>) -> Option<Session> {
        self.get_session_data_at(cookie, Utc::now().timestamp_millis())
    }

    /// Like `get_session_data` with an explicit clock (unix milliseconds)
    pub fn get_session_data_at(&self, cookie: Option<&str>, now_ms: i64) -> Option<Session> {
        let token = cookie.filter(|token| !token.is_empty())?;

        let result = self.codec.decode(token).and_then(|session| {
            if session.is_valid_at(now_ms, self.session_max_age) {
                Ok(session)
            } else {
                Err(SessionCodecError::Expired)
            }
        });

        match result {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("Rejected session cookie: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self, cookie: Option<&str>) -> bool {
        self.get_session_data(cookie).is_some()
    }

    /// Live user record behind the session
    ///
    /// `Ok(None)` when the session is invalid or the user no longer exists.
    pub async fn get_current_admin_user(&self, cookie: Option<&str>) -> Result<Option<AdminUser>, InternalError> {
        Ok(self.resolve_caller(cookie).await?.map(|caller| caller.user))
    }

    /// Session plus live user, as attached to a request context
    pub async fn resolve_caller(&self, cookie: Option<&str>) -> Result<Option<CurrentUser>, InternalError> {
        let Some(session) = self.get_session_data(cookie) else {
            return Ok(None);
        };

        match self.store.find_user_by_id(session.user_id).await? {
            Some(user) => Ok(Some(CurrentUser::new(user, session))),
            None => {
                tracing::warn!("Session references missing user {}", session.user_id);
                Ok(None)
            }
        }
    }

    /// Check password strength for `username`
    pub fn validate_password(&self, password: &str, username: &str) -> Result<(), InternalError> {
        self.validator
            .validate(password, Some(username))
            .map_err(|e| CredentialError::PasswordValidationFailed(e.to_string()).into())
    }

    /// Set a new password, clear the must-change flag and re-issue the session
    ///
    /// Strength is validated before anything is written.
    pub async fn change_password(&self, user_id: i32, new_password: &str) -> Result<SessionCookie, InternalError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(CredentialError::UserIdNotFound { user_id })?;

        self.validate_password(new_password, &user.username)?;

        let hash = self.crypto.hash_password(new_password)?;
        self.store.update_password_hash(user_id, &hash, false).await?;

        let updated = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(CredentialError::UserIdNotFound { user_id })?;

        tracing::info!("Password changed for user {}", user_id);
        self.create_session(&updated)
    }

    /// Replace the password with a generated one and force a change on next login
    ///
    /// Returns the plaintext so it can be handed to the user once.
    pub async fn reset_password(&self, user_id: i32) -> Result<String, InternalError> {
        let password = self.validator.generate_secure_password();
        let hash = self.hash_password(&password)?;

        self.store.update_password_hash(user_id, &hash, true).await?;

        tracing::info!("Password reset for user {}", user_id);
        Ok(password)
    }

    /// Hash a password for a new account; validates strength against `username` first
    pub fn hash_new_password(&self, password: &str, username: &str) -> Result<String, InternalError> {
        self.validate_password(password, username)?;
        self.crypto.hash_password(password)
    }

    /// Hash without strength checks; for server-generated passwords
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        self.crypto.hash_password(password)
    }

    pub fn generate_password(&self) -> String {
        self.validator.generate_secure_password()
    }
}
