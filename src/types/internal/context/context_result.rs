use crate::errors::internal::AuthorizationError;

use super::request_context::RequestContext;

/// Result of resolving a request context, carrying the context in both cases
pub enum ContextResult {
    /// Context created successfully, no password change required
    Ok(RequestContext),
    /// Password change required - context is included so allowed endpoints can extract it
    PasswordChangeRequired(RequestContext),
}

impl ContextResult {
    /// Convert to Result, mapping PasswordChangeRequired to an error
    ///
    /// Most endpoints should use this to reject callers that must change their password.
    pub fn into_result<E: From<AuthorizationError>>(self) -> Result<RequestContext, E> {
        match self {
            ContextResult::Ok(ctx) => Ok(ctx),
            ContextResult::PasswordChangeRequired(_) => {
                Err(E::from(AuthorizationError::PasswordChangeRequired))
            }
        }
    }

    /// Extract the context regardless of whether password change is required
    ///
    /// Only for endpoints reachable while gated (/auth/change-password, /auth/session, /auth/logout).
    pub fn into_context(self) -> RequestContext {
        match self {
            ContextResult::Ok(ctx) => ctx,
            ContextResult::PasswordChangeRequired(ctx) => ctx,
        }
    }
}
