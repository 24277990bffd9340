use poem::web::cookie::CookieJar;
use poem::Request;

use crate::errors::InternalError;
use crate::providers::AuthenticationProvider;
use crate::types::internal::context::{ContextResult, RequestContext};
use crate::types::internal::{SessionCookie, SESSION_COOKIE_NAME};

/// Session token carried by the request, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value_str().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the request context once per request
///
/// A missing, expired or forged cookie yields an anonymous context; the
/// permission gate turns that into `Unauthorized`. When the caller must change
/// their password the context is wrapped in `PasswordChangeRequired` so only
/// endpoints that opt in via `into_context()` can use it.
///
/// # Errors
/// Only persistence failures while loading the live user record.
pub async fn create_request_context(
    req: &Request,
    jar: &CookieJar,
    authentication_provider: &AuthenticationProvider,
) -> Result<ContextResult, InternalError> {
    let ctx = RequestContext::for_request(req);
    let token = session_token(jar);

    match authentication_provider.resolve_caller(token.as_deref()).await? {
        Some(caller) => {
            let must_change = caller.must_change_password();
            let ctx = ctx.with_caller(caller);
            tracing::debug!(request_id = %ctx.request_id, "Request by user {}", ctx.actor_id);

            if must_change {
                Ok(ContextResult::PasswordChangeRequired(ctx))
            } else {
                Ok(ContextResult::Ok(ctx))
            }
        }
        None => Ok(ContextResult::Ok(ctx)),
    }
}

/// Queue the cookie on the jar; `CookieJarManager` writes it as `Set-Cookie`
pub fn apply_session_cookie(jar: &CookieJar, cookie: &SessionCookie) {
    jar.add(cookie.to_cookie());
}
