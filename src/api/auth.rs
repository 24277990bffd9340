use std::sync::Arc;

use poem::web::cookie::CookieJar;
use poem::Request;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::helpers;
use crate::app_data::AppData;
use crate::coordinators::LoginCoordinator;
use crate::errors::AuthError;
use crate::types::dto::auth::{ChangePasswordRequest, LoginRequest, MessageResponse, SessionResponse};

/// Authentication API endpoints (cookie session)
pub struct AuthApi {
    app_data: Arc<AppData>,
    login_coordinator: Arc<LoginCoordinator>,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            login_coordinator: Arc::new(LoginCoordinator::new(app_data.clone())),
            app_data,
        }
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password; sets the `admin-session` cookie
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<LoginRequest>,
    ) -> Result<Json<SessionResponse>, AuthError> {
        let ctx = helpers::create_request_context(req, jar, &self.app_data.providers.authentication_provider)
            .await
            .map_err(AuthError::from_internal_error)?
            .into_context();

        let (session, cookie) = self
            .login_coordinator
            .login(&ctx, &body.username, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        helpers::apply_session_cookie(jar, &cookie);
        Ok(Json(session))
    }

    /// Logout; always clears the cookie, with or without a valid session
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, req: &Request, jar: &CookieJar) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = helpers::create_request_context(req, jar, &self.app_data.providers.authentication_provider)
            .await
            .map_err(AuthError::from_internal_error)?
            .into_context();

        let cookie = self.login_coordinator.logout(&ctx).await;
        helpers::apply_session_cookie(jar, &cookie);

        Ok(Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }))
    }

    /// Current session; reachable while a password change is pending
    #[oai(path = "/session", method = "get", tag = "AuthTags::Authentication")]
    async fn session(&self, req: &Request, jar: &CookieJar) -> Result<Json<SessionResponse>, AuthError> {
        let ctx = helpers::create_request_context(req, jar, &self.app_data.providers.authentication_provider)
            .await
            .map_err(AuthError::from_internal_error)?
            .into_context();

        let session = self
            .login_coordinator
            .current_session(&ctx)
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(session))
    }

    /// Change own password; re-issues the session cookie
    #[oai(path = "/change-password", method = "post", tag = "AuthTags::Authentication")]
    async fn change_password(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        // Allowed while gated
        let ctx = helpers::create_request_context(req, jar, &self.app_data.providers.authentication_provider)
            .await
            .map_err(AuthError::from_internal_error)?
            .into_context();

        let cookie = self
            .login_coordinator
            .change_password(&ctx, &body.current_password, &body.new_password)
            .await
            .map_err(AuthError::from_internal_error)?;

        helpers::apply_session_cookie(jar, &cookie);
        Ok(Json(MessageResponse {
            message: "Password changed successfully".to_string(),
        }))
    }
}
