use std::sync::Arc;

use poem::web::cookie::CookieJar;
use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};

use crate::api::helpers;
use crate::app_data::AppData;
use crate::coordinators::AdminCoordinator;
use crate::errors::AdminError;
use crate::types::dto::admin::{
    AdminUserDto, CreateUserRequest, CreateUserResponse, PermissionCatalogResponse,
    ResetPasswordResponse, UpdatePermissionsRequest,
};
use crate::types::internal::context::RequestContext;

/// Admin user management API endpoints
pub struct AdminApi {
    app_data: Arc<AppData>,
    admin_coordinator: Arc<AdminCoordinator>,
}

impl AdminApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            admin_coordinator: Arc::new(AdminCoordinator::new(app_data.clone())),
            app_data,
        }
    }

    /// Context for a gated endpoint; callers with a pending password change are rejected
    async fn context(&self, req: &Request, jar: &CookieJar) -> Result<RequestContext, AdminError> {
        helpers::create_request_context(req, jar, &self.app_data.providers.authentication_provider)
            .await
            .map_err(AdminError::from_internal_error)?
            .into_result()
    }
}

/// API tags for admin endpoints
#[derive(Tags)]
enum AdminTags {
    /// Admin user management
    Admin,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// Permission catalog and role defaults
    #[oai(path = "/permissions", method = "get", tag = "AdminTags::Admin")]
    async fn permissions(&self, req: &Request, jar: &CookieJar) -> Result<Json<PermissionCatalogResponse>, AdminError> {
        let ctx = self.context(req, jar).await?;

        let catalog = self
            .admin_coordinator
            .permission_catalog(&ctx)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(catalog))
    }

    /// List admin accounts
    #[oai(path = "/users", method = "get", tag = "AdminTags::Admin")]
    async fn list_users(&self, req: &Request, jar: &CookieJar) -> Result<Json<Vec<AdminUserDto>>, AdminError> {
        let ctx = self.context(req, jar).await?;

        let users = self
            .admin_coordinator
            .list_users(&ctx)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(users))
    }

    /// Provision an admin account
    #[oai(path = "/users", method = "post", tag = "AdminTags::Admin")]
    async fn create_user(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<CreateUserResponse>, AdminError> {
        let ctx = self.context(req, jar).await?;

        let response = self
            .admin_coordinator
            .create_user(&ctx, body.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(response))
    }

    /// Replace role and custom permissions of another admin
    #[oai(path = "/users/:id/permissions", method = "put", tag = "AdminTags::Admin")]
    async fn update_permissions(
        &self,
        req: &Request,
        jar: &CookieJar,
        id: Path<i32>,
        body: Json<UpdatePermissionsRequest>,
    ) -> Result<Json<AdminUserDto>, AdminError> {
        let ctx = self.context(req, jar).await?;

        let user = self
            .admin_coordinator
            .update_role_and_permissions(&ctx, id.0, body.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(user))
    }

    /// Reset another admin's password to a generated one
    #[oai(path = "/users/:id/reset-password", method = "post", tag = "AdminTags::Admin")]
    async fn reset_password(
        &self,
        req: &Request,
        jar: &CookieJar,
        id: Path<i32>,
    ) -> Result<Json<ResetPasswordResponse>, AdminError> {
        let ctx = self.context(req, jar).await?;

        let response = self
            .admin_coordinator
            .reset_password(&ctx, id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(response))
    }
}
