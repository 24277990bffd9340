// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod health;
pub mod helpers;

use std::sync::Arc;

use poem::middleware::CookieJarManager;
use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use health::HealthApi;

use crate::app_data::AppData;

/// Compose the HTTP application
///
/// API under `/api`, Swagger UI under `/swagger`, cookies handled by `CookieJarManager`.
pub fn build_app(app_data: Arc<AppData>, server_url: &str) -> impl Endpoint {
    let api_service = OpenApiService::new(
        (
            HealthApi::new(app_data.clone()),
            AuthApi::new(app_data.clone()),
            AdminApi::new(app_data),
        ),
        "Wendessen Admin API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url);

    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(CookieJarManager::new())
}
