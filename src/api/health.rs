use std::sync::Arc;

use chrono::Utc;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::app_data::AppData;
use crate::types::dto::common::HealthResponse;

/// Health check API
pub struct HealthApi {
    app_data: Arc<AppData>,
}

impl HealthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Returns the current status of the API service and whether both
    /// databases answer.
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        let databases_reachable = self.app_data.connections.ping().await;

        Json(HealthResponse {
            status: if databases_reachable { "healthy" } else { "degraded" }.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            databases_reachable,
        })
    }
}
