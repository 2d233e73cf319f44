use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ApiResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::new(HealthStatus { status: "ok" }))
}
