//! 服务描述与健康检查

use axum::{response::Json, routing::get, Router};

use crate::app::AppState;
use crate::core::response::{HealthStatus, ServiceInfo};

pub const SERVICE_NAME: &str = "Product Demo REST API Service";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: "1.0".to_string(),
        paths: "/products".to_string(),
    })
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}
