//! # Product Store
//!
//! 产品目录 REST 服务：
//! - `app` 应用层：产品资源（编解码、仓储、服务、处理器）与系统端点
//! - `core` 核心层：统一错误响应、响应类型、请求日志中间件
//! - `infrastructure` 基础设施层：数据库连接池、日志
//! - `config` TOML 配置与环境变量覆盖

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub use app::AppState;
use crate::app::product::MemoryProductRepository;
use crate::config::{DatabaseConfig, ServerConfig, StorageBackend};
use crate::core::error::CoreError;

/// 组装全部路由与中间件
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .merge(app::system::routes())
        .merge(app::product::handler::routes())
        .fallback(not_found)
        .layer(middleware::from_fn(
            crate::core::middleware::request_logging_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(server.timeout_seconds)))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 按配置选择存储后端并构建共享状态
pub async fn build_state(config: &DatabaseConfig) -> anyhow::Result<AppState> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory product storage");
            Ok(AppState::new(Arc::new(MemoryProductRepository::new())))
        }
        #[cfg(feature = "database")]
        StorageBackend::Postgres => {
            let database = infrastructure::database::DatabaseManager::new(config).await?;
            database.ensure_schema().await?;
            let repository =
                app::product::repository::PgProductRepository::new(database.get_pool().clone());
            Ok(AppState::new(Arc::new(repository)))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Postgres => {
            anyhow::bail!("postgres backend requires the `database` feature")
        }
    }
}

async fn not_found() -> CoreError {
    CoreError::NotFound("The requested resource was not found on this server.".to_string())
}
