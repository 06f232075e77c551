//! 应用层

pub mod product;
pub mod system;

use std::sync::Arc;

use product::{ProductRepository, ProductService};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

impl AppState {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self {
            product_service: ProductService::new(repository),
        }
    }
}
