//! 产品资源

pub mod codec;
pub mod error;
pub mod handler;
pub mod memory;
pub mod model;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use memory::MemoryProductRepository;
pub use model::{Product, ProductFilter, ProductId};
pub use repository::ProductRepository;
pub use service::ProductService;
