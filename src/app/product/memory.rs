//! 内存产品仓储
//!
//! 所有操作在同一把写锁内完成，相当于串行化事务。

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::error::{ProductError, ProductResult};
use super::model::{Product, ProductId};
use super::repository::{ensure_price, ensure_replaceable, ProductRepository};

#[derive(Default)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    last_id: ProductId,
}

impl Table {
    fn name_taken(&self, name: &str, except: Option<ProductId>) -> bool {
        self.rows
            .values()
            .any(|row| row.name == name && row.id != except)
    }

    fn select(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.rows
            .values()
            .filter(|row| predicate(*row))
            .cloned()
            .collect()
    }
}

/// 进程内产品仓储，用于测试和 `memory` 存储后端
#[derive(Default)]
pub struct MemoryProductRepository {
    table: RwLock<Table>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn insert(&self, candidate: &Product) -> ProductResult<ProductId> {
        info!("Creating {}", candidate.name);
        ensure_price(candidate)?;

        let mut table = self.table.write().await;
        if table.name_taken(&candidate.name, None) {
            error!("Error creating record: {}", candidate);
            return Err(ProductError::DuplicateName(candidate.name.clone()));
        }

        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            Product {
                id: Some(id),
                ..candidate.clone()
            },
        );
        Ok(id)
    }

    async fn get_by_id(&self, id: ProductId) -> ProductResult<Option<Product>> {
        info!("Processing lookup for id {} ...", id);
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn replace(&self, product: &Product) -> ProductResult<Product> {
        info!("Saving {}", product.name);
        let id = ensure_replaceable(product)?;

        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Err(ProductError::NotFound(id));
        }
        if table.name_taken(&product.name, Some(id)) {
            error!("Error updating record: {}", product);
            return Err(ProductError::DuplicateName(product.name.clone()));
        }

        table.rows.insert(id, product.clone());
        Ok(product.clone())
    }

    async fn mark_purchased(&self, id: ProductId) -> ProductResult<Product> {
        info!("Purchasing product with id {}", id);
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or(ProductError::NotFound(id))?;
        if !row.available {
            return Err(ProductError::NotAvailable(id));
        }
        row.available = false;
        Ok(row.clone())
    }

    async fn delete(&self, id: ProductId) -> ProductResult<()> {
        info!("Deleting product with id {}", id);
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ProductError::NotFound(id))
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        info!("Processing all Products");
        Ok(self.table.read().await.select(|_| true))
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Vec<Product>> {
        info!("Processing name query for {} ...", name);
        Ok(self.table.read().await.select(|row| row.name == name))
    }

    async fn find_by_description(&self, fragment: &str) -> ProductResult<Vec<Product>> {
        info!("Processing description query for {} ...", fragment);
        let needle = fragment.to_lowercase();
        Ok(self
            .table
            .read()
            .await
            .select(|row| row.description.to_lowercase().contains(&needle)))
    }

    async fn find_by_price(&self, price: Decimal) -> ProductResult<Vec<Product>> {
        info!("Processing price query for {} ...", price);
        Ok(self.table.read().await.select(|row| row.price == price))
    }

    async fn find_by_availability(&self, available: bool) -> ProductResult<Vec<Product>> {
        info!("Processing available query for {} ...", available);
        Ok(self
            .table
            .read()
            .await
            .select(|row| row.available == available))
    }

    async fn remove_all(&self) -> ProductResult<u64> {
        let mut table = self.table.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        info!("Removed {} products", removed);
        Ok(removed)
    }
}
