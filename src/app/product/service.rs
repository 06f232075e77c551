//! 产品业务服务

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use super::codec;
use super::error::{ProductError, ProductResult};
use super::model::{Product, ProductFilter};
use super::repository::{parse_id, ProductRepository};

/// 产品服务：解码 → 业务规则 → 仓储
///
/// 不缓存任何产品，每次调用都直接访问仓储。
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, payload))]
    pub async fn create_product(&self, payload: &Value) -> ProductResult<Product> {
        let candidate = codec::decode(payload)?;
        let id = self.repository.insert(&candidate).await?;
        info!("Product with new id [{}] created!", id);
        Ok(Product {
            id: Some(id),
            ..candidate
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, raw_id: &str) -> ProductResult<Product> {
        let id = parse_id(raw_id)?;
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// 整体替换产品字段；路径中的 id 优先于请求体
    #[instrument(skip(self, payload))]
    pub async fn update_product(&self, raw_id: &str, payload: &Value) -> ProductResult<Product> {
        let existing = self.get_product(raw_id).await?;
        let product = Product {
            id: existing.id,
            ..codec::decode(payload)?
        };
        let updated = self.repository.replace(&product).await?;
        info!("Product {} updated.", updated);
        Ok(updated)
    }

    /// 幂等删除：产品不存在时同样视为成功
    #[instrument(skip(self))]
    pub async fn delete_product(&self, raw_id: &str) -> ProductResult<()> {
        let id = parse_id(raw_id)?;
        if self.repository.get_by_id(id).await?.is_some() {
            match self.repository.delete(id).await {
                Ok(()) | Err(ProductError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        info!("Product with id [{}] delete complete.", id);
        Ok(())
    }

    /// 购买：`available` 从 true 变为 false，不存在反向转换
    #[instrument(skip(self))]
    pub async fn purchase(&self, raw_id: &str) -> ProductResult<Product> {
        let id = parse_id(raw_id)?;
        match self.repository.mark_purchased(id).await {
            Ok(purchased) => {
                info!("Product with id [{}] has been purchased!", id);
                Ok(purchased)
            }
            Err(ProductError::NotAvailable(id)) => {
                warn!("Product with id [{}] is not available.", id);
                Err(ProductError::NotAvailable(id))
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let products = self.repository.find(filter).await?;
        info!("[{}] Products returned", products.len());
        Ok(products)
    }

    pub async fn remove_all(&self) -> ProductResult<u64> {
        self.repository.remove_all().await
    }
}
