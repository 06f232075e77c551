//! 产品仓储
//!
//! 每个方法都是一个独立事务：要么整体提交，要么整体回滚。

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::{ProductError, ProductResult};
use super::model::{Product, ProductFilter, ProductId};

/// 产品持久化接口
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 插入新产品并返回分配的 id，名称重复时返回 `DuplicateName`
    async fn insert(&self, candidate: &Product) -> ProductResult<ProductId>;

    /// 按 id 查找，不存在时返回 `None`
    async fn get_by_id(&self, id: ProductId) -> ProductResult<Option<Product>>;

    /// 用 `product` 的字段整体覆盖同 id 的行
    async fn replace(&self, product: &Product) -> ProductResult<Product>;

    /// 在同一事务内把可售产品标记为已售出
    ///
    /// 行不存在返回 `NotFound`，已售出返回 `NotAvailable`。
    async fn mark_purchased(&self, id: ProductId) -> ProductResult<Product>;

    /// 严格删除：行不存在时返回 `NotFound`
    async fn delete(&self, id: ProductId) -> ProductResult<()>;

    async fn list(&self) -> ProductResult<Vec<Product>>;

    async fn find_by_name(&self, name: &str) -> ProductResult<Vec<Product>>;

    /// 描述包含 `fragment`（不区分大小写）
    async fn find_by_description(&self, fragment: &str) -> ProductResult<Vec<Product>>;

    async fn find_by_price(&self, price: Decimal) -> ProductResult<Vec<Product>>;

    async fn find_by_availability(&self, available: bool) -> ProductResult<Vec<Product>>;

    /// 清空所有产品，返回删除的行数；已用过的 id 不会被复用
    async fn remove_all(&self) -> ProductResult<u64>;

    /// 按单个过滤条件查询
    async fn find(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        match filter {
            ProductFilter::Description(fragment) => self.find_by_description(fragment).await,
            ProductFilter::Name(name) => self.find_by_name(name).await,
            ProductFilter::Availability(available) => self.find_by_availability(*available).await,
            ProductFilter::Price(price) => self.find_by_price(*price).await,
            ProductFilter::All => self.list().await,
        }
    }
}

/// 将路径中的 id 转换为整数
pub fn parse_id(raw: &str) -> ProductResult<ProductId> {
    raw.trim()
        .parse::<ProductId>()
        .map_err(|_| ProductError::InvalidIdentifier(raw.to_string()))
}

/// 写入前的业务检查，返回待写入行的 id
pub(crate) fn ensure_replaceable(product: &Product) -> ProductResult<ProductId> {
    let id = product.id.ok_or(ProductError::InvalidState)?;
    ensure_price(product)?;
    Ok(id)
}

/// 价格上限，与 `price NUMERIC(14, 2)` 列可容纳的最大值一致
pub fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

pub(crate) fn ensure_price(product: &Product) -> ProductResult<()> {
    if product.price < Decimal::ZERO {
        return Err(ProductError::InvalidPrice);
    }
    if product.price > max_price() {
        return Err(ProductError::InvalidValue(format!(
            "price must not exceed {}",
            max_price()
        )));
    }
    Ok(())
}

#[cfg(feature = "database")]
pub use postgres::PgProductRepository;

#[cfg(feature = "database")]
mod postgres {
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use sqlx::postgres::{PgArguments, PgPool};
    use sqlx::query::QueryAs;
    use sqlx::Postgres;
    use tracing::{error, info};

    use super::{ensure_price, ensure_replaceable, ProductRepository};
    use crate::app::product::error::{ProductError, ProductResult};
    use crate::app::product::model::{Product, ProductId};

    const COLUMNS: &str = "id, name, description, price, available";

    /// 基于 PostgreSQL 的产品仓储
    #[derive(Clone)]
    pub struct PgProductRepository {
        pool: PgPool,
    }

    impl PgProductRepository {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }

        async fn fetch_all<'q>(
            &self,
            query: QueryAs<'q, Postgres, Product, PgArguments>,
        ) -> ProductResult<Vec<Product>> {
            let mut tx = self.pool.begin().await?;
            let products = query.fetch_all(&mut *tx).await?;
            tx.commit().await?;
            Ok(products)
        }
    }

    fn select_sql(clause: &str) -> String {
        format!("SELECT {COLUMNS} FROM products {clause} ORDER BY id")
    }

    fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
    }

    /// `ILIKE` 模式中的通配符需要转义
    fn like_pattern(fragment: &str) -> String {
        let escaped = fragment
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    #[async_trait]
    impl ProductRepository for PgProductRepository {
        async fn insert(&self, candidate: &Product) -> ProductResult<ProductId> {
            info!("Creating {}", candidate.name);
            ensure_price(candidate)?;

            let mut tx = self.pool.begin().await?;
            let inserted = sqlx::query_scalar::<_, ProductId>(
                "INSERT INTO products (name, description, price, available) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(&candidate.name)
            .bind(&candidate.description)
            .bind(candidate.price)
            .bind(candidate.available)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(id) => {
                    tx.commit().await?;
                    Ok(id)
                }
                Err(err) if is_unique_violation(&err) => {
                    tx.rollback().await?;
                    error!("Error creating record: {}", candidate);
                    Err(ProductError::DuplicateName(candidate.name.clone()))
                }
                Err(err) => Err(err.into()),
            }
        }

        async fn get_by_id(&self, id: ProductId) -> ProductResult<Option<Product>> {
            info!("Processing lookup for id {} ...", id);
            let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
            let mut tx = self.pool.begin().await?;
            let product = sqlx::query_as::<_, Product>(&sql)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(product)
        }

        async fn replace(&self, product: &Product) -> ProductResult<Product> {
            info!("Saving {}", product.name);
            let id = ensure_replaceable(product)?;

            let sql = format!(
                "UPDATE products SET name = $1, description = $2, price = $3, available = $4 \
                 WHERE id = $5 RETURNING {COLUMNS}"
            );
            let mut tx = self.pool.begin().await?;
            let updated = sqlx::query_as::<_, Product>(&sql)
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price)
                .bind(product.available)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await;

            match updated {
                Ok(Some(row)) => {
                    tx.commit().await?;
                    Ok(row)
                }
                Ok(None) => {
                    tx.rollback().await?;
                    Err(ProductError::NotFound(id))
                }
                Err(err) if is_unique_violation(&err) => {
                    tx.rollback().await?;
                    error!("Error updating record: {}", product);
                    Err(ProductError::DuplicateName(product.name.clone()))
                }
                Err(err) => {
                    tx.rollback().await?;
                    error!("Error updating record: {}: {}", product, err);
                    Err(ProductError::DataValidation(format!(
                        "Error updating product with id [{id}]"
                    )))
                }
            }
        }

        async fn mark_purchased(&self, id: ProductId) -> ProductResult<Product> {
            info!("Purchasing product with id {}", id);
            let sql = format!(
                "UPDATE products SET available = FALSE \
                 WHERE id = $1 AND available RETURNING {COLUMNS}"
            );
            let mut tx = self.pool.begin().await?;
            let purchased = sqlx::query_as::<_, Product>(&sql)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

            match purchased {
                Some(row) => {
                    tx.commit().await?;
                    Ok(row)
                }
                None => {
                    let exists = sqlx::query_scalar::<_, bool>(
                        "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)",
                    )
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
                    tx.rollback().await?;
                    if exists {
                        Err(ProductError::NotAvailable(id))
                    } else {
                        Err(ProductError::NotFound(id))
                    }
                }
            }
        }

        async fn delete(&self, id: ProductId) -> ProductResult<()> {
            info!("Deleting product with id {}", id);
            let mut tx = self.pool.begin().await?;
            let result = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    tx.rollback().await?;
                    Err(ProductError::NotFound(id))
                }
                Ok(_) => {
                    tx.commit().await?;
                    Ok(())
                }
                Err(err) => {
                    tx.rollback().await?;
                    error!("Error deleting record with id {}: {}", id, err);
                    Err(ProductError::DataValidation(format!(
                        "Error deleting product with id [{id}]"
                    )))
                }
            }
        }

        async fn list(&self) -> ProductResult<Vec<Product>> {
            info!("Processing all Products");
            let sql = select_sql("");
            self.fetch_all(sqlx::query_as(&sql)).await
        }

        async fn find_by_name(&self, name: &str) -> ProductResult<Vec<Product>> {
            info!("Processing name query for {} ...", name);
            let sql = select_sql("WHERE name = $1");
            self.fetch_all(sqlx::query_as(&sql).bind(name)).await
        }

        async fn find_by_description(&self, fragment: &str) -> ProductResult<Vec<Product>> {
            info!("Processing description query for {} ...", fragment);
            let sql = select_sql("WHERE description ILIKE $1 ESCAPE '\\'");
            self.fetch_all(sqlx::query_as(&sql).bind(like_pattern(fragment)))
                .await
        }

        async fn find_by_price(&self, price: Decimal) -> ProductResult<Vec<Product>> {
            info!("Processing price query for {} ...", price);
            let sql = select_sql("WHERE price = $1");
            self.fetch_all(sqlx::query_as(&sql).bind(price)).await
        }

        async fn find_by_availability(&self, available: bool) -> ProductResult<Vec<Product>> {
            info!("Processing available query for {} ...", available);
            let sql = select_sql("WHERE available = $1");
            self.fetch_all(sqlx::query_as(&sql).bind(available)).await
        }

        async fn remove_all(&self) -> ProductResult<u64> {
            let mut tx = self.pool.begin().await?;
            let done = sqlx::query("DELETE FROM products")
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            info!("Removed {} products", done.rows_affected());
            Ok(done.rows_affected())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::like_pattern;

        #[test]
        fn test_like_pattern_escapes_wildcards() {
            assert_eq!(like_pattern("steel"), "%steel%");
            assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        }
    }
}
