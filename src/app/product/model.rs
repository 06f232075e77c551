//! 产品数据模型

use rust_decimal::Decimal;
use validator::Validate;

/// 产品主键，由存储层分配
pub type ProductId = i64;

/// 产品记录
///
/// `id` 在创建之前为 `None`；`price` 以两位定点小数保存，线上格式见 `codec`。
#[derive(Debug, Clone, PartialEq, Validate)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Option<ProductId>,
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 250,
        message = "description must be between 1 and 250 characters"
    ))]
    pub description: String,
    pub price: Decimal,
    pub available: bool,
}

impl Product {
    /// 构造一个尚未持久化的产品
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        available: bool,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            price,
            available,
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product {} id=[{}]>", self.name, id),
            None => write!(f, "<Product {} id=[None]>", self.name),
        }
    }
}

/// 列表查询的过滤条件，一次只生效一个
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    Description(String),
    Name(String),
    Availability(bool),
    Price(Decimal),
    All,
}
