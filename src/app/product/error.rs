//! 产品领域错误

use super::model::ProductId;

/// 产品操作的错误类型
///
/// 每个变体对应一个稳定的 HTTP 状态码，映射见 `crate::core::error`。
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Error: Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid type for [{field}]: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Product with the same name already exists: {0}")]
    DuplicateName(String),

    #[error("Price must be a positive number")]
    InvalidPrice,

    #[error("Invalid ID type [{0}]. ID must be an integer.")]
    InvalidIdentifier(String),

    #[error("Product with id '{0}' was not found.")]
    NotFound(ProductId),

    #[error("Product with id [{0}] is not available.")]
    NotAvailable(ProductId),

    #[error("ID field cannot be empty")]
    InvalidState,

    #[error("{0}")]
    DataValidation(String),

    /// 底层存储错误，细节只写日志，不返回给客户端
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

#[cfg(feature = "database")]
impl From<sqlx::Error> for ProductError {
    fn from(err: sqlx::Error) -> Self {
        ProductError::Storage(err.to_string())
    }
}
