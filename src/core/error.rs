//! 核心错误处理模块

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::app::product::error::ProductError;

/// 核心错误类型
#[derive(Debug)]
pub enum CoreError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    InternalServerError(String),
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            CoreError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, user_message) = match self {
            CoreError::BadRequest(msg) => ("BAD_REQUEST", msg),
            CoreError::NotFound(msg) => ("NOT_FOUND", msg),
            CoreError::Conflict(msg) => ("CONFLICT", msg),
            CoreError::PayloadTooLarge(msg) => ("PAYLOAD_TOO_LARGE", msg),
            CoreError::UnsupportedMediaType(msg) => ("UNSUPPORTED_MEDIA_TYPE", msg),
            CoreError::InternalServerError(msg) => ("INTERNAL_SERVER_ERROR", msg),
        };

        let error_response = ErrorResponse {
            error: error_message.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

impl From<ProductError> for CoreError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound(_) => {
                error!("{}", message);
                CoreError::NotFound(message)
            }
            ProductError::NotAvailable(_) => {
                error!("{}", message);
                CoreError::Conflict(message)
            }
            ProductError::Storage(source) => {
                error!("Database error: {}", source);
                CoreError::InternalServerError("Database error".to_string())
            }
            _ => {
                warn!("{}", message);
                CoreError::BadRequest(message)
            }
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => CoreError::UnsupportedMediaType(
                "Content-Type must be application/json".to_string(),
            ),
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                warn!("{}", other.body_text());
                CoreError::PayloadTooLarge(other.body_text())
            }
            other => CoreError::BadRequest(other.body_text()),
        }
    }
}

/// 查询字符串无法解析时同样返回 JSON 错误体
impl From<QueryRejection> for CoreError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("{}", rejection.body_text());
        CoreError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_error_status_mapping() {
        let cases = [
            (ProductError::MissingField("name"), StatusCode::BAD_REQUEST),
            (ProductError::InvalidPrice, StatusCode::BAD_REQUEST),
            (ProductError::DuplicateName("Hammer".into()), StatusCode::BAD_REQUEST),
            (ProductError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (ProductError::InvalidState, StatusCode::BAD_REQUEST),
            (ProductError::NotFound(1), StatusCode::NOT_FOUND),
            (ProductError::NotAvailable(1), StatusCode::CONFLICT),
            (ProductError::Storage("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(CoreError::from(err).status(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        match CoreError::from(ProductError::NotFound(0)) {
            CoreError::NotFound(msg) => assert!(msg.contains("was not found")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejection_variants_keep_their_status() {
        assert_eq!(
            CoreError::PayloadTooLarge("too big".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            CoreError::UnsupportedMediaType("json".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }
}
