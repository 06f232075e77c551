//! 产品处理器

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::codec::{self, encode};
use super::error::ProductResult;
use super::model::{ProductFilter, ProductId};
use crate::app::AppState;
use crate::core::{error::CoreError, response::Created};

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<String>,
    pub price: Option<String>,
}

impl ProductQuery {
    /// 只取第一个非空参数，优先级：description > name > available > price
    pub fn to_filter(&self) -> ProductResult<ProductFilter> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        if let Some(description) = present(&self.description) {
            info!("Filtering by description: {}", description);
            Ok(ProductFilter::Description(description.to_string()))
        } else if let Some(name) = present(&self.name) {
            info!("Filtering by name: {}", name);
            Ok(ProductFilter::Name(name.to_string()))
        } else if let Some(available) = present(&self.available) {
            info!("Filtering by availability: {}", available);
            Ok(ProductFilter::Availability(codec::parse_availability(available)?))
        } else if let Some(price) = present(&self.price) {
            info!("Filtering by price: {}", price);
            Ok(ProductFilter::Price(codec::parse_price(price)?))
        } else {
            info!("Returning unfiltered list.");
            Ok(ProductFilter::All)
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/purchase", put(purchase_product))
}

pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, CoreError> {
    info!("Request to list Products...");
    let Query(query) = query?;
    let filter = query.to_filter()?;
    let products = state.product_service.list_products(&filter).await?;
    Ok(Json(products.iter().map(encode).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoreError> {
    info!("Request to Retrieve a product with id [{}]", id);
    let product = state.product_service.get_product(&id).await?;
    Ok(Json(encode(&product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Created<Value>, CoreError> {
    info!("Request to Create a Product");
    let Json(payload) = payload?;
    debug!("Payload = {}", payload);

    let product = state.product_service.create_product(&payload).await?;
    let id = product.id.ok_or_else(|| {
        CoreError::InternalServerError("created product has no id".to_string())
    })?;

    Ok(Created {
        location: location(&headers, id),
        body: encode(&product),
    })
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, CoreError> {
    info!("Request to Update a product with id [{}]", id);
    let Json(payload) = payload?;
    debug!("Payload = {}", payload);

    let product = state.product_service.update_product(&id, &payload).await?;
    Ok(Json(encode(&product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
    info!("Request to Delete a product with id [{}]", id);
    state.product_service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purchase_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoreError> {
    info!("Request to Purchase a Product with id [{}]", id);
    let product = state.product_service.purchase(&id).await?;
    Ok(Json(encode(&product)))
}

/// 有 Host 头时返回绝对地址，否则返回相对路径
fn location(headers: &HeaderMap, id: ProductId) -> String {
    let path = format!("/products/{id}");
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{host}{path}"),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::product::error::ProductError;
    use axum::http::HeaderValue;
    use rust_decimal::Decimal;

    fn query(pairs: &[(&str, &str)]) -> ProductQuery {
        let mut query = ProductQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "name" => query.name = value,
                "description" => query.description = value,
                "available" => query.available = value,
                "price" => query.price = value,
                _ => unreachable!(),
            }
        }
        query
    }

    #[test]
    fn test_filter_precedence() {
        let all = query(&[
            ("name", "Hammer"),
            ("description", "steel"),
            ("available", "true"),
            ("price", "9.99"),
        ]);
        assert_eq!(
            all.to_filter().unwrap(),
            ProductFilter::Description("steel".into())
        );

        let no_description = query(&[("name", "Hammer"), ("available", "true"), ("price", "1")]);
        assert_eq!(
            no_description.to_filter().unwrap(),
            ProductFilter::Name("Hammer".into())
        );

        let availability = query(&[("available", "false"), ("price", "1")]);
        assert_eq!(
            availability.to_filter().unwrap(),
            ProductFilter::Availability(false)
        );

        let price = query(&[("price", "9.99"), ("name", "")]);
        assert_eq!(
            price.to_filter().unwrap(),
            ProductFilter::Price(Decimal::new(999, 2))
        );

        assert_eq!(query(&[]).to_filter().unwrap(), ProductFilter::All);
    }

    #[test]
    fn test_filter_rejects_bad_values() {
        assert!(matches!(
            query(&[("available", "perhaps")]).to_filter(),
            Err(ProductError::InvalidType { field: "available", .. })
        ));
        assert!(matches!(
            query(&[("price", "cheap")]).to_filter(),
            Err(ProductError::InvalidType { field: "price", .. })
        ));
    }

    #[test]
    fn test_location() {
        let mut headers = HeaderMap::new();
        assert_eq!(location(&headers, 4), "/products/4");

        headers.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        assert_eq!(location(&headers, 4), "http://localhost:8080/products/4");
    }
}
