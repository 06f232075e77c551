//! 产品的 JSON 编解码
//!
//! 入站 JSON 先经过结构检查（字段存在与类型），再交给 `validator` 做取值约束。
//! 价格一律按两位小数四舍五入（银行家舍入），出站时渲染为定点字符串。

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationErrors};

use super::error::{ProductError, ProductResult};
use super::model::Product;

/// 价格保留的小数位数
pub const PRICE_SCALE: u32 = 2;

/// 将线上 JSON 解码为尚未分配 id 的产品
///
/// 线上对象中的 `id` 一律忽略。
pub fn decode(value: &Value) -> ProductResult<Product> {
    let object = value.as_object().ok_or(ProductError::InvalidType {
        field: "product",
        expected: "a JSON object",
    })?;

    let name = required_str(object, "name")?;
    let description = required_str(object, "description")?;
    let price = decode_price(required(object, "price")?)?;
    let available = required(object, "available")?
        .as_bool()
        .ok_or(ProductError::InvalidType {
            field: "available",
            expected: "a boolean",
        })?;

    let product = Product::new(name, description, price, available);
    product
        .validate()
        .map_err(|errors| ProductError::InvalidValue(describe(&errors)))?;

    Ok(product)
}

/// 将产品编码为线上 JSON
pub fn encode(product: &Product) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "description": product.description,
        "price": product.price.to_string(),
        "available": product.available,
    })
}

/// 解码价格字段，接受字符串或数字
pub fn decode_price(value: &Value) -> ProductResult<Decimal> {
    let parsed = match value {
        Value::String(text) => parse_decimal(text.trim()),
        Value::Number(number) => parse_decimal(&number.to_string()),
        _ => None,
    };

    parsed.map(round_price).ok_or(ProductError::InvalidType {
        field: "price",
        expected: "a decimal number",
    })
}

/// 解析查询字符串中的价格
pub fn parse_price(text: &str) -> ProductResult<Decimal> {
    decode_price(&Value::String(text.to_string()))
}

/// 解析查询字符串中的布尔值
pub fn parse_availability(text: &str) -> ProductResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ProductError::InvalidType {
            field: "available",
            expected: "a boolean",
        }),
    }
}

/// 四舍五入到两位小数并固定标度，`10` 会变成 `10.00`
pub fn round_price(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp(PRICE_SCALE);
    rounded.rescale(PRICE_SCALE);
    rounded
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> ProductResult<&'a Value> {
    object.get(field).ok_or(ProductError::MissingField(field))
}

fn required_str(object: &Map<String, Value>, field: &'static str) -> ProductResult<String> {
    required(object, field)?
        .as_str()
        .map(str::to_string)
        .ok_or(ProductError::InvalidType {
            field,
            expected: "a string",
        })
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(_, errors)| {
            errors.iter().map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| "Validation error".to_string())
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hammer() -> Value {
        json!({
            "name": "Hammer",
            "description": "Steel hammer",
            "price": "9.99",
            "available": true
        })
    }

    #[test]
    fn test_decode_valid_product() {
        let product = decode(&hammer()).unwrap();
        assert_eq!(product.id, None);
        assert_eq!(product.name, "Hammer");
        assert_eq!(product.description, "Steel hammer");
        assert_eq!(product.price, Decimal::from_str("9.99").unwrap());
        assert!(product.available);
    }

    #[test]
    fn test_decode_ignores_wire_id() {
        let mut body = hammer();
        body["id"] = json!(42);
        let product = decode(&body).unwrap();
        assert_eq!(product.id, None);
    }

    #[test]
    fn test_decode_rounds_numeric_price() {
        let mut body = hammer();
        body["price"] = json!(12.345);
        assert_eq!(decode(&body).unwrap().price.to_string(), "12.34");

        body["price"] = json!(12.355);
        assert_eq!(decode(&body).unwrap().price.to_string(), "12.36");

        body["price"] = json!(10);
        assert_eq!(decode(&body).unwrap().price.to_string(), "10.00");

        body["price"] = json!("3.1");
        assert_eq!(decode(&body).unwrap().price.to_string(), "3.10");
    }

    #[test]
    fn test_decode_missing_field() {
        for field in ["name", "description", "price", "available"] {
            let mut body = hammer();
            body.as_object_mut().unwrap().remove(field);
            match decode(&body) {
                Err(ProductError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_empty_object_reports_first_missing_field() {
        assert!(matches!(
            decode(&json!({})),
            Err(ProductError::MissingField("name"))
        ));
    }

    #[test]
    fn test_decode_available_must_be_boolean() {
        let mut body = hammer();
        body["available"] = json!("True");
        assert!(matches!(
            decode(&body),
            Err(ProductError::InvalidType { field: "available", .. })
        ));
    }

    #[test]
    fn test_decode_malformed_price() {
        for bad in [json!("nine dollars"), json!(true), json!(null), json!([1])] {
            let mut body = hammer();
            body["price"] = bad;
            assert!(matches!(
                decode(&body),
                Err(ProductError::InvalidType { field: "price", .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_non_object() {
        for bad in [json!("product"), json!([1, 2]), json!(null), json!(7)] {
            assert!(matches!(
                decode(&bad),
                Err(ProductError::InvalidType { field: "product", .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_empty_and_long_text() {
        let mut body = hammer();
        body["name"] = json!("");
        match decode(&body) {
            Err(ProductError::InvalidValue(msg)) => assert!(msg.contains("name")),
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        let mut body = hammer();
        body["description"] = json!("x".repeat(251));
        assert!(matches!(decode(&body), Err(ProductError::InvalidValue(_))));
    }

    #[test]
    fn test_encode_renders_price_as_string() {
        let mut product = decode(&hammer()).unwrap();
        product.id = Some(7);
        let value = encode(&product);
        assert_eq!(value["id"], 7);
        assert_eq!(value["price"], "9.99");
        assert_eq!(value["available"], true);
    }

    #[test]
    fn test_encode_then_decode_preserves_fields() {
        let mut product = Product::new("Saw", "Hand saw", Decimal::new(1450, 2), false);
        product.id = Some(3);
        let decoded = decode(&encode(&product)).unwrap();
        assert_eq!(decoded, Product { id: None, ..product });
    }

    #[test]
    fn test_parse_availability() {
        assert!(parse_availability("true").unwrap());
        assert!(parse_availability("Yes").unwrap());
        assert!(!parse_availability("false").unwrap());
        assert!(!parse_availability("0").unwrap());
        assert!(parse_availability("maybe").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("4.5").unwrap().to_string(), "4.50");
        assert!(parse_price("four").is_err());
    }
}
