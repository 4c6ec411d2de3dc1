//! Normalization of remote product records.
//!
//! Product sources do not agree on field names or types. [`RawProduct`]
//! accepts any JSON object and [`normalize_product`] maps it onto
//! [`Product`] using first-present-wins fallback chains:
//!
//! | Field       | Chain                                       |
//! |-------------|---------------------------------------------|
//! | id          | `id` (number or numeric string), required   |
//! | title       | `title`, `name`, `"Untitled"`               |
//! | price       | `price` coerced to a number, else 0         |
//! | description | `description`, `summary`, `""`              |
//! | image       | `image`, `img`, `thumbnail`, `""`           |
//! | category    | `category`, `"uncategorized"`               |
//! | seller      | `agent`, `seller`, `"Seller"`               |
//! | rating      | `rating.rate` and `rating.count`, optional  |
//! | baths       | `baths`, else random 1..=3                  |
//! | beds        | `beds`, else random 1..=5                   |
//! | area        | `area`, else random 200..=2199              |
//!
//! A field counts as present when it is not `null`, so an empty string wins
//! over the next link in the chain.

use std::str::FromStr;

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::product::{Filled, ListingDetails, Product, Rating};
use crate::types::{Price, ProductId};

const UNTITLED: &str = "Untitled";
const UNCATEGORIZED: &str = "uncategorized";
const DEFAULT_SELLER: &str = "Seller";

/// Why a record could not become a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no id")]
    MissingId,
    #[error("record id is not an integer: {0}")]
    InvalidId(String),
}

/// A product record as delivered by the products API.
///
/// Every field is optional and loosely typed; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub id: Option<Value>,
    pub title: Option<Value>,
    pub name: Option<Value>,
    pub price: Option<Value>,
    pub description: Option<Value>,
    pub summary: Option<Value>,
    pub image: Option<Value>,
    pub img: Option<Value>,
    pub thumbnail: Option<Value>,
    pub category: Option<Value>,
    pub agent: Option<Value>,
    pub seller: Option<Value>,
    pub rating: Option<Value>,
    pub baths: Option<Value>,
    pub beds: Option<Value>,
    pub area: Option<Value>,
}

/// Result of normalizing a whole products payload.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCatalog {
    /// Products in payload order.
    pub products: Vec<Product>,
    /// Records that were dropped, with their position in the payload.
    pub skipped: Vec<(usize, NormalizeError)>,
    /// The payload was not a JSON array and was treated as empty.
    pub not_a_list: bool,
}

impl NormalizedCatalog {
    /// Normalize a decoded JSON payload.
    ///
    /// Anything other than an array yields an empty catalog with
    /// `not_a_list` set.
    pub fn from_payload<R: Rng + ?Sized>(payload: Value, rng: &mut R) -> Self {
        match payload {
            Value::Array(records) => normalize_catalog(records, rng),
            _ => Self {
                not_a_list: true,
                ..Self::default()
            },
        }
    }
}

/// Normalize every record of a products array, skipping unusable ones.
pub fn normalize_catalog<R: Rng + ?Sized>(records: Vec<Value>, rng: &mut R) -> NormalizedCatalog {
    let mut catalog = NormalizedCatalog::default();

    for (index, record) in records.into_iter().enumerate() {
        let raw = match record {
            Value::Object(_) => serde_json::from_value::<RawProduct>(record)
                .map_err(|_| NormalizeError::NotAnObject),
            _ => Err(NormalizeError::NotAnObject),
        };

        match raw.and_then(|raw| normalize_product(&raw, rng)) {
            Ok(product) => catalog.products.push(product),
            Err(err) => catalog.skipped.push((index, err)),
        }
    }

    catalog
}

/// Map one raw record onto a [`Product`].
///
/// # Errors
///
/// Returns [`NormalizeError::MissingId`] or [`NormalizeError::InvalidId`]
/// when the record cannot be identified. Every other field has a default.
pub fn normalize_product<R: Rng + ?Sized>(
    raw: &RawProduct,
    rng: &mut R,
) -> Result<Product, NormalizeError> {
    let id = product_id(raw.id.as_ref())?;

    Ok(Product {
        id,
        title: first_text(&[raw.title.as_ref(), raw.name.as_ref()])
            .unwrap_or_else(|| UNTITLED.to_string()),
        price: coerce_price(raw.price.as_ref()),
        description: first_text(&[raw.description.as_ref(), raw.summary.as_ref()])
            .unwrap_or_default(),
        image: first_text(&[raw.image.as_ref(), raw.img.as_ref(), raw.thumbnail.as_ref()])
            .unwrap_or_default(),
        category: first_text(&[raw.category.as_ref()])
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        seller: first_text(&[raw.agent.as_ref(), raw.seller.as_ref()])
            .unwrap_or_else(|| DEFAULT_SELLER.to_string()),
        rating: raw.rating.as_ref().and_then(rating),
        details: ListingDetails {
            baths: count_or_random(raw.baths.as_ref(), rng, 1..=3),
            beds: count_or_random(raw.beds.as_ref(), rng, 1..=5),
            area: count_or_random(raw.area.as_ref(), rng, 200..=2199),
        },
    })
}

fn product_id(value: Option<&Value>) -> Result<ProductId, NormalizeError> {
    match value {
        None => Err(NormalizeError::MissingId),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(ProductId::new)
            .ok_or_else(|| NormalizeError::InvalidId(n.to_string())),
        Some(Value::String(s)) => s
            .parse::<ProductId>()
            .map_err(|_| NormalizeError::InvalidId(s.clone())),
        Some(other) => Err(NormalizeError::InvalidId(other.to_string())),
    }
}

/// Scalar JSON rendered as text; objects, arrays and null count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn first_text(chain: &[Option<&Value>]) -> Option<String> {
    chain.iter().flatten().find_map(|value| scalar_text(value))
}

/// Coerce a price field to a non-negative amount.
///
/// Numbers and numeric strings are accepted; an empty string, booleans and
/// anything unparseable become zero.
fn coerce_price(value: Option<&Value>) -> Price {
    let amount = match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Some(Decimal::ZERO),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        _ => None,
    };
    Price::new(amount.unwrap_or(Decimal::ZERO))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Decimal::from_f64)
    })
}

fn non_negative_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Use the record's count when it is a non-negative integer, otherwise
/// draw a placeholder from `range`.
fn count_or_random<R: Rng + ?Sized>(
    value: Option<&Value>,
    rng: &mut R,
    range: std::ops::RangeInclusive<u32>,
) -> Filled<u32> {
    value
        .and_then(non_negative_u32)
        .map_or_else(|| Filled::Random(rng.random_range(range)), Filled::Provided)
}

fn rating(value: &Value) -> Option<Rating> {
    let rate = match value.get("rate")? {
        Value::Number(n) => parse_decimal(&n.to_string())?,
        Value::String(s) => parse_decimal(s.trim())?,
        _ => return None,
    };
    let count = non_negative_u32(value.get("count")?)?;
    Some(Rating { rate, count })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawProduct {
        serde_json::from_value(value).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_fakestore_record_maps_directly() {
        let record = raw(json!({
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Your perfect pack",
            "category": "men's clothing",
            "image": "https://example.test/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }));

        let product = normalize_product(&record, &mut rng()).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.title, "Fjallraven Backpack");
        assert_eq!(product.price, Price::new(Decimal::new(10995, 2)));
        assert_eq!(product.category, "men's clothing");
        assert_eq!(product.image, "https://example.test/1.jpg");
        assert_eq!(product.seller, "Seller");
        assert_eq!(
            product.rating,
            Some(Rating {
                rate: Decimal::new(39, 1),
                count: 120
            })
        );
    }

    #[test]
    fn test_fallback_chains() {
        let record = raw(json!({
            "id": "12",
            "name": "Lamp",
            "summary": "Warm light",
            "thumbnail": "lamp.png",
            "seller": "Acme"
        }));

        let product = normalize_product(&record, &mut rng()).unwrap();
        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.title, "Lamp");
        assert_eq!(product.description, "Warm light");
        assert_eq!(product.image, "lamp.png");
        assert_eq!(product.category, "uncategorized");
        assert_eq!(product.seller, "Acme");
        assert_eq!(product.price, Price::ZERO);
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_defaults_for_empty_record() {
        let product = normalize_product(&raw(json!({ "id": 5 })), &mut rng()).unwrap();
        assert_eq!(product.title, "Untitled");
        assert_eq!(product.description, "");
        assert_eq!(product.image, "");
    }

    #[test]
    fn test_null_falls_through_but_empty_string_does_not() {
        let product = normalize_product(
            &raw(json!({ "id": 1, "title": null, "name": "Named" })),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(product.title, "Named");

        let product = normalize_product(
            &raw(json!({ "id": 1, "title": "", "name": "Named" })),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(product.title, "");
    }

    #[test]
    fn test_price_coercion() {
        let cases = [
            (json!("12.50"), Price::new(Decimal::new(1250, 2))),
            (json!(" 7 "), Price::new(Decimal::new(7, 0))),
            (json!(""), Price::ZERO),
            (json!("free"), Price::ZERO),
            (json!(true), Price::ZERO),
            (json!(null), Price::ZERO),
            (json!(-3), Price::ZERO),
        ];

        for (value, expected) in cases {
            let product =
                normalize_product(&raw(json!({ "id": 1, "price": value.clone() })), &mut rng())
                    .unwrap();
            assert_eq!(product.price, expected, "price input {value}");
        }
    }

    #[test]
    fn test_missing_details_are_random_and_in_range() {
        let product = normalize_product(&raw(json!({ "id": 1 })), &mut rng()).unwrap();

        assert!(product.details.baths.is_random());
        assert!((1..=3).contains(&product.details.baths.value()));
        assert!(product.details.beds.is_random());
        assert!((1..=5).contains(&product.details.beds.value()));
        assert!(product.details.area.is_random());
        assert!((200..=2199).contains(&product.details.area.value()));
    }

    #[test]
    fn test_provided_details_are_kept() {
        let product = normalize_product(
            &raw(json!({ "id": 1, "baths": 2, "beds": "4", "area": 950 })),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(product.details.baths, Filled::Provided(2));
        assert_eq!(product.details.beds, Filled::Provided(4));
        assert_eq!(product.details.area, Filled::Provided(950));
    }

    #[test]
    fn test_missing_or_invalid_id() {
        assert_eq!(
            normalize_product(&raw(json!({ "title": "x" })), &mut rng()),
            Err(NormalizeError::MissingId)
        );
        assert!(matches!(
            normalize_product(&raw(json!({ "id": "abc" })), &mut rng()),
            Err(NormalizeError::InvalidId(_))
        ));
    }

    #[test]
    fn test_catalog_skips_unusable_records_and_keeps_order() {
        let payload = json!([
            { "id": 2, "title": "B" },
            "not an object",
            { "title": "no id" },
            { "id": 1, "title": "A" }
        ]);

        let catalog = NormalizedCatalog::from_payload(payload, &mut rng());
        let titles: Vec<_> = catalog.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(
            catalog.skipped,
            vec![
                (1, NormalizeError::NotAnObject),
                (2, NormalizeError::MissingId)
            ]
        );
        assert!(!catalog.not_a_list);
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        let catalog = NormalizedCatalog::from_payload(json!({ "error": "nope" }), &mut rng());
        assert!(catalog.products.is_empty());
        assert!(catalog.not_a_list);
    }
}
