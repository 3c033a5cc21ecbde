//! Normalization from raw upstream records to the canonical [`Product`].

use rust_decimal::Decimal;
use thiserror::Error;
use crate::domain::aggregates::{IdentifyingAttribute, Product, Variant, VariantConfiguration};
use crate::domain::value_objects::HexColor;
use crate::ingest::types::{RawAttribute, RawProduct, RawSpecKey, RawVariant};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("product record has no id")]
    MissingId,

    #[error("normalization error for product {product_id}: {reason}")]
    Normalization { product_id: String, reason: String },
}

/// Normalizes a raw product record.
///
/// # Errors
///
/// Returns [`IngestError::MissingId`] when the record has no usable id, and
/// [`IngestError::Normalization`] when a price is negative.
pub fn normalize_product(raw: RawProduct) -> Result<Product, IngestError> {
    let id = non_empty(raw.id).ok_or(IngestError::MissingId)?;

    let base_price = raw.selling_price
        .or(raw.lowest_price)
        .or(raw.base_price)
        .or(raw.price)
        .unwrap_or(Decimal::ZERO);
    if base_price.is_sign_negative() && !base_price.is_zero() {
        return Err(IngestError::Normalization { product_id: id, reason: format!("negative base price {base_price}") });
    }

    let variant_creating_specs: Vec<String> = raw.variant_configuration
        .and_then(|c| c.variant_creating_specs)
        .unwrap_or_default()
        .into_iter()
        .map(RawSpecKey::into_key)
        .filter(|k| !k.is_empty())
        .collect();

    let variants = raw.variants
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match serde_json::from_value::<RawVariant>(record) {
            Ok(variant) => Some((idx, variant)),
            Err(e) => {
                tracing::warn!(product_id = %id, variant = idx, error = %e, "skipping undecodable variant");
                None
            }
        })
        .map(|(idx, variant)| normalize_variant(variant, idx, &id, base_price))
        .collect::<Result<Vec<_>, _>>()?;

    let product = Product {
        slug: non_empty(raw.slug),
        name: non_empty(raw.name).unwrap_or_else(|| id.clone()),
        base_price,
        mrp: raw.mrp,
        tax_rate: raw.tax_rate,
        variants,
        variant_configuration: VariantConfiguration { variant_creating_specs },
        id,
    };

    let unconfigured = product.unconfigured_keys();
    if !unconfigured.is_empty() {
        tracing::warn!(product_id = %product.id, keys = ?unconfigured, "variant attributes outside the variant configuration");
    }
    Ok(product)
}

fn normalize_variant(raw: RawVariant, idx: usize, product_id: &str, base_price: Decimal) -> Result<Variant, IngestError> {
    let id = non_empty(raw.id).unwrap_or_else(|| format!("{product_id}-{idx}"));

    let price = raw.price.unwrap_or(base_price);
    if price.is_sign_negative() && !price.is_zero() {
        return Err(IngestError::Normalization {
            product_id: product_id.to_owned(),
            reason: format!("variant {id} has negative price {price}"),
        });
    }

    let stock_quantity = raw.stock_quantity
        .map(|q| u32::try_from(q.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0);

    let identifying_attributes = parse_attributes(raw.identifying_attributes, &id);

    Ok(Variant {
        slug: non_empty(raw.slug),
        sku: non_empty(raw.sku),
        price,
        mrp: raw.mrp,
        stock_quantity,
        is_active: raw.is_active.unwrap_or(true),
        identifying_attributes,
        id,
    })
}

/// `None` when the value is not an array. Unparseable elements are dropped,
/// and a repeated key keeps its first value.
fn parse_attributes(value: serde_json::Value, variant_id: &str) -> Option<Vec<IdentifyingAttribute>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => return None,
        _ => {
            tracing::warn!(variant_id, "identifyingAttributes is not an array; variant is unmatchable");
            return None;
        }
    };

    let mut attributes: Vec<IdentifyingAttribute> = Vec::with_capacity(items.len());
    for item in items {
        let raw: RawAttribute = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(variant_id, error = %e, "dropping malformed identifying attribute");
                continue;
            }
        };
        if attributes.iter().any(|a| a.key == raw.key) {
            tracing::warn!(variant_id, key = %raw.key, "duplicate identifying attribute key");
            continue;
        }
        attributes.push(normalize_attribute(raw, variant_id));
    }
    Some(attributes)
}

fn normalize_attribute(raw: RawAttribute, variant_id: &str) -> IdentifyingAttribute {
    let color_hex = raw.color_hex.filter(|h| !h.is_empty()).and_then(|hex| match HexColor::new(&hex) {
        Ok(color) => Some(color),
        Err(e) => {
            tracing::warn!(variant_id, hex = %hex, error = %e, "ignoring invalid colour");
            None
        }
    });
    IdentifyingAttribute {
        display_value: non_empty(raw.display_value).unwrap_or_else(|| raw.value.clone()),
        is_color: raw.is_color || color_hex.is_some(),
        key: raw.key,
        value: raw.value,
        color_hex,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawProduct { serde_json::from_value(value).unwrap() }

    #[test]
    fn test_normalize_requires_an_id() {
        let err = normalize_product(raw(json!({ "name": "No id" }))).unwrap_err();
        assert!(matches!(err, IngestError::MissingId));
    }

    #[test]
    fn test_normalize_accepts_mongo_style_id() {
        let product = normalize_product(raw(json!({ "_id": "abc123", "title": "Tee" }))).unwrap();
        assert_eq!(product.id, "abc123");
        assert_eq!(product.name, "Tee");
    }

    #[test]
    fn test_normalize_price_fallback_chain() {
        let product = normalize_product(raw(json!({ "id": "p", "lowestPrice": "799", "basePrice": 899, "price": 999 }))).unwrap();
        assert_eq!(product.base_price, dec!(799));
        let product = normalize_product(raw(json!({ "id": "p", "sellingPrice": 699.5, "lowestPrice": 799 }))).unwrap();
        assert_eq!(product.base_price, dec!(699.5));
        let product = normalize_product(raw(json!({ "id": "p", "price": 999 }))).unwrap();
        assert_eq!(product.base_price, dec!(999));
        let product = normalize_product(raw(json!({ "id": "p" }))).unwrap();
        assert_eq!(product.base_price, Decimal::ZERO);
    }

    #[test]
    fn test_normalize_rejects_negative_price() {
        let err = normalize_product(raw(json!({ "id": "p", "price": -1 }))).unwrap_err();
        assert!(matches!(err, IngestError::Normalization { .. }));
    }

    #[test]
    fn test_normalize_reads_spec_keys_in_both_shapes() {
        let product = normalize_product(raw(json!({
            "id": "p",
            "variantConfiguration": { "variantCreatingSpecs": ["color", { "key": "size" }] }
        }))).unwrap();
        assert_eq!(product.spec_keys(), &["color".to_string(), "size".to_string()]);
    }

    #[test]
    fn test_normalize_variant_defaults() {
        let product = normalize_product(raw(json!({
            "id": "p", "price": 500, "taxRate": 18,
            "variants": [ { "stockQuantity": -3, "identifyingAttributes": [] } ]
        }))).unwrap();
        let variant = &product.variants[0];
        assert_eq!(variant.id, "p-0");
        assert_eq!(variant.price, dec!(500));
        assert_eq!(variant.stock_quantity, 0);
        assert!(variant.is_active);
        assert_eq!(variant.identifying_attributes.as_deref(), Some(&[][..]));
        assert_eq!(product.tax_rate, Some(dec!(18)));
    }

    #[test]
    fn test_normalize_tolerates_loose_variant_fields() {
        let product = normalize_product(raw(json!({
            "id": "p",
            "variants": [
                { "id": "text-stock", "stockQuantity": "5", "isActive": "false", "identifyingAttributes": [] },
                { "id": "float-stock", "stock": 2.0, "isActive": 1 },
                { "id": "junk-stock", "stockQuantity": "lots", "isActive": null },
                { "id": "bad-price", "price": "free" },
                "not a variant"
            ]
        }))).unwrap();
        let ids: Vec<&str> = product.variants.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["text-stock", "float-stock", "junk-stock"]);
        assert_eq!(product.variants[0].stock_quantity, 5);
        assert!(!product.variants[0].is_active);
        assert_eq!(product.variants[1].stock_quantity, 2);
        assert!(product.variants[1].is_active);
        assert_eq!(product.variants[2].stock_quantity, 0);
        assert!(product.variants[2].is_active);
    }

    #[test]
    fn test_normalize_marks_malformed_attributes() {
        let product = normalize_product(raw(json!({
            "id": "p",
            "variants": [
                { "id": "missing" },
                { "id": "object", "identifyingAttributes": { "key": "color" } },
                { "id": "mixed", "identifyingAttributes": [ { "key": "color", "value": "red" }, { "oops": true } ] }
            ]
        }))).unwrap();
        assert!(product.variants[0].identifying_attributes.is_none());
        assert!(product.variants[1].identifying_attributes.is_none());
        assert_eq!(product.variants[2].identifying_attributes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_normalize_keeps_first_duplicate_key() {
        let product = normalize_product(raw(json!({
            "id": "p",
            "variants": [ { "id": "v", "identifyingAttributes": [
                { "key": "size", "value": "M" },
                { "key": "size", "value": "L" }
            ] } ]
        }))).unwrap();
        assert_eq!(product.variants[0].value_of("size"), Some("M"));
        assert_eq!(product.variants[0].attributes().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_normalize_attribute_colour_fields() {
        let product = normalize_product(raw(json!({
            "id": "p",
            "variants": [ { "id": "v", "identifyingAttributes": [
                { "key": "color", "value": "nb", "displayValue": "Navy Blue", "colorHex": "#000080" },
                { "key": "trim", "value": "gold", "colorHex": "not-a-colour" }
            ] } ]
        }))).unwrap();
        let color = product.variants[0].attribute("color").unwrap();
        assert_eq!(color.display_value, "Navy Blue");
        assert!(color.is_color);
        assert_eq!(color.color_hex.as_ref().map(HexColor::as_str), Some("#000080"));
        let trim = product.variants[0].attribute("trim").unwrap();
        assert!(trim.color_hex.is_none());
        assert!(!trim.is_color);
        assert_eq!(trim.display_value, "gold");
    }
}
