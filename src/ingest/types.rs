//! Raw product records as served by the upstream product-lookup endpoint.
//!
//! The upstream schema is loose: the same concept shows up under several
//! field names depending on which service produced the record (`_id` vs
//! `id`, `sellingPrice` vs `lowestPrice` vs `basePrice` vs `price`), amounts
//! arrive as JSON numbers or numeric strings, and `identifyingAttributes` may
//! be missing, `null`, or not an array at all. Every field here is optional
//! so that a single odd record never fails a whole catalog load; the
//! normalization pass decides what is usable.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "handle")]
    pub slug: Option<String>,
    #[serde(default, alias = "title")]
    pub name: Option<String>,

    #[serde(default)]
    pub selling_price: Option<Decimal>,
    #[serde(default)]
    pub lowest_price: Option<Decimal>,
    #[serde(default)]
    pub base_price: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub mrp: Option<Decimal>,

    /// Percent. Older records call it `gstRate`.
    #[serde(default, alias = "gstRate")]
    pub tax_rate: Option<Decimal>,

    /// Decoded one by one so a single bad variant is dropped on its own.
    #[serde(default)]
    pub variants: Option<Vec<Value>>,
    #[serde(default)]
    pub variant_configuration: Option<RawVariantConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariantConfiguration {
    #[serde(default)]
    pub variant_creating_specs: Option<Vec<RawSpecKey>>,
}

/// A spec key is either a bare string or an object carrying `key`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawSpecKey {
    Key(String),
    Spec { key: String },
}

impl RawSpecKey {
    pub fn into_key(self) -> String {
        match self { Self::Key(key) | Self::Spec { key } => key }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub mrp: Option<Decimal>,
    #[serde(default, alias = "stock", deserialize_with = "lenient_count")]
    pub stock_quantity: Option<i64>,
    /// Absent means active.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_active: Option<bool>,
    /// Kept untyped; see [`RawAttribute`] for the expected element shape.
    #[serde(default)]
    pub identifying_attributes: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttribute {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default, alias = "hex")]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub is_color: bool,
}

/// Counts arrive as integers, floats, or numeric strings; anything else reads as absent.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok()
            .or_else(|| s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// File shape accepted by the catalog loader: a bare array or `{ "products": [...] }`.
///
/// Records stay untyped here and are decoded into [`RawProduct`] one at a time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCatalog {
    List(Vec<Value>),
    Wrapped { products: Vec<Value> },
}

impl RawCatalog {
    pub fn into_records(self) -> Vec<Value> {
        match self { Self::List(records) | Self::Wrapped { products: records } => records }
    }
}
