//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{HexColor, Selection};

/// Canonical product shape produced by the ingestion boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub base_price: Decimal,
    pub mrp: Option<Decimal>,
    /// Tax rate in percent, e.g. `18` for 18%.
    pub tax_rate: Option<Decimal>,
    pub variants: Vec<Variant>,
    pub variant_configuration: VariantConfiguration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfiguration {
    /// Attribute keys that differentiate variants, in display order.
    pub variant_creating_specs: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub price: Decimal,
    pub mrp: Option<Decimal>,
    pub stock_quantity: u32,
    pub is_active: bool,
    /// `None` when the upstream record carried no usable attribute list.
    pub identifying_attributes: Option<Vec<IdentifyingAttribute>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyingAttribute {
    pub key: String,
    pub value: String,
    pub display_value: String,
    pub color_hex: Option<HexColor>,
    #[serde(default)]
    pub is_color: bool,
}

impl IdentifyingAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self { key: key.into(), display_value: value.clone(), value, color_hex: None, is_color: false }
    }
}

impl Variant {
    pub fn attributes(&self) -> Option<&[IdentifyingAttribute]> { self.identifying_attributes.as_deref() }
    pub fn is_well_formed(&self) -> bool { self.identifying_attributes.is_some() }
    pub fn is_in_stock(&self) -> bool { self.stock_quantity > 0 }

    /// Active, in stock, and matchable: eligible as a fallback candidate.
    pub fn is_candidate(&self) -> bool { self.is_active && self.is_in_stock() && self.is_well_formed() }

    pub fn attribute(&self, key: &str) -> Option<&IdentifyingAttribute> {
        self.attributes()?.iter().find(|a| a.key == key)
    }

    pub fn value_of(&self, key: &str) -> Option<&str> { self.attribute(key).map(|a| a.value.as_str()) }

    /// Selection naming every identifying attribute of this variant.
    pub fn selection(&self) -> Selection {
        self.attributes().unwrap_or_default().iter().map(|a| (a.key.as_str(), a.value.as_str())).collect()
    }

    /// True when `id_or_slug` names this variant.
    pub fn is_named(&self, id_or_slug: &str) -> bool {
        self.id == id_or_slug || self.slug.as_deref() == Some(id_or_slug)
    }
}

impl Product {
    pub fn has_variants(&self) -> bool { !self.variants.is_empty() }
    pub fn spec_keys(&self) -> &[String] { &self.variant_configuration.variant_creating_specs }

    pub fn find_variant(&self, id_or_slug: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_named(id_or_slug))
    }

    /// First active variant, or the first variant when none is active.
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_active).or_else(|| self.variants.first())
    }

    pub fn total_stock(&self) -> u64 {
        self.variants.iter().filter(|v| v.is_active).map(|v| u64::from(v.stock_quantity)).sum()
    }

    /// Attribute keys on variants that the variant configuration does not list.
    pub fn unconfigured_keys(&self) -> Vec<&str> {
        if self.spec_keys().is_empty() { return vec![]; }
        let mut keys: Vec<&str> = self.variants.iter()
            .filter_map(Variant::attributes)
            .flatten()
            .map(|a| a.key.as_str())
            .filter(|k| !self.spec_keys().iter().any(|s| s.as_str() == *k))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn variant(id: &str, attrs: &[(&str, &str)], stock: u32) -> Variant {
        Variant {
            id: id.into(), slug: Some(format!("{id}-slug")), sku: None,
            price: Decimal::new(1000, 0), mrp: None, stock_quantity: stock, is_active: true,
            identifying_attributes: Some(attrs.iter().map(|(k, v)| IdentifyingAttribute::new(*k, *v)).collect()),
        }
    }

    pub fn product(variants: Vec<Variant>) -> Product {
        Product {
            id: "p1".into(), slug: Some("tee".into()), name: "Tee".into(),
            base_price: Decimal::new(1000, 0), mrp: None, tax_rate: Some(Decimal::new(18, 0)),
            variants,
            variant_configuration: VariantConfiguration { variant_creating_specs: vec!["color".into(), "size".into()] },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{product, variant};

    #[test]
    fn test_default_variant_prefers_active() {
        let mut first = variant("v1", &[("color", "red")], 1);
        first.is_active = false;
        let p = product(vec![first, variant("v2", &[("color", "blue")], 1)]);
        assert_eq!(p.default_variant().unwrap().id, "v2");
    }
    #[test]
    fn test_default_variant_falls_back_to_first() {
        let mut only = variant("v1", &[("color", "red")], 1);
        only.is_active = false;
        let p = product(vec![only]);
        assert_eq!(p.default_variant().unwrap().id, "v1");
        assert!(product(vec![]).default_variant().is_none());
    }
    #[test]
    fn test_find_variant_by_id_or_slug() {
        let p = product(vec![variant("v1", &[("color", "red")], 1)]);
        assert!(p.find_variant("v1").is_some());
        assert!(p.find_variant("v1-slug").is_some());
        assert!(p.find_variant("nope").is_none());
    }
    #[test]
    fn test_malformed_variant_is_not_a_candidate() {
        let mut v = variant("v1", &[("color", "red")], 3);
        assert!(v.is_candidate());
        v.identifying_attributes = None;
        assert!(!v.is_candidate());
        assert!(v.selection().is_empty());
    }
    #[test]
    fn test_unconfigured_keys() {
        let p = product(vec![variant("v1", &[("color", "red"), ("fabric", "cotton")], 1)]);
        assert_eq!(p.unconfigured_keys(), vec!["fabric"]);
    }
}
