//! Per-attribute option lists for the variant picker.

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{IdentifyingAttribute, Variant};
use crate::domain::palette::Palette;
use crate::domain::value_objects::{HexColor, Selection};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub value: String,
    pub display_value: String,
    /// Swatch colour, set for colour attributes only.
    pub color_hex: Option<HexColor>,
    /// Stock summed over every active variant carrying this value.
    pub stock: u64,
    pub in_stock: bool,
    /// Some active variant with this value agrees with the other selections.
    pub compatible: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOptions {
    pub key: String,
    pub is_color: bool,
    pub values: Vec<OptionValue>,
}

/// Distinct values of `key` across active variants, in first-seen order.
pub fn available_options(variants: &[Variant], selection: &Selection, key: &str, palette: &Palette) -> AttributeOptions {
    let mut values: Vec<OptionValue> = Vec::new();
    let mut is_color = false;

    for variant in variants.iter().filter(|v| v.is_active) {
        let Some(attribute) = variant.attribute(key) else { continue };
        is_color |= is_color_attribute(attribute);
        let compatible = aligns_with_others(variant, selection, key);
        let stock = u64::from(variant.stock_quantity);

        match values.iter_mut().find(|o| o.value == attribute.value) {
            Some(option) => {
                option.stock += stock;
                option.compatible |= compatible;
            }
            None => values.push(OptionValue {
                value: attribute.value.clone(),
                display_value: attribute.display_value.clone(),
                color_hex: is_color_attribute(attribute).then(|| palette.resolve(attribute)),
                stock,
                in_stock: false,
                compatible,
                selected: selection.get(key) == Some(attribute.value.as_str()),
            }),
        }
    }

    for option in &mut values {
        option.in_stock = option.stock > 0;
    }
    AttributeOptions { key: key.to_string(), is_color, values }
}

fn is_color_attribute(attribute: &IdentifyingAttribute) -> bool {
    attribute.is_color || attribute.color_hex.is_some()
}

/// Every attribute of `variant` other than `key` equals the selection, where the selection has it.
fn aligns_with_others(variant: &Variant, selection: &Selection, key: &str) -> bool {
    variant.attributes().unwrap_or_default().iter()
        .filter(|a| a.key != key)
        .all(|a| selection.get(&a.key).map_or(true, |chosen| chosen == a.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::fixtures::variant;

    fn sel(pairs: &[(&str, &str)]) -> Selection { pairs.iter().copied().collect() }

    #[test]
    fn test_stock_is_summed_per_value() {
        let variants = vec![
            variant("a", &[("color", "red"), ("size", "S")], 2),
            variant("b", &[("color", "red"), ("size", "M")], 0),
            variant("c", &[("color", "blue"), ("size", "M")], 5),
        ];
        let options = available_options(&variants, &Selection::new(), "color", &Palette::default());
        let red = &options.values[0];
        assert_eq!((red.value.as_str(), red.stock, red.in_stock), ("red", 2, true));
        let blue = &options.values[1];
        assert_eq!((blue.value.as_str(), blue.stock, blue.in_stock), ("blue", 5, true));

        let sizes = available_options(&variants, &Selection::new(), "size", &Palette::default());
        let stocks: Vec<(&str, u64, bool)> = sizes.values.iter().map(|o| (o.value.as_str(), o.stock, o.in_stock)).collect();
        assert_eq!(stocks, vec![("S", 2, true), ("M", 5, true)]);
    }

    #[test]
    fn test_zero_total_stock_is_out_of_stock() {
        let variants = vec![variant("a", &[("size", "XL")], 0), variant("b", &[("size", "XL")], 0)];
        let options = available_options(&variants, &Selection::new(), "size", &Palette::default());
        assert_eq!(options.values.len(), 1);
        assert!(!options.values[0].in_stock);
    }

    #[test]
    fn test_compatibility_ignores_queried_key() {
        let variants = vec![
            variant("a", &[("color", "red"), ("size", "S")], 1),
            variant("b", &[("color", "blue"), ("size", "M")], 1),
        ];
        let options = available_options(&variants, &sel(&[("color", "red"), ("size", "M")]), "color", &Palette::default());
        let flags: Vec<(&str, bool, bool)> = options.values.iter().map(|o| (o.value.as_str(), o.compatible, o.selected)).collect();
        assert_eq!(flags, vec![("red", false, true), ("blue", true, false)]);
    }

    #[test]
    fn test_inactive_and_malformed_variants_are_skipped() {
        let mut inactive = variant("a", &[("color", "green")], 3);
        inactive.is_active = false;
        let mut broken = variant("b", &[("color", "pink")], 3);
        broken.identifying_attributes = None;
        let variants = vec![inactive, broken, variant("c", &[("color", "red")], 1)];
        let options = available_options(&variants, &Selection::new(), "color", &Palette::default());
        assert_eq!(options.values.len(), 1);
        assert_eq!(options.values[0].value, "red");
    }

    #[test]
    fn test_colour_swatches_resolve_through_palette() {
        let mut v = variant("a", &[("color", "red")], 1);
        if let Some(attrs) = v.identifying_attributes.as_mut() { attrs[0].is_color = true; }
        let options = available_options(&[v], &Selection::new(), "color", &Palette::default());
        assert!(options.is_color);
        assert_eq!(options.values[0].color_hex.as_ref().map(HexColor::as_str), Some(crate::domain::palette::FALLBACK_COLOR));
    }
}
