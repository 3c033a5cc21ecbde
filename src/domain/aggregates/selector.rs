//! Variant Selector Aggregate
//!
//! Owns one viewer's Selection State for a product: seeded when the page
//! opens, updated on every attribute click, dropped with the view.

use crate::domain::aggregates::{Product, Variant};
use crate::domain::events::{DomainEvent, SelectionEvent};
use crate::domain::options::{available_options, AttributeOptions};
use crate::domain::palette::Palette;
use crate::domain::pricing::{PriceBasis, PriceSummary};
use crate::domain::resolver::{self, Resolution};
use crate::domain::value_objects::Selection;

pub const SELECT_VARIANT_WARNING: &str = "Select a variant before proceeding";

#[derive(Clone, Debug)]
pub struct VariantSelector<'a> {
    product: &'a Product,
    selection: Selection,
    selected: Option<&'a Variant>,
    events: Vec<DomainEvent>,
}

impl<'a> VariantSelector<'a> {
    /// Seeds the selection from `variant_param` (id or slug) when it names a
    /// variant, else from the product's default variant.
    pub fn open(product: &'a Product, variant_param: Option<&str>) -> Self {
        let requested = variant_param.and_then(|p| product.find_variant(p));
        let seed = requested.or_else(|| product.default_variant());
        let mut selector = Self {
            product,
            selection: seed.map(Variant::selection).unwrap_or_default(),
            selected: seed,
            events: vec![],
        };
        selector.raise_event(SelectionEvent::Seeded {
            product_id: product.id.clone(),
            variant_id: seed.map(|v| v.id.clone()),
            from_query: requested.is_some(),
        });
        selector
    }

    /// Rebuilds a selector from a selection the caller kept between requests.
    pub fn restore(product: &'a Product, selection: Selection) -> Self {
        let selected = resolver::find_exact_match(&product.variants, &selection);
        Self { product, selection, selected, events: vec![] }
    }

    pub fn product(&self) -> &'a Product { self.product }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn selected_variant(&self) -> Option<&'a Variant> { self.selected }

    /// Applies `key = value`. On a fallback the whole selection snaps to the
    /// fallback variant's attributes.
    pub fn select(&mut self, key: &str, value: &str) -> Option<&'a Variant> {
        let product = self.product;
        let target = self.selection.with(key, value);
        let product_id = product.id.clone();

        match resolver::resolve_variant(&product.variants, &target, Some(key)) {
            Some(Resolution::Exact(variant)) => {
                self.selection = target;
                self.selected = Some(variant);
                self.raise_event(SelectionEvent::Resolved { product_id, variant_id: variant.id.clone() });
            }
            Some(Resolution::Fallback(variant)) => {
                self.selection = variant.selection();
                self.selected = Some(variant);
                self.raise_event(SelectionEvent::Snapped {
                    product_id, key: key.to_string(), requested: value.to_string(), variant_id: variant.id.clone(),
                });
            }
            None => {
                self.selection = target;
                self.selected = None;
                self.raise_event(SelectionEvent::Unresolved { product_id, key: key.to_string(), value: value.to_string() });
            }
        }
        self.selected
    }

    pub fn is_option_compatible(&self, key: &str, value: &str) -> bool {
        resolver::is_option_compatible(&self.product.variants, &self.selection, key, value)
    }

    pub fn available_options(&self, key: &str, palette: &Palette) -> AttributeOptions {
        available_options(&self.product.variants, &self.selection, key, palette)
    }

    /// Options for every configured attribute key, in configuration order.
    pub fn options(&self, palette: &Palette) -> Vec<AttributeOptions> {
        self.product.spec_keys().iter().map(|key| self.available_options(key, palette)).collect()
    }

    /// Selected variant's prices, or the base product's when nothing is selected.
    pub fn price_summary(&self, basis: PriceBasis) -> PriceSummary {
        match self.selected {
            Some(variant) => PriceSummary::for_variant(variant, self.product, basis),
            None => PriceSummary::for_product(self.product, basis),
        }
    }

    /// Non-blocking warning shown when a product with variants has none selected.
    pub fn warning(&self) -> Option<&'static str> {
        (self.product.has_variants() && self.selected.is_none()).then_some(SELECT_VARIANT_WARNING)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: SelectionEvent) { self.events.push(DomainEvent::Selection(e)); }
}
