//! Aggregates module
pub mod product;
pub mod selector;

pub use product::{IdentifyingAttribute, Product, Variant, VariantConfiguration};
pub use selector::{VariantSelector, SELECT_VARIANT_WARNING};
