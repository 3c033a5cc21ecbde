//! Storefront Catalog
//!
//! Product-display service for a self-hosted storefront.
//!
//! ## Features
//! - Variant resolution from partial attribute selections
//! - Best-compatible fallback when a combination does not exist
//! - Tax-inclusive/exclusive price conversion and discount display
//! - Per-attribute option availability with stock totals
//! - Colour palette for swatches

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod ingest;

use thiserror::Error;

pub use catalog::Catalog;
pub use config::{AppConfig, ConfigError};
pub use domain::aggregates::{IdentifyingAttribute, Product, Variant, VariantConfiguration, VariantSelector};
pub use domain::palette::Palette;
pub use domain::pricing::{
    discount_percentage, to_exclusive, to_inclusive, try_to_exclusive, try_to_inclusive, PriceBasis, PriceSummary, PricingError,
};
pub use domain::resolver::{resolve_variant, Resolution};
pub use domain::value_objects::{HexColor, Selection};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Palette error: {0}")]
    Palette(#[from] domain::palette::PaletteError),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, EcommerceError>;
