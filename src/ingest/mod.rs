//! Ingestion boundary: loose upstream product records in, canonical products out.
pub mod normalize;
pub mod types;

pub use normalize::{normalize_product, IngestError};
pub use types::{RawCatalog, RawProduct, RawVariant};
