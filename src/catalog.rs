//! In-memory catalog snapshot, loaded once at startup.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use crate::domain::aggregates::Product;
use crate::ingest::{normalize_product, RawCatalog, RawProduct};
use crate::{EcommerceError, Result};

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
    by_slug: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Normalizes every record; records that fail normalization are skipped.
    pub fn from_raw(records: Vec<RawProduct>) -> Self {
        let total = records.len();
        let mut catalog = Self { products: Vec::with_capacity(total), by_slug: HashMap::new(), by_id: HashMap::new(), loaded_at: Utc::now() };

        for (idx, record) in records.into_iter().enumerate() {
            match normalize_product(record) {
                Ok(product) => catalog.insert(product),
                Err(e) => tracing::warn!(record = idx, error = %e, "skipping product record"),
            }
        }
        tracing::info!(loaded = catalog.len(), skipped = total - catalog.len(), "catalog snapshot built");
        catalog
    }

    /// Parses a catalog file. Only a malformed document is an error; records
    /// that do not decode as products are skipped.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: RawCatalog = serde_json::from_str(raw)?;
        let records = document
            .into_records()
            .into_iter()
            .enumerate()
            .filter_map(|(idx, record)| match serde_json::from_value::<RawProduct>(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(record = idx, error = %e, "skipping undecodable product record");
                    None
                }
            })
            .collect();
        Ok(Self::from_raw(records))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EcommerceError::StorageError(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    fn insert(&mut self, product: Product) {
        if self.by_id.contains_key(&product.id) {
            tracing::warn!(product_id = %product.id, "duplicate product id; keeping the first record");
            return;
        }
        let idx = self.products.len();
        if let Some(slug) = &product.slug {
            if self.by_slug.insert(slug.clone(), idx).is_some() {
                tracing::warn!(slug = %slug, "duplicate product slug; the later record wins slug lookups");
            }
        }
        self.by_id.insert(product.id.clone(), idx);
        self.products.push(product);
    }

    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
    pub fn products(&self) -> &[Product] { &self.products }
    pub fn loaded_at(&self) -> DateTime<Utc> { self.loaded_at }

    /// Looks a product up by slug, then by id when no slug matches.
    pub fn lookup(&self, slug_or_id: &str) -> Option<&Product> {
        if let Some(&idx) = self.by_slug.get(slug_or_id) {
            return self.products.get(idx);
        }
        tracing::debug!(slug_or_id, "no product with this slug; trying id lookup");
        self.by_id.get(slug_or_id).and_then(|&idx| self.products.get(idx))
    }

    pub fn get(&self, slug_or_id: &str) -> Result<&Product> {
        self.lookup(slug_or_id).ok_or_else(|| EcommerceError::ProductNotFound(slug_or_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "products": [
            { "_id": "64f0", "slug": "linen-shirt", "name": "Linen Shirt", "price": 1499 },
            { "name": "No id" },
            { "_id": "64f1", "name": "Socks", "price": 199 },
            { "_id": "64f0", "slug": "dupe", "name": "Duplicate", "price": 1 }
        ]
    }"#;

    #[test]
    fn test_skips_bad_and_duplicate_records() {
        let catalog = Catalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup("dupe").is_none());
    }

    #[test]
    fn test_lookup_by_slug_then_id() {
        let catalog = Catalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.lookup("linen-shirt").unwrap().id, "64f0");
        assert_eq!(catalog.lookup("64f0").unwrap().name, "Linen Shirt");
        assert_eq!(catalog.lookup("64f1").unwrap().name, "Socks");
        assert!(matches!(catalog.get("missing"), Err(EcommerceError::ProductNotFound(_))));
    }

    #[test]
    fn test_accepts_bare_array() {
        let catalog = Catalog::from_json_str(r#"[ { "id": "a", "price": 10 } ]"#).unwrap();
        assert_eq!(catalog.products()[0].id, "a");
    }

    #[test]
    fn test_one_odd_record_does_not_sink_the_catalog() {
        let catalog = Catalog::from_json_str(r#"{ "products": [
            { "_id": "good", "price": 10 },
            { "_id": "string-stock", "price": 20, "variants": [ { "_id": "v", "stockQuantity": "5", "identifyingAttributes": [] } ] },
            { "_id": "bad-price", "price": "ten" },
            42
        ] }"#).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup("good").is_some());
        assert_eq!(catalog.get("string-stock").unwrap().variants[0].stock_quantity, 5);
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(matches!(Catalog::from_json_str("{"), Err(EcommerceError::Json(_))));
    }
}
