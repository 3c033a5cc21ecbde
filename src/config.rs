//! Environment-driven configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use crate::domain::pricing::PriceBasis;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub palette_path: Option<PathBuf>,
    pub price_basis: PriceBasis,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Loads `.env` if present, then reads the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when a variable is set to an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Builds the configuration from an env-var lookup, so tests can pass a map.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
    };
    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar { var: var.to_string(), reason };

    let bind_addr = or_default("STOREFRONT_BIND_ADDR", "0.0.0.0:8083")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STOREFRONT_BIND_ADDR", e.to_string()))?;

    let log_level = or_default("STOREFRONT_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("STOREFRONT_CATALOG_PATH", "./config/catalog.json"));
    let palette_path = lookup("STOREFRONT_PALETTE_PATH").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from);

    let price_basis = match or_default("STOREFRONT_PRICES_INCLUDE_TAX", "false").to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => PriceBasis::TaxInclusive,
        "false" | "0" | "no" => PriceBasis::TaxExclusive,
        other => return Err(invalid("STOREFRONT_PRICES_INCLUDE_TAX", format!("expected a boolean, got {other:?}"))),
    };

    Ok(AppConfig { bind_addr, log_level, catalog_path, palette_path, price_basis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn lookup_from(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Result<String, VarError> {
        move |key: &str| map.get(key).map(|v| (*v).to_string()).ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = build_app_config(lookup_from(HashMap::new())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8083".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.catalog_path, PathBuf::from("./config/catalog.json"));
        assert_eq!(config.palette_path, None);
        assert_eq!(config.price_basis, PriceBasis::TaxExclusive);
    }

    #[test]
    fn test_reads_overrides() {
        let config = build_app_config(lookup_from(HashMap::from([
            ("STOREFRONT_BIND_ADDR", "127.0.0.1:9000"),
            ("STOREFRONT_PALETTE_PATH", "./config/palette.json"),
            ("STOREFRONT_PRICES_INCLUDE_TAX", "TRUE"),
        ])))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.palette_path, Some(PathBuf::from("./config/palette.json")));
        assert_eq!(config.price_basis, PriceBasis::TaxInclusive);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = build_app_config(lookup_from(HashMap::from([("STOREFRONT_BIND_ADDR", "nope")]))).unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_BIND_ADDR"));
        let err = build_app_config(lookup_from(HashMap::from([("STOREFRONT_PRICES_INCLUDE_TAX", "maybe")]))).unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_PRICES_INCLUDE_TAX"));
    }
}
