//! Colour palette used to render swatches for colour attributes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use crate::domain::aggregates::IdentifyingAttribute;
use crate::domain::value_objects::{HexColor, HexColorError};

pub const FALLBACK_COLOR: &str = "#9CA3AF";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub hex: HexColor,
}

/// On-disk shape of a palette file.
#[derive(Debug, Deserialize)]
struct PaletteFile {
    #[serde(default)]
    fallback: Option<String>,
    colors: Vec<PaletteEntry>,
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("failed to read palette {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("invalid palette JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid fallback colour: {0}")]
    Fallback(HexColorError),

    #[error("duplicate palette colour name: {0}")]
    Duplicate(String),
}

/// Named colours, keyed case-insensitively, plus a fallback for unknown names.
#[derive(Clone, Debug)]
pub struct Palette {
    entries: HashMap<String, HexColor>,
    fallback: HexColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self { entries: HashMap::new(), fallback: HexColor(FALLBACK_COLOR.to_string()) }
    }
}

impl Palette {
    pub fn new(colors: Vec<PaletteEntry>, fallback: HexColor) -> Result<Self, PaletteError> {
        let mut entries = HashMap::with_capacity(colors.len());
        for entry in colors {
            let name = normalize_name(&entry.name);
            if entries.insert(name, entry.hex).is_some() {
                return Err(PaletteError::Duplicate(entry.name));
            }
        }
        Ok(Self { entries, fallback })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PaletteError> {
        let file: PaletteFile = serde_json::from_str(raw)?;
        let fallback = match file.fallback {
            Some(hex) => HexColor::new(hex).map_err(PaletteError::Fallback)?,
            None => Palette::default().fallback,
        };
        Self::new(file.colors, fallback)
    }

    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| PaletteError::Io { path: path.display().to_string(), source })?;
        let palette = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), colors = palette.len(), "loaded colour palette");
        Ok(palette)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn fallback(&self) -> &HexColor { &self.fallback }

    pub fn lookup(&self, name: &str) -> Option<&HexColor> { self.entries.get(&normalize_name(name)) }

    /// Swatch colour for an attribute: its own hex, then its display value,
    /// then its raw value, then the fallback.
    pub fn resolve(&self, attribute: &IdentifyingAttribute) -> HexColor {
        attribute.color_hex.as_ref()
            .or_else(|| self.lookup(&attribute.display_value))
            .or_else(|| self.lookup(&attribute.value))
            .unwrap_or(&self.fallback)
            .clone()
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
