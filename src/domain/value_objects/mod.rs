//! Value Objects for the storefront catalog

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Hex colour value object, always stored as `#RRGGBB` upper-case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub(crate) String);

impl HexColor {
    pub fn new(value: impl AsRef<str>) -> Result<Self, HexColorError> {
        let raw = value.as_ref().trim();
        let digits = raw.strip_prefix('#').ok_or(HexColorError::MissingHash)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) { return Err(HexColorError::InvalidDigit); }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(HexColorError::InvalidLength),
        };
        Ok(Self(format!("#{}", expanded.to_uppercase())))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self { value.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum HexColorError { MissingHash, InvalidDigit, InvalidLength }
impl std::error::Error for HexColorError {}
impl fmt::Display for HexColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHash => write!(f, "Colour must start with '#'"),
            Self::InvalidDigit => write!(f, "Colour contains a non-hex digit"),
            Self::InvalidLength => write!(f, "Colour must have 3 or 6 hex digits"),
        }
    }
}

/// Attribute key to chosen value, as held by the viewer.
///
/// Ordered by key so that serialized selections are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self { Self::default() }
    pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> { self.0.iter() }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Copy of this selection with `key` set to `value`.
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.set(key, value);
        next
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
