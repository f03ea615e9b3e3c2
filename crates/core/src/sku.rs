//! Stock-keeping unit (SKU) value type.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// A validated SKU.
///
/// SKUs are the product identity the movement log is keyed on, so they are
/// frozen for the lifetime of a product: there is no rename operation
/// anywhere in the workspace. Construction normalizes to uppercase and
/// rejects empty or whitespace-bearing input; deserialization goes through
/// the same checks, so a wire payload cannot smuggle in an invalid SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InventoryError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InventoryError::validation("sku cannot be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InventoryError::validation("sku cannot contain whitespace"));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Sku {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = InventoryError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}
