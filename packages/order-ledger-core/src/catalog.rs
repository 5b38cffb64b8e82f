//! Product variants and size catalogs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sizes offered by the shared-ledger order form.
pub const LEDGER_SIZES: [u16; 11] = [36, 38, 40, 42, 44, 46, 48, 50, 52, 54, 56];

/// Sizes offered by the single-item (per-customer) order form.
pub const ITEM_SIZES: [u16; 7] = [34, 36, 38, 40, 42, 44, 46];

/// Product variant (garment colour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Azul,
    Preta,
}

impl Variant {
    /// Every variant, in column order.
    pub const ALL: [Variant; 2] = [Variant::Azul, Variant::Preta];

    /// Prefix used by form fields (`azul_36`).
    pub fn field_prefix(self) -> &'static str {
        match self {
            Variant::Azul => "azul",
            Variant::Preta => "preta",
        }
    }

    /// Prefix used by ledger columns (`Azul_36`).
    pub fn column_prefix(self) -> &'static str {
        match self {
            Variant::Azul => "Azul",
            Variant::Preta => "Preta",
        }
    }

    /// Form field name for this variant at `size`.
    pub fn field_name(self, size: u16) -> String {
        format!("{}_{}", self.field_prefix(), size)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_prefix())
    }
}

/// Error returned when a colour name is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Variant::ALL
            .into_iter()
            .find(|v| v.field_prefix().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownVariant(trimmed.to_string()))
    }
}

/// Ordered set of sizes accepted by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeCatalog {
    sizes: Vec<u16>,
}

impl SizeCatalog {
    /// Catalog for the shared ledger form (36–56).
    pub fn ledger() -> Self {
        Self {
            sizes: LEDGER_SIZES.to_vec(),
        }
    }

    /// Catalog for the single-item form (34–46).
    pub fn item() -> Self {
        Self {
            sizes: ITEM_SIZES.to_vec(),
        }
    }

    pub fn sizes(&self) -> &[u16] {
        &self.sizes
    }

    pub fn contains(&self, size: u16) -> bool {
        self.sizes.contains(&size)
    }

    /// Parses a submitted size and checks it belongs to the catalog.
    pub fn parse_size(&self, raw: &str) -> Option<u16> {
        raw.trim().parse().ok().filter(|size| self.contains(*size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names() {
        assert_eq!(Variant::Azul.field_name(36), "azul_36");
        assert_eq!(Variant::Preta.field_name(56), "preta_56");
        assert_eq!(Variant::Preta.to_string(), "Preta");
    }

    #[test]
    fn test_variant_from_str_is_case_insensitive() {
        assert_eq!("Azul".parse::<Variant>(), Ok(Variant::Azul));
        assert_eq!(" PRETA ".parse::<Variant>(), Ok(Variant::Preta));
        assert!("verde".parse::<Variant>().is_err());
    }

    #[test]
    fn test_size_catalogs() {
        let ledger = SizeCatalog::ledger();
        assert_eq!(ledger.sizes().first(), Some(&36));
        assert_eq!(ledger.sizes().last(), Some(&56));
        assert!(!ledger.contains(34));

        let item = SizeCatalog::item();
        assert_eq!(item.parse_size("34"), Some(34));
        assert_eq!(item.parse_size("48"), None);
        assert_eq!(item.parse_size("x"), None);
    }
}
