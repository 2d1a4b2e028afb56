//! Individual asset reference (IAR)
//!
//! The human-readable identifier printed on inventory labels and stored by the
//! data layer. Its dotted form is `collection.item.serial` with the serial always
//! rendered as four zero-padded digits. Width rules for the first two fields depend
//! on the deployment's company prefix and are enforced by `epc-codec`, not here.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits the serial occupies in every encoded reference
pub const SERIAL_DIGITS: usize = 4;

/// Largest serial that fits in [`SERIAL_DIGITS`]
pub const MAX_SERIAL: u16 = 9999;

/// Structured individual asset reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndividualAssetReference {
    pub collection_reference: String,
    pub item_reference: String,
    pub serial: u16,
}

impl IndividualAssetReference {
    pub fn new(
        collection_reference: impl Into<String>,
        item_reference: impl Into<String>,
        serial: u16,
    ) -> Self {
        Self {
            collection_reference: collection_reference.into(),
            item_reference: item_reference.into(),
            serial,
        }
    }

    /// Digits as they appear inside a GIAI asset reference: dots removed and the
    /// item reference left-padded with zeros to `item_reference_digits`.
    pub fn asset_digits(&self, item_reference_digits: usize) -> String {
        format!(
            "{}{:0>width$}{:0>serial_width$}",
            self.collection_reference,
            self.item_reference,
            self.serial,
            width = item_reference_digits,
            serial_width = SERIAL_DIGITS,
        )
    }
}

impl fmt::Display for IndividualAssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{:0>width$}",
            self.collection_reference,
            self.item_reference,
            self.serial,
            width = SERIAL_DIGITS
        )
    }
}

impl FromStr for IndividualAssetReference {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [collection, item, serial] = parts.as_slice() else {
            return Err(TypeError::malformed_reference(
                s,
                format!("expected 3 dot-separated parts, got {}", parts.len()),
            ));
        };

        if collection.is_empty() || !collection.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::malformed_reference(s, "collection reference must be numeric"));
        }
        if item.is_empty() || !item.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::malformed_reference(s, "item reference must be numeric"));
        }
        if serial.len() != SERIAL_DIGITS || !serial.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::malformed_reference(
                s,
                format!("serial must be {} digits", SERIAL_DIGITS),
            ));
        }

        let serial = serial
            .parse::<u16>()
            .map_err(|e| TypeError::malformed_reference(s, e.to_string()))?;

        Ok(Self::new(*collection, *item, serial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_serial() {
        let iar = IndividualAssetReference::new("0010", "1234", 7);
        assert_eq!(iar.to_string(), "0010.1234.0007");
    }

    #[test]
    fn test_parse_dotted_form() {
        let iar: IndividualAssetReference = "123.1234.1234".parse().unwrap();
        assert_eq!(iar.collection_reference, "123");
        assert_eq!(iar.item_reference, "1234");
        assert_eq!(iar.serial, 1234);
        assert_eq!(iar.to_string(), "123.1234.1234");
    }

    #[test]
    fn test_asset_digits_pads_item_reference() {
        let iar = IndividualAssetReference::new("1234", "1234", 1234);
        assert_eq!(iar.asset_digits(6), "12340012341234");
        // Wider item references are never truncated
        assert_eq!(iar.asset_digits(2), "123412341234");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1234.1234".parse::<IndividualAssetReference>().is_err());
        assert!("1.2.3.4".parse::<IndividualAssetReference>().is_err());
        assert!("12a4.1234.0000".parse::<IndividualAssetReference>().is_err());
        assert!("1234..0000".parse::<IndividualAssetReference>().is_err());
        assert!(".1234.0000".parse::<IndividualAssetReference>().is_err());
        assert!("1234.1234.000".parse::<IndividualAssetReference>().is_err());
        assert!(matches!(
            "1234.1234".parse::<IndividualAssetReference>(),
            Err(TypeError::MalformedReference { .. })
        ));
    }
}
