//! # GIAI-96 Tag URI and Hex Codec
//!
//! Converts between `urn:epc:tag:giai-96:<filter>.<company prefix>.<asset reference>`
//! and the 24-character hex payload written to a tag's EPC bank.
//!
//! ## Bit Layout
//!
//! ```text
//! | header (0x34) | filter | partition | company prefix | asset reference |
//! |       8       |   3    |     3     |      20-40     |      62-42      |
//! ```
//!
//! Company prefix and asset reference are handled as [`BigUint`]: asset references
//! run past 2^53 and a wrapping machine integer would hide exactly the overflow the
//! encoder's round-trip check exists to catch.

use crate::error::{EpcError, Result};
use crate::partition::{
    self, is_numeric, EPC_HEX_LEN, FILTER_BITS, GIAI_96_HEADER,
    MAX_FILTER_VALUE, PARTITION_BITS,
};
use num_bigint::BigUint;
use tracing::debug;

/// Scheme prefix of every GIAI-96 tag URI
pub const GIAI_96_URI_PREFIX: &str = "urn:epc:tag:giai-96:";

const URI_SCHEME_PARTS: [&str; 4] = ["urn", "epc", "tag", "giai-96"];

/// Decoded GIAI-96 fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiaiParts {
    pub filter: u8,
    pub partition: u8,
    /// Company prefix digits, leading zeros preserved
    pub company_prefix: String,
    pub asset_reference: BigUint,
}

impl GiaiParts {
    /// Parse a tag URI by splitting on `:` and `.`
    pub fn parse_uri(uri: &str) -> Result<Self> {
        let segments: Vec<&str> = uri.split(':').collect();
        if segments.len() != URI_SCHEME_PARTS.len() + 1
            || segments[..URI_SCHEME_PARTS.len()] != URI_SCHEME_PARTS
        {
            return Err(EpcError::invalid_uri(uri, "expected urn:epc:tag:giai-96:<fields>"));
        }

        let fields: Vec<&str> = segments[URI_SCHEME_PARTS.len()].split('.').collect();
        let [filter, company_prefix, asset_reference] = fields.as_slice() else {
            return Err(EpcError::invalid_uri(
                uri,
                format!("expected filter.companyPrefix.assetReference, got {} fields", fields.len()),
            ));
        };

        let filter = match filter.as_bytes() {
            [digit @ b'0'..=b'9'] if digit - b'0' <= MAX_FILTER_VALUE => digit - b'0',
            _ => {
                return Err(EpcError::invalid_uri(
                    uri,
                    format!("filter {} must be a single digit 0-{}", filter, MAX_FILTER_VALUE),
                ))
            }
        };

        let entry = partition::for_company_prefix(company_prefix).ok_or_else(|| {
            EpcError::invalid_uri(uri, format!("company prefix {} must be 6-12 digits", company_prefix))
        })?;

        if !is_numeric(asset_reference) {
            return Err(EpcError::invalid_uri(uri, "asset reference must be numeric"));
        }
        let asset_reference = BigUint::parse_bytes(asset_reference.as_bytes(), 10)
            .ok_or_else(|| EpcError::invalid_uri(uri, "asset reference must be numeric"))?;

        Ok(Self {
            filter,
            partition: entry.partition,
            company_prefix: company_prefix.to_string(),
            asset_reference,
        })
    }

    /// Unpack a 24-character hex EPC
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != EPC_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EpcError::invalid_hex(
                hex,
                format!("expected {} hex characters", EPC_HEX_LEN),
            ));
        }

        let header = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|e| EpcError::invalid_hex(hex, e.to_string()))?;
        if header != GIAI_96_HEADER {
            return Err(EpcError::invalid_hex(
                hex,
                format!("header {:#04x} is not GIAI-96 ({:#04x})", header, GIAI_96_HEADER),
            ));
        }

        // Byte after the header: filter(3) | partition(3) | first two payload bits
        let control = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|e| EpcError::invalid_hex(hex, e.to_string()))?;
        let filter = control >> (8 - FILTER_BITS);
        let partition = (control >> (8 - FILTER_BITS - PARTITION_BITS)) & 0b111;
        let entry = partition::by_partition(partition)
            .ok_or_else(|| EpcError::invalid_hex(hex, format!("unknown partition {}", partition)))?;

        let value = BigUint::parse_bytes(hex.as_bytes(), 16)
            .ok_or_else(|| EpcError::invalid_hex(hex, "not hexadecimal"))?;
        let payload = value & low_bits_mask(entry.company_prefix_bits + entry.asset_reference_bits);
        let company_prefix_value = &payload >> entry.asset_reference_bits;
        let asset_reference = payload & low_bits_mask(entry.asset_reference_bits);

        let company_prefix = format!(
            "{:0>width$}",
            company_prefix_value.to_str_radix(10),
            width = entry.company_prefix_digits
        );
        if company_prefix.len() != entry.company_prefix_digits {
            return Err(EpcError::invalid_hex(
                hex,
                format!(
                    "company prefix {} exceeds {} digits",
                    company_prefix, entry.company_prefix_digits
                ),
            ));
        }

        Ok(Self {
            filter,
            partition,
            company_prefix,
            asset_reference,
        })
    }

    pub fn to_uri(&self) -> String {
        format!(
            "{}{}.{}.{}",
            GIAI_96_URI_PREFIX,
            self.filter,
            self.company_prefix,
            self.asset_reference.to_str_radix(10)
        )
    }

    /// Pack into hex. A filter above 7 or a field wider than its partition slot is
    /// rejected instead of bleeding into its neighbours.
    pub fn to_hex(&self) -> Result<String> {
        if self.filter > MAX_FILTER_VALUE {
            return Err(EpcError::invalid_uri(
                self.to_uri(),
                format!("filter {} must be 0-{}", self.filter, MAX_FILTER_VALUE),
            ));
        }
        let entry = partition::by_partition(self.partition).ok_or_else(|| {
            EpcError::invalid_uri(self.to_uri(), format!("unknown partition {}", self.partition))
        })?;
        let company_prefix_value = Some(self.company_prefix.as_str())
            .filter(|cp| is_numeric(cp))
            .and_then(|cp| BigUint::parse_bytes(cp.as_bytes(), 10))
            .ok_or_else(|| EpcError::invalid_uri(self.to_uri(), "company prefix must be numeric"))?;

        if company_prefix_value.bits() > u64::from(entry.company_prefix_bits)
            || self.asset_reference.bits() > u64::from(entry.asset_reference_bits)
        {
            return Err(EpcError::GiaiOutOfRange { uri: self.to_uri() });
        }

        let mut value = BigUint::from(GIAI_96_HEADER);
        value = (value << FILTER_BITS) | BigUint::from(self.filter);
        value = (value << PARTITION_BITS) | BigUint::from(self.partition);
        value = (value << entry.company_prefix_bits) | company_prefix_value;
        value = (value << entry.asset_reference_bits) | &self.asset_reference;

        Ok(format!("{:0>width$}", value.to_str_radix(16), width = EPC_HEX_LEN))
    }
}

/// Encode a GIAI-96 tag URI as EPC hex.
///
/// The hex produced is decoded again and must reproduce `uri` exactly; otherwise the
/// value is not representable (numeric overflow or a leading zero that the integer
/// field cannot carry) and [`EpcError::GiaiOutOfRange`] is returned.
pub fn encode_epc_hex_from_giai(uri: &str) -> Result<String> {
    let parts = GiaiParts::parse_uri(uri)?;
    let hex = match parts.to_hex() {
        Err(EpcError::GiaiOutOfRange { .. }) => {
            return Err(EpcError::GiaiOutOfRange { uri: uri.to_string() })
        }
        other => other?,
    };

    match get_giai_uri_from_epc_hex(&hex) {
        Ok(decoded) if decoded == uri => Ok(hex),
        Ok(decoded) => {
            debug!(uri, %hex, %decoded, "GIAI round-trip mismatch");
            Err(EpcError::GiaiOutOfRange { uri: uri.to_string() })
        }
        Err(e) => {
            debug!(uri, %hex, error = %e, "GIAI round-trip decode failed");
            Err(EpcError::GiaiOutOfRange { uri: uri.to_string() })
        }
    }
}

/// Decode EPC hex back to its GIAI-96 tag URI
pub fn get_giai_uri_from_epc_hex(hex: &str) -> Result<String> {
    GiaiParts::from_hex(hex).map(|parts| parts.to_uri())
}

/// Decode EPC hex, returning the URI together with its fields
pub fn decode_hex_epc(hex: &str) -> Result<(String, GiaiParts)> {
    let parts = GiaiParts::from_hex(hex)?;
    Ok((parts.to_uri(), parts))
}

/// Encode a tag URI, returning the hex together with the parsed fields
pub fn encode_hex_epc(uri: &str) -> Result<(String, GiaiParts)> {
    let hex = encode_epc_hex_from_giai(uri)?;
    let parts = GiaiParts::parse_uri(uri)?;
    Ok((hex, parts))
}

fn low_bits_mask(bits: u32) -> BigUint {
    (BigUint::from(1u8) << bits) - 1u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_URI: &str = "urn:epc:tag:giai-96:0.0000000.100100012340000";
    const SCENARIO_HEX: &str = "3414000000005b0a59ad7320";

    #[test]
    fn test_encode_known_vector() {
        assert_eq!(encode_epc_hex_from_giai(SCENARIO_URI).unwrap(), SCENARIO_HEX);
        assert_eq!(
            encode_epc_hex_from_giai("urn:epc:tag:giai-96:0.0000000.12312340012341234").unwrap(),
            "34140000002bbe020cca17f2"
        );
    }

    #[test]
    fn test_decode_known_vector() {
        assert_eq!(get_giai_uri_from_epc_hex(SCENARIO_HEX).unwrap(), SCENARIO_URI);
        // Uppercase input decodes the same
        assert_eq!(
            get_giai_uri_from_epc_hex(&SCENARIO_HEX.to_uppercase()).unwrap(),
            SCENARIO_URI
        );
    }

    #[test]
    fn test_decoded_parts() {
        let (uri, parts) = decode_hex_epc(SCENARIO_HEX).unwrap();
        assert_eq!(uri, SCENARIO_URI);
        assert_eq!(parts.filter, 0);
        assert_eq!(parts.partition, 5);
        assert_eq!(parts.company_prefix, "0000000");
        assert_eq!(parts.asset_reference, BigUint::from(100100012340000u64));
    }

    #[test]
    fn test_filter_value_carried() {
        let uri = "urn:epc:tag:giai-96:3.0000000.100100012340000";
        let (hex, parts) = encode_hex_epc(uri).unwrap();
        assert_eq!(parts.filter, 3);
        assert_eq!(&hex[..4], "3474");
        assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), uri);
    }

    #[test]
    fn test_out_of_range_per_length() {
        let cases = [
            "urn:epc:tag:giai-96:0.999999.4611686018427387904",
            "urn:epc:tag:giai-96:0.9999999.288230376151711744",
            "urn:epc:tag:giai-96:0.99999999.36028797018963968",
            "urn:epc:tag:giai-96:0.999999999.4503599627370496",
            "urn:epc:tag:giai-96:0.9999999999.281474976710656",
            "urn:epc:tag:giai-96:0.99999999999.35184372088832",
            "urn:epc:tag:giai-96:0.999999999999.4398046511104",
        ];
        for uri in cases {
            assert_eq!(
                encode_epc_hex_from_giai(uri),
                Err(EpcError::GiaiOutOfRange { uri: uri.to_string() }),
                "{}",
                uri
            );
        }
    }

    #[test]
    fn test_budget_edge_is_representable() {
        let uri = "urn:epc:tag:giai-96:0.999999999999.4398046511103";
        let hex = encode_epc_hex_from_giai(uri).unwrap();
        assert_eq!(hex.len(), 24);
        assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), uri);
    }

    #[test]
    fn test_leading_zero_asset_reference_rejected() {
        let uri = "urn:epc:tag:giai-96:0.0000000.0100100012340000";
        assert!(matches!(
            encode_epc_hex_from_giai(uri),
            Err(EpcError::GiaiOutOfRange { .. })
        ));
    }

    #[test]
    fn test_far_overflow_rejected() {
        let uri = "urn:epc:tag:giai-96:0.0000000.99999999999999999999999999999999";
        assert!(matches!(
            encode_epc_hex_from_giai(uri),
            Err(EpcError::GiaiOutOfRange { .. })
        ));
    }

    #[test]
    fn test_malformed_uri() {
        for uri in [
            "urn:epc:tag:sgtin-96:0.0000000.1",
            "urn:epc:tag:giai-96:0.0000000",
            "urn:epc:tag:giai-96:8.0000000.1",
            "urn:epc:tag:giai-96:0.00000.1",
            "urn:epc:tag:giai-96:0.0000000.1a",
            "urn:epc:tag:giai-96:0.0000000.",
            "giai-96:0.0000000.1",
        ] {
            assert!(
                matches!(encode_epc_hex_from_giai(uri), Err(EpcError::InvalidGiaiUri { .. })),
                "{}",
                uri
            );
        }
    }

    #[test]
    fn test_malformed_hex() {
        for hex in [
            "3414",
            "3414000000005b0a59ad73200",
            "3414000000005b0a59ad732g",
            "3014000000005b0a59ad7320",
            "341c000000005b0a59ad7320",
        ] {
            assert!(
                matches!(get_giai_uri_from_epc_hex(hex), Err(EpcError::InvalidEpcHex { .. })),
                "{}",
                hex
            );
        }
    }

    #[test]
    fn test_to_hex_checks_field_ranges() {
        let parts = GiaiParts::parse_uri(SCENARIO_URI).unwrap();

        let highest_filter = GiaiParts { filter: MAX_FILTER_VALUE, ..parts.clone() };
        let (uri, decoded) = decode_hex_epc(&highest_filter.to_hex().unwrap()).unwrap();
        assert_eq!(decoded, highest_filter);
        assert_eq!(uri, highest_filter.to_uri());

        let bad_filter = GiaiParts { filter: 9, ..parts.clone() };
        assert!(matches!(bad_filter.to_hex(), Err(EpcError::InvalidGiaiUri { .. })));

        let wide_asset = GiaiParts {
            asset_reference: BigUint::from(1u8) << 58u32,
            ..parts.clone()
        };
        assert!(matches!(wide_asset.to_hex(), Err(EpcError::GiaiOutOfRange { .. })));

        let wide_prefix = GiaiParts { company_prefix: "99999999".to_string(), ..parts };
        assert!(matches!(wide_prefix.to_hex(), Err(EpcError::GiaiOutOfRange { .. })));
    }
}
