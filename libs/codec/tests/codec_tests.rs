//! # EPC Codec Integration Tests
//!
//! End-to-end checks across capacity, asset reference encoding, GIAI-96 hex and
//! filter derivation through the public API only.

use epc_codec::{
    encode_epc_hex_from_giai, encode_giai_from_individual_asset_reference,
    encode_individual_asset_reference, get_collection_reference_digits, get_epc_filter,
    get_epc_filter_length, get_giai_uri_from_epc_hex, get_item_reference_digits,
    get_max_iar_prefix, get_usable_iar_digits, EpcError, IarConstraint, MAX_SERIAL,
};

const COMPANY_PREFIXES: [&str; 7] = [
    "123456",
    "1234567",
    "12345678",
    "123456789",
    "1234567890",
    "12345678901",
    "123456789012",
];

/// Encode the asset reference whose fields are all `digit` through to hex
fn encode_extreme(company_prefix: &str, iar_prefix: &str, digit: char) -> (String, String) {
    let collection = digit.to_string().repeat(get_collection_reference_digits(iar_prefix, company_prefix));
    let item = digit.to_string().repeat(get_item_reference_digits(iar_prefix, company_prefix));
    let iar = encode_individual_asset_reference(
        company_prefix,
        iar_prefix,
        &collection,
        &item,
        MAX_SERIAL.into(),
    )
    .unwrap_or_else(|e| panic!("{}.{}: {}", company_prefix, iar_prefix, e));
    let giai = encode_giai_from_individual_asset_reference(&iar, iar_prefix, company_prefix).unwrap();
    let hex = encode_epc_hex_from_giai(&giai)
        .unwrap_or_else(|e| panic!("{}.{}: {}", company_prefix, iar_prefix, e));
    (giai, hex)
}

/// IAR prefixes at which the usable digit count changes, plus both range ends
fn edge_iar_prefixes(company_prefix: &str) -> Vec<u64> {
    let max = get_max_iar_prefix(company_prefix);
    let mut edges = vec![1, max];
    let mut previous = get_usable_iar_digits("1", company_prefix);
    for iar_prefix in 2..=max {
        let usable = get_usable_iar_digits(&iar_prefix.to_string(), company_prefix);
        if usable != previous {
            edges.push(iar_prefix - 1);
            edges.push(iar_prefix);
            previous = usable;
        }
    }
    edges.sort_unstable();
    edges.dedup();
    edges
}

#[test]
fn test_field_digits_fill_usable_budget_for_every_prefix() {
    for company_prefix in COMPANY_PREFIXES {
        let max = get_max_iar_prefix(company_prefix);
        assert!(max > 0);
        for iar_prefix in 1..=max {
            let iar_prefix = iar_prefix.to_string();
            let usable = get_usable_iar_digits(&iar_prefix, company_prefix);
            let collection = get_collection_reference_digits(&iar_prefix, company_prefix);
            let item = get_item_reference_digits(&iar_prefix, company_prefix);

            assert!(usable >= 12, "{}.{} usable {}", company_prefix, iar_prefix, usable);
            assert!(collection + item + 4 <= usable, "{}.{}", company_prefix, iar_prefix);
            // Only the 4/6 digit caps may leave budget unused
            if usable <= 14 {
                assert_eq!(collection + item + 4, usable, "{}.{}", company_prefix, iar_prefix);
            } else {
                assert_eq!((collection, item), (4, 6), "{}.{}", company_prefix, iar_prefix);
            }
        }
    }
}

#[test]
fn test_usable_digits_never_increase_with_prefix_value_of_same_length() {
    for company_prefix in COMPANY_PREFIXES {
        let max = get_max_iar_prefix(company_prefix);
        let mut previous: Option<(usize, usize)> = None;
        for iar_prefix in 1..=max {
            let iar_prefix = iar_prefix.to_string();
            let current = (iar_prefix.len(), get_usable_iar_digits(&iar_prefix, company_prefix));
            if let Some((len, usable)) = previous {
                if len == current.0 {
                    assert!(current.1 <= usable, "{}.{}", company_prefix, iar_prefix);
                }
            }
            previous = Some(current);
        }
    }
}

#[test]
fn test_extremes_round_trip_at_every_edge() {
    for company_prefix in COMPANY_PREFIXES {
        for iar_prefix in edge_iar_prefixes(company_prefix) {
            let iar_prefix = iar_prefix.to_string();
            for digit in ['0', '9'] {
                let (giai, hex) = encode_extreme(company_prefix, &iar_prefix, digit);
                assert_eq!(hex.len(), 24);
                assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), giai);
            }
        }
    }
}

#[test]
fn test_extremes_round_trip_for_every_prefix_of_long_company_prefixes() {
    for company_prefix in ["123456789", "1234567890", "12345678901", "123456789012"] {
        for iar_prefix in 1..=get_max_iar_prefix(company_prefix) {
            let (giai, hex) = encode_extreme(company_prefix, &iar_prefix.to_string(), '9');
            assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), giai);
        }
    }
}

#[test]
fn test_scenario_seven_digit_company_prefix() {
    let iar = encode_individual_asset_reference("0000000", "1", "0010", "1234", 0).unwrap();
    assert_eq!(iar, "0010.1234.0000");

    let giai = encode_giai_from_individual_asset_reference(&iar, "1", "0000000").unwrap();
    assert!(giai.starts_with("urn:epc:tag:giai-96:0.0000000.1"));
    assert_eq!(giai, "urn:epc:tag:giai-96:0.0000000.100100012340000");

    let hex = encode_epc_hex_from_giai(&giai).unwrap();
    assert_eq!(hex.len(), 24);
    assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), giai);
}

#[test]
fn test_encoding_boundaries() {
    let encode = |iar_prefix: &str, collection: &str, serial: i64| {
        encode_individual_asset_reference("0000000", iar_prefix, collection, "1", serial)
    };
    let max = get_max_iar_prefix("0000000").to_string();
    let over_max = (get_max_iar_prefix("0000000") + 1).to_string();

    assert!(encode(&max, "0000", 0).is_ok());
    for result in [
        encode("0", "0000", 0),
        encode(&over_max, "0000", 0),
        encode("1", "000", 0),
        encode("1", "00000", 0),
        encode("1", "0000", -1),
        encode("1", "0000", 10000),
    ] {
        assert!(matches!(result, Err(EpcError::IarEncoding(_))), "{:?}", result);
    }
}

#[test]
fn test_collection_digits_depend_on_company_prefix() {
    assert_eq!(
        encode_individual_asset_reference("12345678901", "1", "1234", "1234", 1234),
        Err(EpcError::IarEncoding(IarConstraint::CollectionReferenceDigits {
            expected: 3,
            actual: 4
        }))
    );
    assert_eq!(
        encode_individual_asset_reference("123456789012", "1", "1234", "12345", 1234),
        Err(EpcError::IarEncoding(IarConstraint::ItemReferenceTooLong { max: 4, actual: 5 }))
    );
}

#[test]
fn test_filter_prefixes_every_serial() {
    let filter = get_epc_filter("123", "0000000").unwrap();
    assert_eq!(filter.len(), get_epc_filter_length("123", "0000000"));
    for serial in 0..=i64::from(MAX_SERIAL) {
        let iar = encode_individual_asset_reference("0000000", "123", "4321", "98765", serial).unwrap();
        let giai = encode_giai_from_individual_asset_reference(&iar, "123", "0000000").unwrap();
        let hex = encode_epc_hex_from_giai(&giai).unwrap();
        assert!(hex.starts_with(&filter), "{} does not start with {}", hex, filter);
    }
}

#[test]
fn test_filter_defined_at_every_edge() {
    for company_prefix in COMPANY_PREFIXES {
        for iar_prefix in edge_iar_prefixes(company_prefix) {
            let iar_prefix = iar_prefix.to_string();
            let length = get_epc_filter_length(&iar_prefix, company_prefix);
            // Header and control byte are always shared
            assert!(length >= 4, "{}.{}", company_prefix, iar_prefix);
            assert!(length < 24, "{}.{}", company_prefix, iar_prefix);

            let (_, low) = encode_extreme(company_prefix, &iar_prefix, '0');
            let (_, high) = encode_extreme(company_prefix, &iar_prefix, '9');
            let filter = get_epc_filter(&iar_prefix, company_prefix).unwrap();
            assert!(low.starts_with(&filter));
            assert!(high.starts_with(&filter));
        }
    }
}
