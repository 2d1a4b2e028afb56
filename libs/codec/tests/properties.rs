//! Property-based tests for the GIAI-96 codec

use epc_codec::{
    decode_hex_epc, encode_epc_hex_from_giai, encode_giai_from_individual_asset_reference,
    encode_hex_epc, encode_individual_asset_reference, get_collection_reference_digits,
    get_epc_filter, get_giai_uri_from_epc_hex, get_item_reference_digits, get_max_iar_prefix,
    GiaiParts,
};
use proptest::prelude::*;

/// A company prefix of any supported length together with an IAR prefix in range
fn deployment() -> impl Strategy<Value = (String, String)> {
    (6usize..=12, any::<u64>(), any::<u64>()).prop_map(|(length, cp_seed, prefix_seed)| {
        let company_prefix = format!("{:0>width$}", cp_seed % 10u64.pow(length as u32), width = length);
        let max = get_max_iar_prefix(&company_prefix);
        let iar_prefix = (prefix_seed % max + 1).to_string();
        (company_prefix, iar_prefix)
    })
}

/// A full asset reference that satisfies the deployment's digit widths
fn asset() -> impl Strategy<Value = (String, String, String, String, i64)> {
    (deployment(), any::<u64>(), any::<u64>(), 0i64..=9999).prop_map(
        |((company_prefix, iar_prefix), collection_seed, item_seed, serial)| {
            let collection_digits = get_collection_reference_digits(&iar_prefix, &company_prefix);
            let item_digits = get_item_reference_digits(&iar_prefix, &company_prefix);
            let collection = format!(
                "{:0>width$}",
                collection_seed % 10u64.pow(collection_digits as u32),
                width = collection_digits
            );
            let item = (item_seed % 10u64.pow(item_digits as u32)).to_string();
            (company_prefix, iar_prefix, collection, item, serial)
        },
    )
}

proptest! {
    #[test]
    fn prop_valid_assets_round_trip(
        (company_prefix, iar_prefix, collection, item, serial) in asset()
    ) {
        let iar = encode_individual_asset_reference(&company_prefix, &iar_prefix, &collection, &item, serial)
            .unwrap();
        let giai = encode_giai_from_individual_asset_reference(&iar, &iar_prefix, &company_prefix).unwrap();
        let hex = encode_epc_hex_from_giai(&giai).unwrap();

        prop_assert_eq!(hex.len(), 24);
        prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), giai);
    }

    #[test]
    fn prop_filter_prefixes_every_valid_asset(
        (company_prefix, iar_prefix, collection, item, serial) in asset()
    ) {
        let filter = get_epc_filter(&iar_prefix, &company_prefix).unwrap();
        let iar = encode_individual_asset_reference(&company_prefix, &iar_prefix, &collection, &item, serial)
            .unwrap();
        let giai = encode_giai_from_individual_asset_reference(&iar, &iar_prefix, &company_prefix).unwrap();
        let hex = encode_epc_hex_from_giai(&giai).unwrap();

        prop_assert!(hex.starts_with(&filter), "{} does not start with {}", hex, filter);
    }

    #[test]
    fn prop_decoded_parts_re_encode(
        (company_prefix, iar_prefix, collection, item, serial) in asset(),
        filter in 0u8..=7
    ) {
        let iar = encode_individual_asset_reference(&company_prefix, &iar_prefix, &collection, &item, serial)
            .unwrap();
        let giai = encode_giai_from_individual_asset_reference(&iar, &iar_prefix, &company_prefix).unwrap();
        let uri = GiaiParts { filter, ..GiaiParts::parse_uri(&giai).unwrap() }.to_uri();

        let (hex, encoded) = encode_hex_epc(&uri).unwrap();
        let (decoded_uri, decoded) = decode_hex_epc(&hex).unwrap();
        prop_assert_eq!(decoded.filter, filter);
        prop_assert_eq!(decoded, encoded);
        prop_assert_eq!(decoded_uri, uri);
    }

    #[test]
    fn prop_garbage_hex_never_panics(hex in "[0-9a-fA-F]{0,30}") {
        let _ = get_giai_uri_from_epc_hex(&hex);
    }
}
