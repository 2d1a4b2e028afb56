//! # Deployment Filter Derivation
//!
//! A reader can be scoped to one deployment by filtering on the EPC hex prefix that
//! every tag of that deployment shares. Rather than deriving partition bit
//! boundaries in closed form, the prefix is found empirically: encode the smallest
//! and the largest asset reference the deployment can produce and keep the hex they
//! have in common. Every value in between shares that prefix.

use crate::capacity::{get_collection_reference_digits, get_item_reference_digits};
use crate::error::Result;
use crate::giai::encode_epc_hex_from_giai;
use crate::iar::{encode_giai_from_individual_asset_reference, encode_individual_asset_reference};
use epc_types::common::reference::MAX_SERIAL;
use epc_types::FilterSpec;
use tracing::debug;

/// Length of the hex prefix shared by every EPC of this deployment (0 on any encoding failure)
pub fn get_epc_filter_length(iar_prefix: &str, company_prefix: &str) -> usize {
    let low = sample_hex(iar_prefix, company_prefix, '0', 0);
    let high = sample_hex(iar_prefix, company_prefix, '9', MAX_SERIAL.into());

    match (low, high) {
        (Ok(low), Ok(high)) => low
            .bytes()
            .zip(high.bytes())
            .take_while(|(a, b)| a == b)
            .count(),
        (low, high) => {
            debug!(
                iar_prefix,
                company_prefix,
                low_error = ?low.err(),
                high_error = ?high.err(),
                "filter sample encoding failed"
            );
            0
        }
    }
}

/// Hex prefix to filter on for this deployment
pub fn get_epc_filter(iar_prefix: &str, company_prefix: &str) -> Result<String> {
    let length = get_epc_filter_length(iar_prefix, company_prefix);
    let mut hex = sample_hex(iar_prefix, company_prefix, '0', 0)?;
    hex.truncate(length);
    Ok(hex)
}

/// Deployment filter as an EPC-bank [`FilterSpec`] ready for reader operations
pub fn get_epc_filter_spec(iar_prefix: &str, company_prefix: &str) -> Result<FilterSpec> {
    get_epc_filter(iar_prefix, company_prefix).map(FilterSpec::epc_prefix)
}

/// Encode the extreme asset reference whose fields are all `digit`
fn sample_hex(iar_prefix: &str, company_prefix: &str, digit: char, serial: i64) -> Result<String> {
    let collection_digits = get_collection_reference_digits(iar_prefix, company_prefix);
    let item_digits = get_item_reference_digits(iar_prefix, company_prefix);

    let iar = encode_individual_asset_reference(
        company_prefix,
        iar_prefix,
        &digit.to_string().repeat(collection_digits),
        &digit.to_string().repeat(item_digits),
        serial,
    )?;
    let giai = encode_giai_from_individual_asset_reference(&iar, iar_prefix, company_prefix)?;
    encode_epc_hex_from_giai(&giai)
}
