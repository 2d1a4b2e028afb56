//! # Individual Asset Reference Encoding
//!
//! Validates a (collection reference, item reference, serial) triple against the
//! deployment's capacity rules and renders it in dotted form, then builds the
//! GIAI-96 tag URI that carries it. Widths come from [`crate::capacity`]; a
//! mismatch is rejected, never truncated.

use crate::capacity::{
    get_collection_reference_digits, get_item_reference_digits, get_max_iar_prefix,
};
use crate::error::{IarConstraint, Result};
use crate::giai::GIAI_96_URI_PREFIX;
use crate::partition::{self, is_numeric};
use epc_types::common::reference::MAX_SERIAL;
use epc_types::IndividualAssetReference;

/// Validate the parts of an asset reference and render its dotted form
/// (`collection.item.serial`, serial zero-padded to 4 digits)
pub fn encode_individual_asset_reference(
    company_prefix: &str,
    iar_prefix: &str,
    collection_reference: &str,
    item_reference: &str,
    serial: i64,
) -> Result<String> {
    validate_iar_prefix(company_prefix, iar_prefix)?;

    if !is_numeric(collection_reference) {
        return Err(IarConstraint::CollectionReferenceNotNumeric.into());
    }
    if !is_numeric(item_reference) {
        return Err(IarConstraint::ItemReferenceNotNumeric.into());
    }
    let serial = u16::try_from(serial)
        .ok()
        .filter(|s| *s <= MAX_SERIAL)
        .ok_or(IarConstraint::SerialOutOfRange { serial })?;

    let collection_digits = get_collection_reference_digits(iar_prefix, company_prefix);
    if collection_reference.len() != collection_digits {
        return Err(IarConstraint::CollectionReferenceDigits {
            expected: collection_digits,
            actual: collection_reference.len(),
        }
        .into());
    }

    let item_digits = get_item_reference_digits(iar_prefix, company_prefix);
    if item_reference.len() > item_digits {
        return Err(IarConstraint::ItemReferenceTooLong {
            max: item_digits,
            actual: item_reference.len(),
        }
        .into());
    }

    Ok(IndividualAssetReference::new(collection_reference, item_reference, serial).to_string())
}

/// Build the GIAI-96 tag URI for an asset reference.
///
/// The dotted form has its item reference re-padded to the deployment's item width
/// before the dots are removed; an undotted reference is taken as final digits.
pub fn encode_giai_from_individual_asset_reference(
    individual_asset_reference: &str,
    iar_prefix: &str,
    company_prefix: &str,
) -> Result<String> {
    if partition::for_company_prefix(company_prefix).is_none() {
        return Err(IarConstraint::UnsupportedCompanyPrefix {
            company_prefix: company_prefix.to_string(),
        }
        .into());
    }
    if !is_numeric(iar_prefix) {
        return Err(IarConstraint::IarPrefixNotNumeric.into());
    }

    let asset_digits = if individual_asset_reference.contains('.') {
        let iar: IndividualAssetReference =
            individual_asset_reference
                .parse()
                .map_err(|e: epc_types::TypeError| IarConstraint::MalformedReference {
                    reference: individual_asset_reference.to_string(),
                    reason: e.to_string(),
                })?;
        iar.asset_digits(get_item_reference_digits(iar_prefix, company_prefix))
    } else if is_numeric(individual_asset_reference) {
        individual_asset_reference.to_string()
    } else {
        return Err(IarConstraint::MalformedReference {
            reference: individual_asset_reference.to_string(),
            reason: "must be numeric or collection.item.serial".to_string(),
        }
        .into());
    };

    Ok(format!(
        "{}0.{}.{}{}",
        GIAI_96_URI_PREFIX, company_prefix, iar_prefix, asset_digits
    ))
}

fn validate_iar_prefix(company_prefix: &str, iar_prefix: &str) -> Result<()> {
    if partition::for_company_prefix(company_prefix).is_none() {
        return Err(IarConstraint::UnsupportedCompanyPrefix {
            company_prefix: company_prefix.to_string(),
        }
        .into());
    }
    if !is_numeric(iar_prefix) {
        return Err(IarConstraint::IarPrefixNotNumeric.into());
    }

    let max = get_max_iar_prefix(company_prefix);
    let out_of_range = || IarConstraint::IarPrefixOutOfRange {
        value: iar_prefix.to_string(),
        max,
    };
    let value: u64 = iar_prefix.parse().map_err(|_| out_of_range())?;
    if value == 0 {
        return Err(out_of_range().into());
    }
    if iar_prefix.starts_with('0') {
        return Err(IarConstraint::IarPrefixLeadingZero.into());
    }
    if value > max {
        return Err(out_of_range().into());
    }
    Ok(())
}
