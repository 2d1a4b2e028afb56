//! # Capacity Calculator
//!
//! Decides how many decimal digits of asset-identifying data fit after a company
//! prefix and a deployment's IAR prefix. Every function here is total: malformed or
//! unmapped input yields 0 instead of an error, and the encoder in [`crate::iar`]
//! performs the strict validation.
//!
//! The two special cases below (the `-1` correction in [`get_usable_iar_digits`] and
//! the fixed 3-digit collection reference at 13 usable digits) come from the
//! partition table, not from a closed-form rule. They are kept as literal cases and
//! covered by exhaustive per-length tests.

use crate::partition::{self, is_numeric};
use epc_types::common::reference::SERIAL_DIGITS;

/// Trailing budget digits always left for collection, item and serial
const RESERVED_BUDGET_DIGITS: usize = 12;

/// Longest trim probed by [`get_max_ns_iar_prefix`]
const MAX_NS_TRIM_DIGITS: usize = 14;

const MAX_COLLECTION_REFERENCE_DIGITS: usize = 4;
const MAX_ITEM_REFERENCE_DIGITS: usize = 6;

/// Usable digit count at which the collection reference shrinks to 3 digits
const SHORT_COLLECTION_USABLE_DIGITS: usize = 13;
const SHORT_COLLECTION_DIGITS: usize = 3;

/// Largest IAR prefix the company prefix allows (0 when the company prefix is invalid)
pub fn get_max_iar_prefix(company_prefix: &str) -> u64 {
    let Some(entry) = partition::for_company_prefix(company_prefix) else {
        return 0;
    };
    budget_head(entry.iar_budget, RESERVED_BUDGET_DIGITS)
        .map(|head| head.saturating_sub(1))
        .unwrap_or(0)
}

/// Variant of [`get_max_iar_prefix`] for budgets with fewer orders of magnitude:
/// probes trims of 14 down to 1 trailing digits and uses the first that leaves a prefix.
pub fn get_max_ns_iar_prefix(company_prefix: &str) -> u64 {
    let Some(entry) = partition::for_company_prefix(company_prefix) else {
        return 0;
    };
    (1..=MAX_NS_TRIM_DIGITS)
        .rev()
        .find_map(|trim| budget_head(entry.iar_budget, trim))
        .map(|head| head.saturating_sub(1))
        .unwrap_or(0)
}

/// Digits left for collection reference, item reference and serial once the company
/// prefix and IAR prefix are fixed
pub fn get_usable_iar_digits(iar_prefix: &str, company_prefix: &str) -> usize {
    let Some(entry) = partition::for_company_prefix(company_prefix) else {
        return 0;
    };
    if !is_numeric(iar_prefix) {
        return 0;
    }

    let budget = entry.iar_budget;
    let prefix_len = iar_prefix.len();
    if prefix_len >= budget.len() {
        return 0;
    }

    // Equal-length digit strings compare the same as their values
    let ceiling = &budget[..prefix_len];
    if iar_prefix < ceiling {
        budget.len() - prefix_len
    } else {
        budget.len() - prefix_len - 1
    }
}

/// Exact number of digits a collection reference must have
pub fn get_collection_reference_digits(iar_prefix: &str, company_prefix: &str) -> usize {
    collection_digits_for(get_usable_iar_digits(iar_prefix, company_prefix))
}

/// Maximum number of digits an item reference may have
pub fn get_item_reference_digits(iar_prefix: &str, company_prefix: &str) -> usize {
    let usable = get_usable_iar_digits(iar_prefix, company_prefix);
    let collection = collection_digits_for(usable);
    usable
        .saturating_sub(SERIAL_DIGITS + collection)
        .min(MAX_ITEM_REFERENCE_DIGITS)
}

fn collection_digits_for(usable: usize) -> usize {
    if usable == SHORT_COLLECTION_USABLE_DIGITS {
        return SHORT_COLLECTION_DIGITS;
    }
    usable
        .saturating_sub(SERIAL_DIGITS + MAX_COLLECTION_REFERENCE_DIGITS)
        .min(MAX_COLLECTION_REFERENCE_DIGITS)
}

/// Budget with `trim` trailing digits removed, parsed; `None` when nothing is left
fn budget_head(budget: &str, trim: usize) -> Option<u64> {
    let keep = budget.len().checked_sub(trim).filter(|keep| *keep > 0)?;
    budget[..keep].parse().ok()
}
