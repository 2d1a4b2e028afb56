//! # GIAI-96 Partition Table
//!
//! The 96-bit GIAI layout is `header:8 | filter:3 | partition:3 | company prefix | asset reference`.
//! The last two fields share 82 bits; how they split depends on how many decimal
//! digits the company prefix has. Longer company prefixes leave fewer bits, and so a
//! smaller numeric budget, for the asset reference.
//!
//! ```text
//! partition  company prefix        asset reference
//!            bits   digits         bits   budget (2^bits - 1)
//!    0        40      12            42    4398046511103
//!    1        37      11            45    35184372088831
//!    2        34      10            48    281474976710655
//!    3        30       9            52    4503599627370495
//!    4        27       8            55    36028797018963967
//!    5        24       7            58    288230376151711743
//!    6        20       6            62    4611686018427387903
//! ```

/// GIAI-96 header byte
pub const GIAI_96_HEADER: u8 = 0x34;

/// Header field width
pub const HEADER_BITS: u32 = 8;

/// Filter value field width
pub const FILTER_BITS: u32 = 3;

/// Partition value field width
pub const PARTITION_BITS: u32 = 3;

/// Bits shared by company prefix and asset reference
pub const PAYLOAD_BITS: u32 = 82;

/// Total EPC width
pub const EPC_BITS: u32 = HEADER_BITS + FILTER_BITS + PARTITION_BITS + PAYLOAD_BITS;

/// Hex characters in a rendered EPC
pub const EPC_HEX_LEN: usize = (EPC_BITS / 4) as usize;

/// Largest filter value the 3-bit field holds
pub const MAX_FILTER_VALUE: u8 = 7;

/// One row of the partition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub partition: u8,
    pub company_prefix_bits: u32,
    pub company_prefix_digits: usize,
    pub asset_reference_bits: u32,
    /// Largest asset reference the field can hold, in decimal
    pub iar_budget: &'static str,
}

pub const GIAI_96_PARTITIONS: [PartitionEntry; 7] = [
    PartitionEntry {
        partition: 0,
        company_prefix_bits: 40,
        company_prefix_digits: 12,
        asset_reference_bits: 42,
        iar_budget: "4398046511103",
    },
    PartitionEntry {
        partition: 1,
        company_prefix_bits: 37,
        company_prefix_digits: 11,
        asset_reference_bits: 45,
        iar_budget: "35184372088831",
    },
    PartitionEntry {
        partition: 2,
        company_prefix_bits: 34,
        company_prefix_digits: 10,
        asset_reference_bits: 48,
        iar_budget: "281474976710655",
    },
    PartitionEntry {
        partition: 3,
        company_prefix_bits: 30,
        company_prefix_digits: 9,
        asset_reference_bits: 52,
        iar_budget: "4503599627370495",
    },
    PartitionEntry {
        partition: 4,
        company_prefix_bits: 27,
        company_prefix_digits: 8,
        asset_reference_bits: 55,
        iar_budget: "36028797018963967",
    },
    PartitionEntry {
        partition: 5,
        company_prefix_bits: 24,
        company_prefix_digits: 7,
        asset_reference_bits: 58,
        iar_budget: "288230376151711743",
    },
    PartitionEntry {
        partition: 6,
        company_prefix_bits: 20,
        company_prefix_digits: 6,
        asset_reference_bits: 62,
        iar_budget: "4611686018427387903",
    },
];

/// Look up the partition row for a company prefix digit count
pub fn by_company_prefix_digits(digits: usize) -> Option<&'static PartitionEntry> {
    GIAI_96_PARTITIONS
        .iter()
        .find(|entry| entry.company_prefix_digits == digits)
}

/// Look up the partition row for a decoded partition value
pub fn by_partition(partition: u8) -> Option<&'static PartitionEntry> {
    GIAI_96_PARTITIONS.get(partition as usize)
}

/// Partition row for a company prefix, if it is all digits and of a mapped length
pub fn for_company_prefix(company_prefix: &str) -> Option<&'static PartitionEntry> {
    if !is_numeric(company_prefix) {
        return None;
    }
    by_company_prefix_digits(company_prefix.len())
}

/// Non-empty and ASCII digits only
pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_layout_widths() {
        assert_eq!(EPC_BITS, 96);
        assert_eq!(EPC_HEX_LEN, 24);
        for entry in &GIAI_96_PARTITIONS {
            assert_eq!(entry.company_prefix_bits + entry.asset_reference_bits, PAYLOAD_BITS);
        }
    }

    #[test]
    fn test_budget_is_field_maximum() {
        for entry in &GIAI_96_PARTITIONS {
            let max = (BigUint::from(1u8) << entry.asset_reference_bits) - 1u8;
            assert_eq!(max.to_str_radix(10), entry.iar_budget, "partition {}", entry.partition);
        }
    }

    #[test]
    fn test_company_prefix_fits_its_field() {
        for entry in &GIAI_96_PARTITIONS {
            let largest = BigUint::from(10u8).pow(entry.company_prefix_digits as u32) - 1u8;
            assert!(largest.bits() <= entry.company_prefix_bits as u64);
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(by_company_prefix_digits(7).unwrap().partition, 5);
        assert_eq!(by_partition(0).unwrap().company_prefix_digits, 12);
        assert!(by_partition(7).is_none());
        assert!(by_company_prefix_digits(5).is_none());
        assert!(for_company_prefix("12345a").is_none());
        assert_eq!(for_company_prefix("0000000").unwrap().asset_reference_bits, 58);
    }
}
