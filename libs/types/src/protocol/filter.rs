//! Tag selection filter
//!
//! A filter names a contiguous bit range in one memory bank plus the value those
//! bits must hold. Readers apply it both to narrow the visible tag population during
//! scans and to gate reads, writes and locks to matching tags only.

use super::constants::{MemoryBank, EPC_DATA_BIT_OFFSET};
use serde::{Deserialize, Serialize};

/// Bit-range selection criteria for scan, read, write and lock operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Memory bank to compare against
    pub memory_bank: MemoryBank,
    /// Address of the first bit to compare (ptr)
    pub bit_offset: u32,
    /// Number of bits to compare (len)
    pub bit_count: u32,
    /// Expected value as hex, most significant bit first
    pub data: String,
}

impl FilterSpec {
    pub fn new(memory_bank: MemoryBank, bit_offset: u32, bit_count: u32, data: impl Into<String>) -> Self {
        Self {
            memory_bank,
            bit_offset,
            bit_count,
            data: data.into(),
        }
    }

    /// Filter matching every tag whose EPC starts with `data`
    pub fn epc_prefix(data: impl Into<String>) -> Self {
        let data = data.into();
        let bit_count = (data.len() * 4) as u32;
        Self::new(MemoryBank::Epc, EPC_DATA_BIT_OFFSET, bit_count, data)
    }

    /// Check whether a bank's contents (hex, starting at bit 0) satisfy this filter
    pub fn matches(&self, bank_hex: &str) -> bool {
        let bank = bank_hex.as_bytes();
        let data = self.data.as_bytes();
        if (data.len() * 4) < self.bit_count as usize {
            return false;
        }

        (0..self.bit_count as usize).all(|i| {
            match (hex_bit(bank, self.bit_offset as usize + i), hex_bit(data, i)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }
}

fn hex_bit(hex: &[u8], index: usize) -> Option<bool> {
    let nibble = (*hex.get(index / 4)? as char).to_digit(16)?;
    Some((nibble >> (3 - index % 4)) & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epc_prefix_filter() {
        let filter = FilterSpec::epc_prefix("341400000000");
        assert_eq!(filter.memory_bank, MemoryBank::Epc);
        assert_eq!(filter.bit_offset, 32);
        assert_eq!(filter.bit_count, 48);
    }

    #[test]
    fn test_matches_epc_bank() {
        // CRC word, PC word, then EPC
        let bank = "ABCD30003414000000005b0a59ad7320";
        assert!(FilterSpec::epc_prefix("3414").matches(bank));
        assert!(FilterSpec::epc_prefix("3414000000005B0A").matches(bank));
        assert!(!FilterSpec::epc_prefix("3415").matches(bank));
    }

    #[test]
    fn test_matches_partial_nibble() {
        // 0x3 = 0011, so the first three bits of "2" (0010) agree
        let filter = FilterSpec::new(MemoryBank::User, 0, 3, "2");
        assert!(filter.matches("3"));
        let filter = FilterSpec::new(MemoryBank::User, 0, 4, "2");
        assert!(!filter.matches("3"));
    }

    #[test]
    fn test_short_bank_never_matches() {
        let filter = FilterSpec::new(MemoryBank::Epc, 32, 16, "3414");
        assert!(!filter.matches("ABCD3000"));
        let filter = FilterSpec::new(MemoryBank::Epc, 0, 16, "34");
        assert!(!filter.matches("3414"));
    }
}
