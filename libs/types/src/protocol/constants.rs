//! Reader protocol constants and basic types
//!
//! These are the fixed values of the Gen2 air interface as the reader driver
//! exposes them. Sequencing logic built on top of them lives in `tag-provisioning`.

use crate::TypeError;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Factory access password of an unprovisioned tag
pub const DEFAULT_ACCESS_PASSWORD: &str = "00000000";

/// Word offset of the protocol-control (PC) word in the EPC bank
pub const EPC_PC_WORD_OFFSET: u32 = 1;

/// Bit offset of the first EPC data bit (after CRC and PC words)
pub const EPC_DATA_BIT_OFFSET: u32 = 16 * 2;

/// Bits per memory word
pub const WORD_BITS: u32 = 16;

/// Hex characters per memory word
pub const WORD_HEX_CHARS: usize = 4;

/// PC word values indexed by EPC length in words (`words << 11`)
pub const EPC_SIZE_PC_VALUES: [&str; 16] = [
    "0000", "0800", "1000", "1800", "2000", "2800", "3000", "3800", "4000", "4800", "5000",
    "5800", "6000", "6800", "7000", "7800",
];

/// PC word for an EPC of `words` words, if representable
pub fn pc_word_for(words: usize) -> Option<&'static str> {
    EPC_SIZE_PC_VALUES.get(words).copied()
}

/// Tag memory bank
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryBank {
    /// Kill and access passwords
    Reserved = 0,
    /// CRC, PC word and the EPC itself
    Epc = 1,
    /// Factory-programmed tag identifier
    Tid = 2,
    /// Free user memory
    User = 3,
}

impl MemoryBank {
    /// Numeric code the reader driver expects
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        Self::try_from(code).map_err(|_| TypeError::InvalidMemoryBankCode(code))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryBank::Reserved => "RESERVED",
            MemoryBank::Epc => "EPC",
            MemoryBank::Tid => "TID",
            MemoryBank::User => "USER",
        }
    }
}

impl fmt::Display for MemoryBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryBank {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RESERVED" => Ok(MemoryBank::Reserved),
            "EPC" => Ok(MemoryBank::Epc),
            "TID" => Ok(MemoryBank::Tid),
            "USER" => Ok(MemoryBank::User),
            _ => Err(TypeError::UnknownMemoryBank(s.to_string())),
        }
    }
}

/// Feedback sounds the reader can play
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    Success = 1,
    Error = 3,
}

impl Sound {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_bank_codes() {
        assert_eq!(MemoryBank::Reserved.code(), 0);
        assert_eq!(MemoryBank::Epc.code(), 1);
        assert_eq!(MemoryBank::from_code(2).unwrap(), MemoryBank::Tid);
        assert_eq!(MemoryBank::from_code(4), Err(TypeError::InvalidMemoryBankCode(4)));
    }

    #[test]
    fn test_memory_bank_names() {
        assert_eq!("epc".parse::<MemoryBank>().unwrap(), MemoryBank::Epc);
        assert_eq!("USER".parse::<MemoryBank>().unwrap(), MemoryBank::User);
        assert!("BANK".parse::<MemoryBank>().is_err());
        assert_eq!(serde_json::to_string(&MemoryBank::Reserved).unwrap(), "\"RESERVED\"");
    }

    #[test]
    fn test_pc_words() {
        assert_eq!(pc_word_for(6), Some("3000"));
        assert_eq!(pc_word_for(1), Some("0800"));
        assert_eq!(pc_word_for(16), None);
        for (words, pc) in EPC_SIZE_PC_VALUES.iter().enumerate() {
            assert_eq!(u16::from_str_radix(pc, 16).unwrap(), (words as u16) << 11);
        }
    }

    #[test]
    fn test_sound_codes() {
        assert_eq!(Sound::Success.code(), 1);
        assert_eq!(Sound::Error.code(), 3);
    }
}
