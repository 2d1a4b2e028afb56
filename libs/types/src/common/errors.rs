//! Error types for parsing wire vocabulary and textual identifiers

use thiserror::Error;

/// Errors raised while parsing shared types from their textual form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Memory bank name is not one of RESERVED, EPC, TID, USER
    #[error("Unknown memory bank: {0}")]
    UnknownMemoryBank(String),

    /// Numeric memory bank code outside 0-3
    #[error("Invalid memory bank code: {0}")]
    InvalidMemoryBankCode(u8),

    /// Dotted asset reference does not have the collection.item.serial shape
    #[error("Malformed individual asset reference {value}: {reason}")]
    MalformedReference { value: String, reason: String },

    /// Hex string contains non-hex characters
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),
}

impl TypeError {
    pub fn malformed_reference(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
