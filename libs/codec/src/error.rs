//! Codec-level errors for asset reference and GIAI-96 processing
//!
//! Two families matter to callers. [`EpcError::IarEncoding`] means the structural
//! input is wrong and the caller must fix it. [`EpcError::GiaiOutOfRange`] means the
//! input was well formed but cannot be represented in 96 bits. Neither is retryable.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, EpcError>;

/// Codec errors with enough context to tell the user what to change
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EpcError {
    /// Asset reference input violates a structural constraint
    #[error("IAR encoding error: {0}")]
    IarEncoding(IarConstraint),

    /// Round-trip self-check failed: value overflows the 96-bit layout or loses a leading zero
    #[error("GIAI out of range: {uri} is not representable as GIAI-96")]
    GiaiOutOfRange { uri: String },

    /// Tag URI is not a well-formed GIAI-96 URI
    #[error("Invalid GIAI-96 URI {uri}: {reason}")]
    InvalidGiaiUri { uri: String, reason: String },

    /// Hex payload is not a decodable GIAI-96 EPC
    #[error("Invalid GIAI-96 EPC hex {hex}: {reason}")]
    InvalidEpcHex { hex: String, reason: String },
}

impl EpcError {
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGiaiUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_hex(hex: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEpcHex {
            hex: hex.into(),
            reason: reason.into(),
        }
    }

    /// Constraint violated when this is an encoding error
    pub fn constraint(&self) -> Option<&IarConstraint> {
        match self {
            EpcError::IarEncoding(constraint) => Some(constraint),
            _ => None,
        }
    }
}

impl From<IarConstraint> for EpcError {
    fn from(constraint: IarConstraint) -> Self {
        EpcError::IarEncoding(constraint)
    }
}

/// The specific rule an asset reference input broke
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IarConstraint {
    #[error("company prefix {company_prefix} must be 6-12 digits")]
    UnsupportedCompanyPrefix { company_prefix: String },

    #[error("IAR prefix must be numeric")]
    IarPrefixNotNumeric,

    #[error("IAR prefix must not start with 0")]
    IarPrefixLeadingZero,

    #[error("IAR prefix {value} must be between 1 and {max}")]
    IarPrefixOutOfRange { value: String, max: u64 },

    #[error("collection reference must be numeric")]
    CollectionReferenceNotNumeric,

    #[error("item reference must be numeric")]
    ItemReferenceNotNumeric,

    #[error("serial {serial} must be between 0 and 9999")]
    SerialOutOfRange { serial: i64 },

    #[error("collection reference should have {expected} digits, got {actual}")]
    CollectionReferenceDigits { expected: usize, actual: usize },

    #[error("item reference should not exceed {max} digits, got {actual}")]
    ItemReferenceTooLong { max: usize, actual: usize },

    #[error("invalid individual asset reference {reference}: {reason}")]
    MalformedReference { reference: String, reason: String },
}
