//! Error types for reader operations and provisioning sequences

use crate::protocol::ProvisioningPhase;
use thiserror::Error;

/// Result type alias for device boundary calls
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

/// Result type alias for provisioning sequences
pub type Result<T> = std::result::Result<T, ProvisioningError>;

/// Failure reported by the reader device boundary.
///
/// Rejections are opaque: the driver's message is carried for display only and
/// callers classify failures by which step raised them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The reader refused or failed the operation
    #[error("{operation} rejected by reader: {message}")]
    Rejected {
        /// Device call that failed (e.g. "write", "lock")
        operation: &'static str,
        /// Driver supplied detail
        message: String,
    },

    /// Operation issued before `init` completed
    #[error("Reader not initialized")]
    NotInitialized,

    /// Reader is occupied by a scan or locate
    #[error("Reader busy: {0}")]
    Busy(&'static str),
}

impl DeviceError {
    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }
}

/// Failure of a write/lock or unlock/reset sequence
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// A device call failed; `phase` is the step that was in progress
    #[error("{phase} failed: {source}")]
    Step {
        phase: ProvisioningPhase,
        #[source]
        source: DeviceError,
    },

    /// EPC payload cannot be written to the EPC bank
    #[error("Invalid EPC {epc:?}: {reason}")]
    InvalidEpc { epc: String, reason: String },
}

impl ProvisioningError {
    pub fn step(phase: ProvisioningPhase, source: DeviceError) -> Self {
        Self::Step { phase, source }
    }

    /// Phase that failed, if the failure came from the device
    pub fn phase(&self) -> Option<ProvisioningPhase> {
        match self {
            ProvisioningError::Step { phase, .. } => Some(*phase),
            ProvisioningError::InvalidEpc { .. } => None,
        }
    }
}
