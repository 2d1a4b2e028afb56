//! # EPC Shared Types
//!
//! Data model shared by the EPC codec and the tag provisioning service.
//!
//! ## Design Philosophy
//!
//! - **Pure Data**: no encoding rules live here; bit packing belongs in `epc-codec`
//! - **Wire Vocabulary**: memory banks, filters and PC words as the reader sees them
//! - **Textual Identifiers**: asset references stay digit strings so leading zeros survive
//!
//! ## Quick Start
//!
//! ```rust
//! use epc_types::{FilterSpec, IndividualAssetReference, MemoryBank};
//!
//! let iar: IndividualAssetReference = "0010.1234.0000".parse().unwrap();
//! assert_eq!(iar.serial, 0);
//!
//! let filter = FilterSpec::epc_prefix("3414");
//! assert_eq!(filter.memory_bank, MemoryBank::Epc);
//! assert_eq!(filter.bit_count, 16);
//! ```

pub mod common;
pub mod protocol;

pub use common::errors::TypeError;
pub use common::observation::TagObservation;
pub use common::password::AccessPassword;
pub use common::reference::IndividualAssetReference;
pub use protocol::constants::*;
pub use protocol::filter::FilterSpec;
