//! # EPC Codec
//!
//! ## Purpose
//!
//! This crate holds the encoding rules for GIAI-96 asset tags:
//! - **Capacity**: how many digits fit after a company prefix and IAR prefix
//! - **Asset References**: strict validation of collection/item/serial triples
//! - **GIAI-96**: tag URI ↔ 24-character hex with a round-trip self-check
//! - **Filters**: the hex prefix shared by every tag of a deployment
//!
//! ## Architecture Role
//!
//! ```text
//! capacity → iar → giai → filter → tag-provisioning
//!    ↑                                   ↓
//! partition table              write payloads / reader filters
//! ```
//!
//! Everything here is pure and synchronous. A failed encode never reaches the
//! reader: the full pipeline completes (or fails) before any tag write is issued.
//!
//! ## Example
//!
//! ```rust
//! use epc_codec::{
//!     encode_epc_hex_from_giai, encode_giai_from_individual_asset_reference,
//!     encode_individual_asset_reference, get_giai_uri_from_epc_hex,
//! };
//!
//! let iar = encode_individual_asset_reference("0000000", "1", "0010", "1234", 0).unwrap();
//! assert_eq!(iar, "0010.1234.0000");
//!
//! let giai = encode_giai_from_individual_asset_reference(&iar, "1", "0000000").unwrap();
//! let hex = encode_epc_hex_from_giai(&giai).unwrap();
//! assert_eq!(hex.len(), 24);
//! assert_eq!(get_giai_uri_from_epc_hex(&hex).unwrap(), giai);
//! ```

pub mod capacity;
pub mod error;
pub mod filter;
pub mod giai;
pub mod iar;
pub mod partition;

pub use capacity::{
    get_collection_reference_digits, get_item_reference_digits, get_max_iar_prefix,
    get_max_ns_iar_prefix, get_usable_iar_digits,
};
pub use error::{EpcError, IarConstraint, Result};
pub use filter::{get_epc_filter, get_epc_filter_length, get_epc_filter_spec};
pub use giai::{
    decode_hex_epc, encode_epc_hex_from_giai, encode_hex_epc, get_giai_uri_from_epc_hex,
    GiaiParts, GIAI_96_URI_PREFIX,
};
pub use iar::{encode_giai_from_individual_asset_reference, encode_individual_asset_reference};
pub use partition::{PartitionEntry, EPC_HEX_LEN, GIAI_96_HEADER, GIAI_96_PARTITIONS};

pub use epc_types::common::reference::{MAX_SERIAL, SERIAL_DIGITS};
