//! # Tag Provisioning Service
//!
//! ## Purpose
//!
//! Drives a UHF RFID reader through the sequences that give a tag its identity:
//! write the EPC, lock it, set an access password; and the inverse unlock and
//! reset that returns any tag, whatever state it was left in, to factory defaults.
//!
//! ## Architecture Role
//!
//! ```text
//! epc-codec (hex, filters) ─→ Provisioner ─→ RadioDevice ─→ reader driver
//!                                  ↑              ↑
//!                           status callback    Reader (subscriptions, init)
//! ```
//!
//! - [`device`]: the primitive command set a driver implements
//! - [`reader`]: owned scan/locate subscription handles and shared `init`
//! - [`protocol`]: the write/lock and unlock/reset sequences
//! - [`simulated`]: an in-memory reader used by tests and `tagctl simulate`
//!
//! ## Example
//!
//! ```rust
//! use epc_types::AccessPassword;
//! use tag_provisioning::{Provisioner, SimulatedRadio, SimulatedTag};
//!
//! # tokio_test::block_on(async {
//! let radio = SimulatedRadio::ready();
//! radio.add_tag(SimulatedTag::new("e2801160", "300000000000000000000000"));
//!
//! let password = AccessPassword::new("1a2b3c4d").unwrap();
//! Provisioner::new(&radio, 30)
//!     .sound_enabled(false)
//!     .write_epc_and_lock("3414000000005b0a59ad7320", &password, &AccessPassword::default(), None)
//!     .await
//!     .unwrap();
//!
//! let tag = radio.tag(0).unwrap();
//! assert_eq!(tag.epc(), "3414000000005b0a59ad7320");
//! assert!(tag.locked);
//! # });
//! ```

pub mod device;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod simulated;

pub use device::{
    LocateOptions, LocateValue, LockOptions, RadioDevice, ReadOptions, ScanBatch, ScanOptions,
    WriteOptions,
};
pub use error::{DeviceError, DeviceResult, ProvisioningError, Result};
pub use protocol::{
    Provisioner, ProvisioningPhase, ProvisioningStatus, ResetOutcome, LOCK_KILL_ACCESS_EPC,
    UNLOCK_ALL,
};
pub use reader::{LocateSubscription, Reader, ScanSubscription, SubscriptionId};
pub use simulated::{DeviceCall, Operation, SimulatedRadio, SimulatedTag};
