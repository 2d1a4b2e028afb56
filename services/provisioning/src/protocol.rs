//! # Tag Provisioning Sequences
//!
//! Two serial, filtered sequences over a [`RadioDevice`]:
//!
//! ```text
//! write_epc_and_lock:  write data → lock (0a82a0) → set password → done
//! unlock_and_reset:    reset data (old pw, then default pw) → unlock → remove password → done
//! ```
//!
//! Every step after the first is scoped by a filter on the bytes the first step
//! just wrote, so a crowded field cannot redirect the lock or password write to a
//! neighbouring tag. Each device call is issued at most once; the only retry is the
//! reset write falling back to the default password.

use crate::device::{LockOptions, RadioDevice, WriteOptions};
use crate::error::{DeviceError, DeviceResult, ProvisioningError, Result};
use epc_types::{
    pc_word_for, AccessPassword, FilterSpec, MemoryBank, Sound, EPC_PC_WORD_OFFSET,
    EPC_SIZE_PC_VALUES, WORD_HEX_CHARS,
};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Locks the kill password, access password and EPC banks
pub const LOCK_KILL_ACCESS_EPC: &str = "0a82a0";

/// Clears every lock bit
pub const UNLOCK_ALL: &str = "000000";

/// RESERVED bank words holding the kill and access passwords
pub const RESERVED_PASSWORD_WORDS: u32 = 4;

/// Words written by a reset: PC word, one EPC word and a 32-bit nonce
pub const RESET_WORDS: u32 = 4;

/// Pause after a skipped unlock before the reader accepts the next command
pub const UNLOCK_SETTLE: Duration = Duration::from_millis(300);

/// Step of a provisioning sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningPhase {
    WriteData,
    Lock,
    SetPassword,
    ResetData,
    Unlock,
    RemovePassword,
}

impl fmt::Display for ProvisioningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisioningPhase::WriteData => "write data",
            ProvisioningPhase::Lock => "lock",
            ProvisioningPhase::SetPassword => "set password",
            ProvisioningPhase::ResetData => "reset data",
            ProvisioningPhase::Unlock => "unlock",
            ProvisioningPhase::RemovePassword => "remove password",
        };
        f.write_str(name)
    }
}

/// Progress report passed to the status callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStatus {
    Started(ProvisioningPhase),
    Failed(ProvisioningPhase),
    /// Step failed but the sequence continues
    Skipped(ProvisioningPhase),
    Done,
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ProvisioningPhase::*;
        use ProvisioningStatus::*;

        let text = match self {
            Started(WriteData) => "Writing data...",
            Failed(WriteData) => "Failed on writing data",
            Started(Lock) => "Initializing lock...",
            Failed(Lock) => "Failed on initializing lock",
            Started(SetPassword) => "Setting password...",
            Failed(SetPassword) => "Failed on setting password",
            Started(ResetData) => "Resetting data...",
            Failed(ResetData) => "Failed while resetting data",
            Started(Unlock) => "Unlocking tag...",
            Failed(Unlock) => "Failed while unlocking tag",
            Skipped(Unlock) => "Unlocking tag... skipped",
            Started(RemovePassword) => "Removing password...",
            Failed(RemovePassword) => "Failed while removing password",
            Skipped(phase) => return write!(f, "{} skipped", phase),
            Done => "Done",
        };
        f.write_str(text)
    }
}

/// Result of a successful reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    /// False when the supplied password was rejected and the default one worked
    pub was_locked: bool,
    /// Random marker written into the EPC bank to address this tag afterwards
    pub nonce: String,
}

type StatusCallback<'a> = Box<dyn Fn(&ProvisioningStatus) + Send + Sync + 'a>;

/// Runs provisioning sequences against one device
pub struct Provisioner<'a, D: ?Sized> {
    device: &'a D,
    power: u32,
    sound_enabled: bool,
    on_status: Option<StatusCallback<'a>>,
}

impl<'a, D: RadioDevice + ?Sized> Provisioner<'a, D> {
    pub fn new(device: &'a D, power: u32) -> Self {
        Self {
            device,
            power,
            sound_enabled: true,
            on_status: None,
        }
    }

    pub fn sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Observe progress; the callback never influences the sequence
    pub fn on_status(mut self, callback: impl Fn(&ProvisioningStatus) + Send + Sync + 'a) -> Self {
        self.on_status = Some(Box::new(callback));
        self
    }

    /// Write `epc` to the tag matching `filter`, lock it and set `new_password`.
    ///
    /// Failures and what they leave behind:
    /// - write data: nothing changed on the tag
    /// - lock: new data, still unlocked under `old_password`; retrying is safe
    /// - set password: new data, locked, password still `old_password`
    pub async fn write_epc_and_lock(
        &self,
        epc: &str,
        new_password: &AccessPassword,
        old_password: &AccessPassword,
        filter: Option<&FilterSpec>,
    ) -> Result<()> {
        let epc = epc.to_ascii_lowercase();
        let pc_word = epc_pc_word(&epc)?;
        let words = (epc.len() / WORD_HEX_CHARS) as u32;
        info!(%epc, words, "Writing EPC and locking tag");

        self.step(
            ProvisioningPhase::WriteData,
            self.device.write(&WriteOptions {
                power: self.power,
                memory_bank: MemoryBank::Epc,
                offset: EPC_PC_WORD_OFFSET,
                count: words + 1,
                access_password: old_password.clone(),
                data: format!("{}{}", pc_word, epc),
                filter: filter.cloned(),
                sound_enabled: false,
            }),
        )
        .await?;

        let written = FilterSpec::epc_prefix(epc.as_str());

        self.step(
            ProvisioningPhase::Lock,
            self.device.lock(&LockOptions {
                power: self.power,
                access_password: old_password.clone(),
                code: LOCK_KILL_ACCESS_EPC.to_string(),
                filter: Some(written.clone()),
                sound_enabled: false,
            }),
        )
        .await?;

        self.step(
            ProvisioningPhase::SetPassword,
            self.device.write(&WriteOptions {
                power: self.power,
                memory_bank: MemoryBank::Reserved,
                offset: 0,
                count: RESERVED_PASSWORD_WORDS,
                access_password: old_password.clone(),
                data: new_password.reserved_bank_data(),
                filter: Some(written),
                sound_enabled: false,
            }),
        )
        .await?;

        self.finish();
        Ok(())
    }

    /// Return the tag matching `filter` to an unlocked, default-password, blank-EPC state.
    ///
    /// Works whether the tag was never provisioned, partially provisioned or fully
    /// locked: if `old_password` is rejected the reset is retried with the default
    /// password, and the unlock that follows uses whichever password worked.
    pub async fn unlock_and_reset(
        &self,
        old_password: &AccessPassword,
        filter: Option<&FilterSpec>,
    ) -> Result<ResetOutcome> {
        self.report(ProvisioningStatus::Started(ProvisioningPhase::ResetData));

        let nonce = hex::encode(rand::random::<[u8; 4]>());
        let reset_pc = EPC_SIZE_PC_VALUES[1];
        let blank_word = "0".repeat(WORD_HEX_CHARS);
        let reset = |access_password: AccessPassword| WriteOptions {
            power: self.power,
            memory_bank: MemoryBank::Epc,
            offset: EPC_PC_WORD_OFFSET,
            count: RESET_WORDS,
            access_password,
            data: format!("{}{}{}", reset_pc, blank_word, nonce),
            filter: filter.cloned(),
            sound_enabled: false,
        };

        let was_locked = match self.device.write(&reset(old_password.clone())).await {
            Ok(()) => true,
            Err(e) => {
                info!(error = %e, "Reset rejected, retrying with default password");
                match self.device.write(&reset(AccessPassword::default())).await {
                    Ok(()) => false,
                    Err(e) => return Err(self.fail(ProvisioningPhase::ResetData, e)),
                }
            }
        };
        debug!(was_locked, %nonce, "EPC bank reset");

        let marked = FilterSpec::epc_prefix(format!("{}{}", blank_word, nonce));
        let unlock_password = if was_locked {
            old_password.clone()
        } else {
            AccessPassword::default()
        };

        self.report(ProvisioningStatus::Started(ProvisioningPhase::Unlock));
        let unlocked = self
            .device
            .lock(&LockOptions {
                power: self.power,
                access_password: unlock_password,
                code: UNLOCK_ALL.to_string(),
                filter: Some(marked.clone()),
                sound_enabled: false,
            })
            .await;
        if let Err(e) = unlocked {
            if was_locked {
                return Err(self.fail(ProvisioningPhase::Unlock, e));
            }
            // Some readers reject unlock under the default password; the tag is unlocked already
            debug!(error = %e, "Unlock under default password rejected, skipping");
            self.report(ProvisioningStatus::Skipped(ProvisioningPhase::Unlock));
            tokio::time::sleep(UNLOCK_SETTLE).await;
        }

        if was_locked {
            self.step(
                ProvisioningPhase::RemovePassword,
                self.device.write(&WriteOptions {
                    power: self.power,
                    memory_bank: MemoryBank::Reserved,
                    offset: 0,
                    count: RESERVED_PASSWORD_WORDS,
                    access_password: old_password.clone(),
                    data: AccessPassword::default().reserved_bank_data(),
                    filter: Some(marked),
                    sound_enabled: false,
                }),
            )
            .await?;
        }

        self.finish();
        Ok(ResetOutcome { was_locked, nonce })
    }

    async fn step<T>(
        &self,
        phase: ProvisioningPhase,
        call: impl Future<Output = DeviceResult<T>>,
    ) -> Result<T> {
        self.report(ProvisioningStatus::Started(phase));
        call.await.map_err(|e| self.fail(phase, e))
    }

    fn fail(&self, phase: ProvisioningPhase, source: DeviceError) -> ProvisioningError {
        warn!(%phase, error = %source, "Provisioning step failed");
        self.report(ProvisioningStatus::Failed(phase));
        self.play(Sound::Error);
        ProvisioningError::step(phase, source)
    }

    fn finish(&self) {
        self.report(ProvisioningStatus::Done);
        self.play(Sound::Success);
    }

    fn report(&self, status: ProvisioningStatus) {
        debug!(%status);
        if let Some(callback) = &self.on_status {
            callback(&status);
        }
    }

    fn play(&self, sound: Sound) {
        if self.sound_enabled {
            self.device.play_sound(sound);
        }
    }
}

/// PC word announcing the length of `epc`, validating it as whole hex words
fn epc_pc_word(epc: &str) -> Result<&'static str> {
    let invalid = |reason: &str| ProvisioningError::InvalidEpc {
        epc: epc.to_string(),
        reason: reason.to_string(),
    };

    if epc.is_empty() {
        return Err(invalid("empty"));
    }
    if !epc.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("not hex"));
    }
    if epc.len() % WORD_HEX_CHARS != 0 {
        return Err(invalid("not a whole number of 16-bit words"));
    }
    pc_word_for(epc.len() / WORD_HEX_CHARS).ok_or_else(|| invalid("longer than 15 words"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        use ProvisioningPhase::*;
        use ProvisioningStatus::*;

        assert_eq!(Started(WriteData).to_string(), "Writing data...");
        assert_eq!(Failed(Lock).to_string(), "Failed on initializing lock");
        assert_eq!(Started(SetPassword).to_string(), "Setting password...");
        assert_eq!(Failed(ResetData).to_string(), "Failed while resetting data");
        assert_eq!(Skipped(Unlock).to_string(), "Unlocking tag... skipped");
        assert_eq!(Skipped(Lock).to_string(), "lock skipped");
        assert_eq!(Done.to_string(), "Done");
    }

    #[test]
    fn test_epc_pc_word() {
        assert_eq!(epc_pc_word("3414000000005b0a59ad7320").unwrap(), "3000");
        assert_eq!(epc_pc_word("3414").unwrap(), "0800");
        assert!(epc_pc_word("").is_err());
        assert!(epc_pc_word("34140").is_err());
        assert!(epc_pc_word("zz14").is_err());
        assert!(epc_pc_word(&"0".repeat(64)).is_err());
    }
}
