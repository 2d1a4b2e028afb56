//! # Simulated Reader
//!
//! In-memory [`RadioDevice`] with a field of tags, each holding RESERVED, EPC and
//! TID banks, an access password and a lock state. Access rules follow Gen2 closely
//! enough to exercise the provisioning sequences:
//!
//! - a non-default password that does not match the tag fails the access
//! - locked RESERVED/EPC banks need the tag's password
//! - operations target the first tag matching the filter
//!
//! Failures can be injected per operation and every call is recorded.

use crate::device::{
    LocateOptions, LocateValue, LockOptions, RadioDevice, ReadOptions, ScanBatch, ScanOptions,
    WriteOptions,
};
use crate::error::{DeviceError, DeviceResult};
use crate::protocol::{LOCK_KILL_ACCESS_EPC, UNLOCK_ALL};
use async_trait::async_trait;
use epc_config::defaults;
use epc_types::{
    AccessPassword, FilterSpec, MemoryBank, Sound, TagObservation, DEFAULT_ACCESS_PASSWORD,
    WORD_HEX_CHARS,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Words in the simulated EPC bank: CRC, PC and up to 6 EPC words
pub const EPC_BANK_WORDS: usize = 8;

/// Device calls, as recorded in [`SimulatedRadio::calls`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Init,
    Free,
    SetPower(u32),
    StartScan(ScanOptions),
    StopScan,
    ClearScannedTags,
    StartLocate(LocateOptions),
    StopLocate,
    Read(ReadOptions),
    Write(WriteOptions),
    Lock(LockOptions),
    PlaySound(Sound),
}

/// Operation kinds failures can be injected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    StartScan,
    StartLocate,
    Read,
    Write,
    Lock,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::StartScan => "start_scan",
            Operation::StartLocate => "start_locate",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Lock => "lock",
        }
    }
}

/// One tag in the simulated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTag {
    /// Kill password followed by access password, 16 hex characters
    pub reserved: String,
    /// CRC word, PC word and EPC words
    pub epc_bank: String,
    pub tid: String,
    pub locked: bool,
    pub rssi: i32,
}

impl SimulatedTag {
    /// Unlocked tag with default passwords carrying `epc`
    pub fn new(tid: impl Into<String>, epc: &str) -> Self {
        let words = epc.len() / WORD_HEX_CHARS;
        let pc = format!("{:04x}", (words as u16) << 11);
        let mut epc_bank = format!("0000{}{}", pc, epc.to_ascii_lowercase());
        let bank_len = EPC_BANK_WORDS * WORD_HEX_CHARS;
        if epc_bank.len() < bank_len {
            epc_bank.push_str(&"0".repeat(bank_len - epc_bank.len()));
        }

        Self {
            reserved: "0".repeat(16),
            epc_bank,
            tid: tid.into(),
            locked: false,
            rssi: -55,
        }
    }

    pub fn with_rssi(mut self, rssi: i32) -> Self {
        self.rssi = rssi;
        self
    }

    /// EPC as announced by the PC word
    pub fn epc(&self) -> String {
        let pc = self
            .epc_bank
            .get(WORD_HEX_CHARS..2 * WORD_HEX_CHARS)
            .and_then(|word| u16::from_str_radix(word, 16).ok())
            .unwrap_or(0);
        let start = 2 * WORD_HEX_CHARS;
        let end = (start + usize::from(pc >> 11) * WORD_HEX_CHARS).min(self.epc_bank.len());
        self.epc_bank.get(start..end).unwrap_or_default().to_string()
    }

    pub fn access_password(&self) -> &str {
        self.reserved.get(8..16).unwrap_or_default()
    }

    fn bank(&self, bank: MemoryBank) -> &str {
        match bank {
            MemoryBank::Reserved => &self.reserved,
            MemoryBank::Epc => &self.epc_bank,
            MemoryBank::Tid => &self.tid,
            MemoryBank::User => "",
        }
    }

    fn bank_mut(&mut self, bank: MemoryBank) -> Option<&mut String> {
        match bank {
            MemoryBank::Reserved => Some(&mut self.reserved),
            MemoryBank::Epc => Some(&mut self.epc_bank),
            MemoryBank::Tid | MemoryBank::User => None,
        }
    }

    fn matches(&self, filter: Option<&FilterSpec>) -> bool {
        filter.map_or(true, |f| f.matches(self.bank(f.memory_bank)))
    }

    /// Gen2 access: a wrong non-default password fails outright; returns whether the
    /// tag is now in the secured state
    fn access(&self, password: &AccessPassword, operation: &'static str) -> DeviceResult<bool> {
        if password.as_str() == self.access_password() {
            Ok(true)
        } else if password.is_default() {
            Ok(false)
        } else {
            Err(DeviceError::rejected(operation, "access password mismatch"))
        }
    }

    fn is_protected(&self, bank: MemoryBank) -> bool {
        self.locked && matches!(bank, MemoryBank::Reserved | MemoryBank::Epc)
    }
}

/// Calls of one operation to let through, then calls to fail
#[derive(Debug, Default, Clone, Copy)]
struct FailurePlan {
    skip: usize,
    fail: usize,
}

#[derive(Default)]
struct RadioState {
    initialized: bool,
    power: u32,
    tags: Vec<SimulatedTag>,
    scan: Option<(ScanOptions, mpsc::Sender<ScanBatch>)>,
    locate: Option<(String, mpsc::Sender<LocateValue>)>,
    reported: HashSet<String>,
    failures: HashMap<Operation, FailurePlan>,
    calls: Vec<DeviceCall>,
    init_calls: usize,
    reject_default_unlock: bool,
}

/// In-memory reader with a configurable tag field
pub struct SimulatedRadio {
    state: Mutex<RadioState>,
    init_delay: Duration,
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRadio {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RadioState {
                power: defaults::reader::POWER,
                ..Default::default()
            }),
            init_delay: Duration::ZERO,
        }
    }

    /// Radio that is already initialized
    pub fn ready() -> Self {
        let radio = Self::new();
        radio.state().initialized = true;
        radio
    }

    /// Make `init` take `delay` to complete
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Reject unlocks issued under the default password, as newer readers do
    pub fn rejecting_default_unlock(self) -> Self {
        self.state().reject_default_unlock = true;
        self
    }

    pub fn add_tag(&self, tag: SimulatedTag) {
        self.state().tags.push(tag);
    }

    pub fn tags(&self) -> Vec<SimulatedTag> {
        self.state().tags.clone()
    }

    pub fn tag(&self, index: usize) -> Option<SimulatedTag> {
        self.state().tags.get(index).cloned()
    }

    /// Fail the next `times` calls of `operation`
    pub fn fail_next(&self, operation: Operation, times: usize) {
        self.fail_after(operation, 0, times);
    }

    /// Let `skip` calls of `operation` through, then fail the following `times`
    pub fn fail_after(&self, operation: Operation, skip: usize, times: usize) {
        self.state()
            .failures
            .insert(operation, FailurePlan { skip, fail: times });
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Transmit power last applied by `set_power`
    pub fn power(&self) -> u32 {
        self.state().power
    }

    pub fn init_calls(&self) -> usize {
        self.state().init_calls
    }

    /// Deliver one inventory round to the active scan; returns the batch size
    pub fn emit_inventory(&self) -> usize {
        let mut state = self.state();
        let RadioState {
            scan, tags, reported, ..
        } = &mut *state;
        let Some((options, sink)) = scan.as_ref() else {
            return 0;
        };

        let batch: ScanBatch = tags
            .iter()
            .filter(|tag| tag.matches(options.filter.as_ref()))
            .filter(|tag| !reported.contains(&tag.epc()))
            .map(|tag| TagObservation::new(tag.epc(), tag.rssi).with_tid(tag.tid.clone()))
            .collect();
        if batch.is_empty() {
            return 0;
        }

        let size = batch.len();
        match sink.try_send(batch) {
            Ok(()) => {
                reported.extend(tags.iter().filter(|t| t.matches(options.filter.as_ref())).map(|t| t.epc()));
                size
            }
            Err(e) => {
                debug!(error = %e, "Scan listener not accepting batches");
                0
            }
        }
    }

    /// Deliver one locate reading for the tag being located
    pub fn emit_locate(&self) -> Option<LocateValue> {
        let state = self.state();
        let (epc, sink) = state.locate.as_ref()?;
        let tag = state.tags.iter().find(|t| t.epc() == *epc)?;
        // Map roughly -90..-30 dBm onto 0..100
        let value = ((tag.rssi + 90).clamp(0, 60) * 100 / 60) as LocateValue;
        sink.try_send(value).ok()?;
        Some(value)
    }

    fn state(&self) -> MutexGuard<'_, RadioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: DeviceCall) -> MutexGuard<'_, RadioState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

impl RadioState {
    fn injected_failure(&mut self, operation: Operation) -> DeviceResult<()> {
        let Some(plan) = self.failures.get_mut(&operation) else {
            return Ok(());
        };
        if plan.skip > 0 {
            plan.skip -= 1;
            Ok(())
        } else if plan.fail > 0 {
            plan.fail -= 1;
            Err(DeviceError::rejected(operation.name(), "injected failure"))
        } else {
            Ok(())
        }
    }

    fn ready_for_tag_access(&mut self, operation: Operation) -> DeviceResult<()> {
        if !self.initialized {
            return Err(DeviceError::NotInitialized);
        }
        if self.scan.is_some() {
            return Err(DeviceError::Busy("scan in progress"));
        }
        if self.locate.is_some() {
            return Err(DeviceError::Busy("locate in progress"));
        }
        self.injected_failure(operation)
    }

    fn target(&mut self, filter: Option<&FilterSpec>, operation: &'static str) -> DeviceResult<&mut SimulatedTag> {
        self.tags
            .iter_mut()
            .find(|tag| tag.matches(filter))
            .ok_or_else(|| DeviceError::rejected(operation, "no tag matching filter"))
    }
}

fn word_range(offset: u32, count: u32, bank_len: usize, operation: &'static str) -> DeviceResult<(usize, usize)> {
    let start = offset as usize * WORD_HEX_CHARS;
    let end = start + count as usize * WORD_HEX_CHARS;
    if count == 0 || end > bank_len {
        return Err(DeviceError::rejected(operation, "memory overrun"));
    }
    Ok((start, end))
}

#[async_trait]
impl RadioDevice for SimulatedRadio {
    async fn init(&self) -> DeviceResult<()> {
        {
            let mut state = self.record(DeviceCall::Init);
            state.init_calls += 1;
        }
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }

        let mut state = self.state();
        state.injected_failure(Operation::Init)?;
        state.initialized = true;
        Ok(())
    }

    async fn free(&self) -> DeviceResult<()> {
        let mut state = self.record(DeviceCall::Free);
        state.scan = None;
        state.locate = None;
        state.initialized = false;
        Ok(())
    }

    async fn is_working(&self) -> DeviceResult<bool> {
        let state = self.state();
        Ok(state.scan.is_some() || state.locate.is_some())
    }

    async fn set_power(&self, power: u32) -> DeviceResult<u32> {
        let mut state = self.record(DeviceCall::SetPower(power));
        if !state.initialized {
            return Err(DeviceError::NotInitialized);
        }
        state.power = power.clamp(defaults::reader::MIN_POWER, defaults::reader::MAX_POWER);
        Ok(state.power)
    }

    async fn start_scan(&self, options: &ScanOptions, sink: mpsc::Sender<ScanBatch>) -> DeviceResult<()> {
        let mut state = self.record(DeviceCall::StartScan(options.clone()));
        if !state.initialized {
            return Err(DeviceError::NotInitialized);
        }
        state.injected_failure(Operation::StartScan)?;
        state.scan = Some((options.clone(), sink));
        Ok(())
    }

    async fn stop_scan(&self) -> DeviceResult<()> {
        self.record(DeviceCall::StopScan).scan = None;
        Ok(())
    }

    async fn clear_scanned_tags(&self) -> DeviceResult<()> {
        self.record(DeviceCall::ClearScannedTags).reported.clear();
        Ok(())
    }

    async fn start_locate(&self, options: &LocateOptions, sink: mpsc::Sender<LocateValue>) -> DeviceResult<()> {
        let mut state = self.record(DeviceCall::StartLocate(options.clone()));
        if !state.initialized {
            return Err(DeviceError::NotInitialized);
        }
        state.injected_failure(Operation::StartLocate)?;
        state.locate = Some((options.epc.to_ascii_lowercase(), sink));
        Ok(())
    }

    async fn stop_locate(&self) -> DeviceResult<()> {
        self.record(DeviceCall::StopLocate).locate = None;
        Ok(())
    }

    async fn read(&self, options: &ReadOptions) -> DeviceResult<String> {
        let mut state = self.record(DeviceCall::Read(options.clone()));
        state.ready_for_tag_access(Operation::Read)?;

        let tag = state.target(options.filter.as_ref(), "read")?;
        let secured = tag.access(&options.access_password, "read")?;
        if options.memory_bank == MemoryBank::Reserved && tag.locked && !secured {
            return Err(DeviceError::rejected("read", "password bank locked"));
        }

        let bank = tag.bank(options.memory_bank);
        let (start, end) = word_range(options.offset, options.count, bank.len(), "read")?;
        Ok(bank[start..end].to_string())
    }

    async fn write(&self, options: &WriteOptions) -> DeviceResult<()> {
        let mut state = self.record(DeviceCall::Write(options.clone()));
        state.ready_for_tag_access(Operation::Write)?;

        if options.data.len() != options.count as usize * WORD_HEX_CHARS
            || !options.data.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(DeviceError::rejected("write", "data does not match word count"));
        }

        let tag = state.target(options.filter.as_ref(), "write")?;
        let secured = tag.access(&options.access_password, "write")?;
        if tag.is_protected(options.memory_bank) && !secured {
            return Err(DeviceError::rejected("write", "bank locked"));
        }

        let bank = tag
            .bank_mut(options.memory_bank)
            .ok_or_else(|| DeviceError::rejected("write", "bank not writable"))?;
        let (start, end) = word_range(options.offset, options.count, bank.len(), "write")?;
        bank.replace_range(start..end, &options.data.to_ascii_lowercase());
        debug!(bank = %options.memory_bank, offset = options.offset, count = options.count, "Simulated write");
        Ok(())
    }

    async fn lock(&self, options: &LockOptions) -> DeviceResult<()> {
        let mut state = self.record(DeviceCall::Lock(options.clone()));
        state.ready_for_tag_access(Operation::Lock)?;

        let reject_default_unlock = state.reject_default_unlock;
        let tag = state.target(options.filter.as_ref(), "lock")?;
        let secured = tag.access(&options.access_password, "lock")?;
        if !secured {
            return Err(DeviceError::rejected("lock", "tag not in secured state"));
        }

        match options.code.to_ascii_lowercase().as_str() {
            LOCK_KILL_ACCESS_EPC => tag.locked = true,
            UNLOCK_ALL => {
                if reject_default_unlock && options.access_password.as_str() == DEFAULT_ACCESS_PASSWORD {
                    return Err(DeviceError::rejected("lock", "unlock with default password refused"));
                }
                tag.locked = false;
            }
            other => {
                return Err(DeviceError::rejected("lock", format!("unsupported lock code {}", other)));
            }
        }
        Ok(())
    }

    fn play_sound(&self, sound: Sound) {
        self.state().calls.push(DeviceCall::PlaySound(sound));
    }
}
