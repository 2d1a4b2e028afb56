//! # Reader Device Boundary
//!
//! The primitive command set a UHF reader driver exposes. Everything above this
//! trait (subscription bookkeeping, provisioning sequences) is transport agnostic;
//! a serial (UART) or Bluetooth reader is wired in by implementing [`RadioDevice`].
//!
//! All calls are single-shot and resolve once the reader answers. No timeout is
//! applied here; callers that need a deadline wrap the future themselves.

use crate::error::DeviceResult;
use async_trait::async_trait;
use epc_config::defaults;
use epc_types::{AccessPassword, FilterSpec, MemoryBank, Sound, TagObservation};
use tokio::sync::mpsc;

/// One batch of tags reported by a running scan
pub type ScanBatch = Vec<TagObservation>;

/// Relative signal strength reported while locating a tag (0-100)
pub type LocateValue = u32;

/// Core trait every reader driver implements
#[async_trait]
pub trait RadioDevice: Send + Sync {
    /// Power up the radio and claim the transport
    async fn init(&self) -> DeviceResult<()>;

    /// Release the radio; any running scan or locate stops
    async fn free(&self) -> DeviceResult<()>;

    /// Whether the radio is currently executing an operation
    async fn is_working(&self) -> DeviceResult<bool>;

    /// Set transmit power, returning the value the reader applied
    async fn set_power(&self, power: u32) -> DeviceResult<u32>;

    /// Begin continuous inventory, delivering batches to `sink` until stopped.
    ///
    /// The driver keeps `sink` until `stop_scan` or the next `start_scan` and drops
    /// it then, which ends the receiving side.
    async fn start_scan(&self, options: &ScanOptions, sink: mpsc::Sender<ScanBatch>) -> DeviceResult<()>;

    async fn stop_scan(&self) -> DeviceResult<()>;

    /// Forget tags already reported so the next scan reports them again
    async fn clear_scanned_tags(&self) -> DeviceResult<()>;

    async fn start_locate(
        &self,
        options: &LocateOptions,
        sink: mpsc::Sender<LocateValue>,
    ) -> DeviceResult<()>;

    async fn stop_locate(&self) -> DeviceResult<()>;

    /// Read `count` words, returned as hex
    async fn read(&self, options: &ReadOptions) -> DeviceResult<String>;

    async fn write(&self, options: &WriteOptions) -> DeviceResult<()>;

    async fn lock(&self, options: &LockOptions) -> DeviceResult<()>;

    /// Fire-and-forget feedback sound
    fn play_sound(&self, sound: Sound);
}

/// Inventory parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub power: u32,
    pub filter: Option<FilterSpec>,
    /// Inventory rounds per second
    pub scan_rate: u32,
    /// Milliseconds between delivered batches
    pub event_rate: u32,
    pub sound_enabled: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            power: defaults::reader::POWER,
            filter: None,
            scan_rate: defaults::reader::SCAN_RATE,
            event_rate: defaults::reader::EVENT_RATE_MS,
            sound_enabled: defaults::reader::SOUND_ENABLED,
        }
    }
}

impl ScanOptions {
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateOptions {
    /// EPC hex of the tag to home in on
    pub epc: String,
    pub power: u32,
    pub sound_enabled: bool,
}

/// Word-addressed bank read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub power: u32,
    pub memory_bank: MemoryBank,
    /// First word to read (ptr)
    pub offset: u32,
    /// Number of words (len)
    pub count: u32,
    pub access_password: AccessPassword,
    pub filter: Option<FilterSpec>,
    pub sound_enabled: bool,
}

/// Word-addressed bank write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub power: u32,
    pub memory_bank: MemoryBank,
    /// First word to write (ptr)
    pub offset: u32,
    /// Number of words (len)
    pub count: u32,
    pub access_password: AccessPassword,
    /// `count` words as hex
    pub data: String,
    pub filter: Option<FilterSpec>,
    pub sound_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOptions {
    pub power: u32,
    pub access_password: AccessPassword,
    /// Gen2 lock payload as 6 hex characters (mask and action bits)
    pub code: String,
    pub filter: Option<FilterSpec>,
    pub sound_enabled: bool,
}
