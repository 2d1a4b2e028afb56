//! # Reader Session
//!
//! Wraps a [`RadioDevice`] with the process-wide bookkeeping the radio needs:
//! at most one scan and one locate listener at a time, handed out as owned
//! subscription handles, and a shared in-flight `init`.
//!
//! Starting a scan while another is active stops the device scan first and
//! then installs the new listener; the old handle's receiver ends. Stopping with
//! a handle that has since been replaced does nothing.

use crate::device::{LocateOptions, LocateValue, RadioDevice, ScanBatch, ScanOptions};
use crate::error::{DeviceError, DeviceResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

/// Buffered batches per subscription before the driver sees back-pressure
pub const SUBSCRIPTION_CAPACITY: usize = 64;

/// Identity of one scan or locate subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Active scan listener; pass back to [`Reader::stop_scan`]
#[derive(Debug)]
pub struct ScanSubscription {
    id: SubscriptionId,
    batches: mpsc::Receiver<ScanBatch>,
}

impl ScanSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next batch, or `None` once the scan was stopped or replaced
    pub async fn next_batch(&mut self) -> Option<ScanBatch> {
        self.batches.recv().await
    }

    pub fn try_next_batch(&mut self) -> Option<ScanBatch> {
        self.batches.try_recv().ok()
    }
}

/// Active locate listener; pass back to [`Reader::stop_locate`]
#[derive(Debug)]
pub struct LocateSubscription {
    id: SubscriptionId,
    values: mpsc::Receiver<LocateValue>,
}

impl LocateSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub async fn next_value(&mut self) -> Option<LocateValue> {
        self.values.recv().await
    }
}

type InitOutcome = Option<DeviceResult<()>>;

/// Shared handle to one physical reader
pub struct Reader<D> {
    device: Arc<D>,
    active_scan: Mutex<Option<SubscriptionId>>,
    active_locate: Mutex<Option<SubscriptionId>>,
    init_in_flight: Mutex<Option<watch::Receiver<InitOutcome>>>,
    next_id: AtomicU64,
}

impl<D: RadioDevice> Reader<D> {
    pub fn new(device: D) -> Self {
        Self::from_shared(Arc::new(device))
    }

    pub fn from_shared(device: Arc<D>) -> Self {
        Self {
            device,
            active_scan: Mutex::new(None),
            active_locate: Mutex::new(None),
            init_in_flight: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Underlying driver, for single-shot read/write/lock calls
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Initialize the radio. Concurrent callers share one device `init` call and
    /// all observe its outcome.
    pub async fn init(&self) -> DeviceResult<()> {
        let mut slot = self.init_in_flight.lock().await;
        if let Some(pending) = slot.as_ref() {
            // A closed channel means the leading caller was cancelled
            if pending.has_changed().is_ok() {
                let mut pending = pending.clone();
                drop(slot);
                debug!("Joining in-flight reader init");
                return match pending.wait_for(Option::is_some).await {
                    Ok(outcome) => outcome.clone().unwrap_or(Ok(())),
                    Err(_) => Err(DeviceError::rejected("init", "initialization abandoned")),
                };
            }
        }

        let (tx, rx) = watch::channel(None);
        *slot = Some(rx);
        drop(slot);

        info!("Initializing reader");
        let outcome = self.device.init().await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Reader init failed");
        }

        *self.init_in_flight.lock().await = None;
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    /// Tear down listeners and release the radio
    pub async fn free(&self) -> DeviceResult<()> {
        if let Some(id) = self.active_scan.lock().await.take() {
            debug!(?id, "Dropping scan listener on free");
        }
        if let Some(id) = self.active_locate.lock().await.take() {
            debug!(?id, "Dropping locate listener on free");
        }
        self.device.free().await
    }

    /// Start a scan, replacing any scan already running
    pub async fn start_scan(&self, options: &ScanOptions) -> DeviceResult<ScanSubscription> {
        let mut active = self.active_scan.lock().await;
        if let Some(previous) = active.take() {
            debug!(?previous, "Replacing active scan");
            if let Err(e) = self.device.stop_scan().await {
                warn!(error = %e, "Stopping previous scan failed, starting anyway");
            }
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        self.device.start_scan(options, tx).await?;

        let id = self.allocate_id();
        *active = Some(id);
        debug!(?id, power = options.power, filtered = options.filter.is_some(), "Scan started");
        Ok(ScanSubscription { id, batches: rx })
    }

    /// Stop the scan `subscription` belongs to; a no-op if it was already replaced
    pub async fn stop_scan(&self, subscription: ScanSubscription) -> DeviceResult<()> {
        let mut active = self.active_scan.lock().await;
        if *active != Some(subscription.id) {
            debug!(id = ?subscription.id, "Ignoring stop for inactive scan");
            return Ok(());
        }
        *active = None;
        self.device.stop_scan().await
    }

    pub async fn is_scanning(&self) -> bool {
        self.active_scan.lock().await.is_some()
    }

    pub async fn clear_scanned_tags(&self) -> DeviceResult<()> {
        self.device.clear_scanned_tags().await
    }

    /// Start locating one tag, replacing any locate already running
    pub async fn start_locate(&self, options: &LocateOptions) -> DeviceResult<LocateSubscription> {
        let mut active = self.active_locate.lock().await;
        if let Some(previous) = active.take() {
            debug!(?previous, "Replacing active locate");
            if let Err(e) = self.device.stop_locate().await {
                warn!(error = %e, "Stopping previous locate failed, starting anyway");
            }
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        self.device.start_locate(options, tx).await?;

        let id = self.allocate_id();
        *active = Some(id);
        debug!(?id, epc = %options.epc, "Locate started");
        Ok(LocateSubscription { id, values: rx })
    }

    pub async fn stop_locate(&self, subscription: LocateSubscription) -> DeviceResult<()> {
        let mut active = self.active_locate.lock().await;
        if *active != Some(subscription.id) {
            debug!(id = ?subscription.id, "Ignoring stop for inactive locate");
            return Ok(());
        }
        *active = None;
        self.device.stop_locate().await
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}
