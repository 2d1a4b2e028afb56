//! Tag observations emitted by the reader while scanning

use serde::{Deserialize, Serialize};

/// A single tag seen by the reader during a scan batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagObservation {
    /// EPC bank contents as hex, without the PC word
    pub epc: String,
    /// TID bank contents when the reader was asked to report them
    pub tid: Option<String>,
    /// Received signal strength (dBm)
    pub rssi: i32,
}

impl TagObservation {
    pub fn new(epc: impl Into<String>, rssi: i32) -> Self {
        Self {
            epc: epc.into(),
            tid: None,
            rssi,
        }
    }

    pub fn with_tid(mut self, tid: impl Into<String>) -> Self {
        self.tid = Some(tid.into());
        self
    }
}
