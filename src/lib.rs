//! sylvac-capture - BLE measurement logger for Sylvac digital calipers
//!
//! Discovers a caliper by advertised name, subscribes to its measurement
//! characteristic, samples the live value at a configured cadence, and
//! persists the sequenced records to a CSV table.

pub mod acquisition;
pub mod device;
pub mod storage;

// Re-export commonly used types
pub use acquisition::controller::{CancelHandle, Controller};
pub use acquisition::types::{
    AcquisitionConfig, AcquisitionError, AcquisitionEvent, MeasurementRecord, RunSummary,
};
pub use storage::store::MeasurementStore;
