//! Acquisition pipeline: slot handoff, notification bridge, sampling loop,
//! and the controller that sequences a run.

pub mod bridge;
pub mod controller;
pub mod scheduler;
pub mod slot;
pub mod types;

pub use bridge::NotificationBridge;
pub use controller::{CancelHandle, Controller};
pub use scheduler::SamplingScheduler;
pub use slot::ValueSlot;
pub use types::{
    AcquisitionConfig, AcquisitionError, AcquisitionEvent, MeasurementRecord, RunSummary,
};
