//! Core types for an acquisition run: configuration, records, events, errors.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A single recorded measurement.
///
/// Immutable once created; owned by the [`MeasurementStore`] after append.
///
/// [`MeasurementStore`]: crate::storage::MeasurementStore
#[derive(Debug, Clone)]
pub struct MeasurementRecord {
    /// 1-based position within the run
    pub sequence: u32,
    /// Wall-clock time the value was consumed from the slot
    pub timestamp: DateTime<Local>,
    /// Measured value in millimeters
    pub value_mm: f64,
}

/// Configuration for one acquisition run.
///
/// Immutable for the duration of the run. Validated by
/// [`AcquisitionConfig::validate`] before any device interaction.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Substring the advertised device name must contain
    pub name_filter: String,
    /// Number of measurements to record (must be at least 1)
    pub target_count: u32,
    /// Delay between successive recordings in seconds (may be 0)
    pub interval_seconds: f64,
    /// How long discovery may scan before giving up
    pub discovery_timeout_secs: u64,
    /// Upper bound on waiting for a single value; `None` waits indefinitely
    pub value_timeout_secs: Option<u64>,
    /// Destination for the persisted CSV table
    pub output_path: PathBuf,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            name_filter: "SY289".to_string(),
            target_count: 10,
            interval_seconds: 1.0,
            discovery_timeout_secs: 30,
            value_timeout_secs: Some(30),
            output_path: PathBuf::from("measurements.csv"),
        }
    }
}

impl AcquisitionConfig {
    /// Check the run parameters.
    ///
    /// Fails before any device interaction so an invalid count or interval
    /// never opens a connection.
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        if self.target_count == 0 {
            return Err(AcquisitionError::Configuration(
                "target count must be at least 1".to_string(),
            ));
        }
        if !self.interval_seconds.is_finite() || self.interval_seconds < 0.0 {
            return Err(AcquisitionError::Configuration(
                "interval must be a non-negative number of seconds".to_string(),
            ));
        }
        if Duration::try_from_secs_f64(self.interval_seconds).is_err() {
            return Err(AcquisitionError::Configuration(
                "interval is too large to represent".to_string(),
            ));
        }
        Ok(())
    }

    /// Sampling interval as a [`Duration`].
    ///
    /// Callers must run [`validate`] first; it rejects values this cannot
    /// represent.
    ///
    /// [`validate`]: AcquisitionConfig::validate
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds)
    }
}

/// Events from the acquisition pipeline.
///
/// Delivered fire-and-forget; a slow or absent observer never blocks sampling.
#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    /// Device scan started
    ScanStarted,
    /// Connected and subscribed to the matched device
    DeviceConnected { name: String },
    /// A measurement was recorded
    Measurement(MeasurementRecord),
    /// The run recorded every requested measurement
    Completed { count: u32 },
    /// The run stopped early
    Aborted { reason: String },
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of measurements recorded
    pub count: u32,
    /// Where the table was written, if persistence succeeded
    pub output: Option<PathBuf>,
    /// Persistence failure, reported without discarding the buffer
    pub persist_error: Option<String>,
}

/// Errors that can occur during an acquisition run.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Invalid run parameters; raised before any device interaction
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// No Bluetooth adapter available
    #[error("Bluetooth adapter not found")]
    AdapterNotFound,

    /// Scanning failed at the transport level
    #[error("failed to scan: {0}")]
    Scan(String),

    /// No advertised name matched the filter within the timeout
    #[error("no device matching \"{filter}\" found within {timeout:?}")]
    DeviceNotFound { filter: String, timeout: Duration },

    /// Transport-level connect failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// Malformed notification payload; the single update is dropped
    #[error("measurement payload must be 4 bytes, got {0}")]
    Decode(usize),

    /// Subscribe/unsubscribe failure
    #[error("notification setup failed: {0}")]
    Notification(String),

    /// The device stayed silent past the configured value timeout
    #[error("timed out waiting for a measurement")]
    ValueTimeout,

    /// The run was cancelled externally
    #[error("acquisition cancelled")]
    Cancelled,

    /// Writing the destination file failed; the in-memory buffer is kept
    #[error("failed to write measurements: {0}")]
    Persistence(String),
}
