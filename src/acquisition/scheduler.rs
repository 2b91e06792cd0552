//! Fixed-cadence sampling loop over the value slot.

use crate::acquisition::slot::ValueSlot;
use crate::acquisition::types::{
    AcquisitionConfig, AcquisitionError, AcquisitionEvent, MeasurementRecord,
};
use crate::storage::store::MeasurementStore;
use chrono::Local;
use crossbeam::channel::Sender;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// How often the slot is re-checked while waiting for a value.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drains the [`ValueSlot`] at the configured cadence, producing sequenced
/// records until the target count is reached or the run is cancelled.
///
/// The hardware pushes values whenever it likes; this loop decides which of
/// them become records. Unconsumed values are overwritten in the slot, so each
/// record always holds the freshest value available at its consumption point.
pub struct SamplingScheduler {
    slot: ValueSlot,
    target_count: u32,
    interval: Duration,
    value_timeout: Option<Duration>,
}

impl SamplingScheduler {
    pub fn new(slot: ValueSlot, config: &AcquisitionConfig) -> Self {
        Self {
            slot,
            target_count: config.target_count,
            interval: config.interval(),
            value_timeout: config.value_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Record `target_count` measurements into `store`.
    ///
    /// On cancellation or value timeout the records already appended remain a
    /// valid strict prefix of the run.
    pub async fn run(
        &self,
        store: &mut MeasurementStore,
        cancel: &mut watch::Receiver<bool>,
        event_tx: Option<&Sender<AcquisitionEvent>>,
    ) -> Result<(), AcquisitionError> {
        for sequence in 1..=self.target_count {
            let value_mm = self.wait_for_value(cancel).await?;

            let record = MeasurementRecord {
                sequence,
                timestamp: Local::now(),
                value_mm,
            };

            tracing::debug!(sequence, value_mm, "recorded measurement");
            store.append(record.clone());

            if let Some(tx) = event_tx {
                let _ = tx.send(AcquisitionEvent::Measurement(record));
            }

            if sequence < self.target_count && !self.interval.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = cancelled(cancel) => return Err(AcquisitionError::Cancelled),
                }
            }
        }

        Ok(())
    }

    /// Poll the slot until a value appears, cancellation fires, or the
    /// configured timeout expires.
    async fn wait_for_value(
        &self,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<f64, AcquisitionError> {
        let deadline = self.value_timeout.map(|t| Instant::now() + t);

        loop {
            if let Some(value_mm) = self.slot.take().await {
                return Ok(value_mm);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(AcquisitionError::ValueTimeout);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
                _ = cancelled(cancel) => return Err(AcquisitionError::Cancelled),
            }
        }
    }
}

/// Resolves once the cancel signal fires.
///
/// A dropped sender counts as cancellation so an orphaned run cannot keep
/// sampling forever.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
