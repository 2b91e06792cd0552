//! Orchestrates one acquisition run end to end.

use crate::acquisition::bridge::NotificationBridge;
use crate::acquisition::scheduler::SamplingScheduler;
use crate::acquisition::slot::ValueSlot;
use crate::acquisition::types::{
    AcquisitionConfig, AcquisitionError, AcquisitionEvent, MeasurementRecord, RunSummary,
};
use crate::device::connector::DeviceConnector;
use crate::storage::store::MeasurementStore;
use btleplug::platform::Peripheral;
use crossbeam::channel::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cancels a running acquisition from outside the pipeline.
///
/// Cloneable and cheap to hand to a signal handler or UI command.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request a prompt abort of the value wait and inter-sample sleep.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Sequences discover → connect → subscribe → sample → unsubscribe → release
/// → persist, reporting progress and terminal status over an event channel.
pub struct Controller {
    config: AcquisitionConfig,
    store: MeasurementStore,
    event_tx: Option<Sender<AcquisitionEvent>>,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl Controller {
    pub fn new(config: AcquisitionConfig) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            config,
            store: MeasurementStore::new(),
            event_tx: None,
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    /// Get an event receiver for acquisition progress and terminal status.
    pub fn event_receiver(&mut self) -> Receiver<AcquisitionEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.event_tx = Some(tx);
        rx
    }

    /// Handle for cancelling the run from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel_tx: self.cancel_tx.clone(),
        }
    }

    /// Records buffered so far; survives a persistence failure.
    pub fn records(&self) -> &[MeasurementRecord] {
        self.store.records()
    }

    /// Run one acquisition to completion.
    ///
    /// Configuration is validated before any device interaction. Whatever the
    /// outcome, the session is released and any buffered records are
    /// persisted, and the observer receives exactly one terminal event.
    pub async fn run(&mut self) -> Result<RunSummary, AcquisitionError> {
        if let Err(e) = self.config.validate() {
            self.emit(AcquisitionEvent::Aborted {
                reason: e.to_string(),
            });
            return Err(e);
        }

        self.store.clear();

        let result = self.run_pipeline().await;

        // Persist what exists, on success and abort alike. An empty buffer
        // writes no file.
        let mut persist_error = None;
        let mut output = None;
        if !self.store.is_empty() {
            match self.store.persist(&self.config.output_path) {
                Ok(()) => output = Some(self.config.output_path.clone()),
                Err(e) => {
                    tracing::error!("persistence failed: {}", e);
                    persist_error = Some(e.to_string());
                }
            }
        }

        match result {
            Ok(()) => {
                let count = self.store.len() as u32;
                self.emit(AcquisitionEvent::Completed { count });
                Ok(RunSummary {
                    count,
                    output,
                    persist_error,
                })
            }
            Err(e) => {
                self.emit(AcquisitionEvent::Aborted {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Device-facing part of the run. The session is released on every path.
    async fn run_pipeline(&mut self) -> Result<(), AcquisitionError> {
        let connector = DeviceConnector::new().await?;

        self.emit(AcquisitionEvent::ScanStarted);

        let device = connector
            .discover(
                &self.config.name_filter,
                Duration::from_secs(self.config.discovery_timeout_secs),
            )
            .await?;

        let result = match connector.connect(&device).await {
            Ok(()) => self.acquire(&device).await,
            // A half-open session (connected, service discovery failed) still
            // needs the release below.
            Err(e) => Err(e),
        };

        connector.release(&device).await;

        result
    }

    /// Subscribe, sample, unsubscribe. Unsubscription runs even when the
    /// scheduler aborts.
    async fn acquire(&mut self, device: &Peripheral) -> Result<(), AcquisitionError> {
        let slot = ValueSlot::new();
        let mut bridge = NotificationBridge::new(slot.clone());

        bridge.subscribe(device).await?;

        self.emit(AcquisitionEvent::DeviceConnected {
            name: DeviceConnector::peripheral_name(device).await,
        });

        let scheduler = SamplingScheduler::new(slot, &self.config);
        let mut cancel_rx = self.cancel_tx.subscribe();

        let result = scheduler
            .run(&mut self.store, &mut cancel_rx, self.event_tx.as_ref())
            .await;

        if let Err(e) = bridge.unsubscribe(device).await {
            tracing::warn!("unsubscribe failed during teardown: {}", e);
        }

        result
    }

    /// Send an event if an observer is attached. Never blocks.
    fn emit(&self, event: AcquisitionEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}
