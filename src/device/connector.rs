//! BLE device discovery and connection lifecycle for one caliper session.

use crate::acquisition::types::AcquisitionError;
use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use std::future::Future;
use std::time::Duration;

/// Bound a discovery search by the scan timeout.
///
/// Expiry maps to `DeviceNotFound`; a result produced inside the window
/// passes through unchanged.
pub async fn bounded_discovery<T, F>(
    search: F,
    name_filter: &str,
    timeout: Duration,
) -> Result<T, AcquisitionError>
where
    F: Future<Output = Result<T, AcquisitionError>>,
{
    match tokio::time::timeout(timeout, search).await {
        Ok(result) => result,
        Err(_) => Err(AcquisitionError::DeviceNotFound {
            filter: name_filter.to_string(),
            timeout,
        }),
    }
}

/// Owns the discover → connect → release lifecycle for one device session.
pub struct DeviceConnector {
    adapter: Adapter,
}

impl DeviceConnector {
    /// Initialize the first available BLE adapter.
    pub async fn new() -> Result<Self, AcquisitionError> {
        let manager = Manager::new()
            .await
            .map_err(|e| AcquisitionError::Scan(e.to_string()))?;

        let adapters = manager
            .adapters()
            .await
            .map_err(|e| AcquisitionError::Scan(e.to_string()))?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(AcquisitionError::AdapterNotFound)?;

        tracing::info!("BLE adapter initialized");

        Ok(Self { adapter })
    }

    /// Scan until a device whose advertised name contains `name_filter` shows
    /// up, or fail with `DeviceNotFound` once `timeout` elapses.
    ///
    /// The scan is always stopped before returning, on both paths.
    pub async fn discover(
        &self,
        name_filter: &str,
        timeout: Duration,
    ) -> Result<Peripheral, AcquisitionError> {
        tracing::info!(filter = name_filter, ?timeout, "scanning for devices");

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| AcquisitionError::Scan(e.to_string()))?;

        let found =
            bounded_discovery(self.watch_for_match(name_filter), name_filter, timeout).await;

        if let Err(e) = self.adapter.stop_scan().await {
            tracing::warn!("failed to stop scan: {}", e);
        }

        found
    }

    /// Follow adapter events until a peripheral matches the name filter.
    async fn watch_for_match(&self, name_filter: &str) -> Result<Peripheral, AcquisitionError> {
        let mut events = self
            .adapter
            .events()
            .await
            .map_err(|e| AcquisitionError::Scan(e.to_string()))?;

        // A device the adapter already knows never produces a fresh event.
        if let Some(peripheral) = self.find_match(name_filter).await? {
            return Ok(peripheral);
        }

        while let Some(event) = events.next().await {
            match event {
                CentralEvent::DeviceDiscovered(_) | CentralEvent::DeviceUpdated(_) => {
                    if let Some(peripheral) = self.find_match(name_filter).await? {
                        return Ok(peripheral);
                    }
                }
                _ => {}
            }
        }

        Err(AcquisitionError::Scan(
            "adapter event stream ended".to_string(),
        ))
    }

    /// Check the adapter's current peripherals against the name filter.
    async fn find_match(
        &self,
        name_filter: &str,
    ) -> Result<Option<Peripheral>, AcquisitionError> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| AcquisitionError::Scan(e.to_string()))?;

        for peripheral in peripherals {
            let name = match peripheral.properties().await {
                Ok(Some(properties)) => properties.local_name,
                _ => continue,
            };

            if let Some(name) = name {
                if name.contains(name_filter) {
                    tracing::info!(%name, "matched device");
                    return Ok(Some(peripheral));
                }
            }
        }

        Ok(None)
    }

    /// Connect and discover GATT services.
    pub async fn connect(&self, peripheral: &Peripheral) -> Result<(), AcquisitionError> {
        peripheral
            .connect()
            .await
            .map_err(|e| AcquisitionError::Connection(e.to_string()))?;

        peripheral
            .discover_services()
            .await
            .map_err(|e| AcquisitionError::Connection(e.to_string()))?;

        tracing::info!("connected");

        Ok(())
    }

    /// Idempotent disconnect.
    ///
    /// Runs on every exit path of the pipeline; failures are logged rather
    /// than propagated so teardown can never mask the run's real outcome.
    pub async fn release(&self, peripheral: &Peripheral) {
        if let Ok(false) = peripheral.is_connected().await {
            return;
        }

        if let Err(e) = peripheral.disconnect().await {
            tracing::warn!("disconnect failed: {}", e);
        } else {
            tracing::info!("disconnected");
        }
    }

    /// Advertised name of a peripheral, for progress reporting.
    pub async fn peripheral_name(peripheral: &Peripheral) -> String {
        match peripheral.properties().await {
            Ok(Some(properties)) => properties
                .local_name
                .unwrap_or_else(|| "Unknown Device".to_string()),
            _ => "Unknown Device".to_string(),
        }
    }
}
