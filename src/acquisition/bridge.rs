//! Bridges the device's notification stream into the value slot.

use crate::acquisition::slot::ValueSlot;
use crate::acquisition::types::AcquisitionError;
use crate::device::protocol::{decode_measurement, MEASUREMENT_CHARACTERISTIC_UUID};
use btleplug::api::{Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use futures::stream::StreamExt;
use tokio::task::JoinHandle;

/// Decodes raw measurement notifications and publishes them into a
/// [`ValueSlot`], overwriting whatever the consumer has not taken yet.
pub struct NotificationBridge {
    slot: ValueSlot,
    listener: Option<JoinHandle<()>>,
}

impl NotificationBridge {
    pub fn new(slot: ValueSlot) -> Self {
        Self {
            slot,
            listener: None,
        }
    }

    /// Subscribe to the measurement characteristic and start the decode task.
    ///
    /// A malformed payload drops that single update and keeps the
    /// subscription alive.
    pub async fn subscribe(&mut self, peripheral: &Peripheral) -> Result<(), AcquisitionError> {
        let characteristic = Self::measurement_characteristic(peripheral)?;

        peripheral
            .subscribe(&characteristic)
            .await
            .map_err(|e| AcquisitionError::Notification(e.to_string()))?;

        let mut notifications = peripheral
            .notifications()
            .await
            .map_err(|e| AcquisitionError::Notification(e.to_string()))?;

        tracing::debug!(
            "subscribed to characteristic {}",
            MEASUREMENT_CHARACTERISTIC_UUID
        );

        let slot = self.slot.clone();
        self.listener = Some(tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != MEASUREMENT_CHARACTERISTIC_UUID {
                    continue;
                }

                match decode_measurement(&notification.value) {
                    Ok(value_mm) => slot.publish(value_mm).await,
                    Err(e) => tracing::warn!("dropping notification: {}", e),
                }
            }

            // Stream ended - peripheral disconnected
            tracing::debug!("notification stream ended");
        }));

        Ok(())
    }

    /// Stop notification delivery.
    ///
    /// Must run before the connector releases the session.
    pub async fn unsubscribe(&mut self, peripheral: &Peripheral) -> Result<(), AcquisitionError> {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }

        let characteristic = Self::measurement_characteristic(peripheral)?;

        peripheral
            .unsubscribe(&characteristic)
            .await
            .map_err(|e| AcquisitionError::Notification(e.to_string()))?;

        Ok(())
    }

    fn measurement_characteristic(
        peripheral: &Peripheral,
    ) -> Result<Characteristic, AcquisitionError> {
        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == MEASUREMENT_CHARACTERISTIC_UUID)
            .ok_or_else(|| {
                AcquisitionError::Notification(
                    "measurement characteristic not found".to_string(),
                )
            })
    }
}
