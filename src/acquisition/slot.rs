//! Single-value handoff between the notification path and the scheduler.

use std::sync::Arc;
use tokio::sync::Mutex;

/// Capacity-1 exchange point between one producer and one consumer.
///
/// [`publish`] always overwrites an unconsumed value (freshness over
/// completeness), and [`take`] clears the slot so a value can never be
/// delivered twice.
///
/// [`publish`]: ValueSlot::publish
/// [`take`]: ValueSlot::take
#[derive(Debug, Clone, Default)]
pub struct ValueSlot {
    inner: Arc<Mutex<Option<f64>>>,
}

impl ValueSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any unconsumed one.
    pub async fn publish(&self, value_mm: f64) {
        *self.inner.lock().await = Some(value_mm);
    }

    /// Atomically read and clear the pending value, if any.
    pub async fn take(&self) -> Option<f64> {
        self.inner.lock().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_clears_the_slot() {
        let slot = ValueSlot::new();
        slot.publish(12.345).await;

        assert_eq!(slot.take().await, Some(12.345));
        assert_eq!(slot.take().await, None);
    }

    #[tokio::test]
    async fn publish_overwrites_unconsumed_value() {
        let slot = ValueSlot::new();
        slot.publish(1.0).await;
        slot.publish(2.0).await;

        assert_eq!(slot.take().await, Some(2.0));
        assert_eq!(slot.take().await, None);
    }

    #[tokio::test]
    async fn empty_slot_yields_nothing() {
        let slot = ValueSlot::new();
        assert_eq!(slot.take().await, None);
    }
}
