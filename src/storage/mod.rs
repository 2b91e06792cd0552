//! Measurement buffering and persistence.

pub mod store;

pub use store::MeasurementStore;
