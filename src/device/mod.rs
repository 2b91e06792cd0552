//! BLE device lifecycle and the Sylvac measurement protocol.

pub mod connector;
pub mod protocol;

pub use connector::DeviceConnector;
pub use protocol::{
    decode_measurement, MEASUREMENT_CHARACTERISTIC_UUID, MEASUREMENT_SERVICE_UUID,
};
