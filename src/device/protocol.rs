//! Sylvac "Simple Data" BLE protocol: UUID constants and payload decoding.

use crate::acquisition::types::AcquisitionError;
use uuid::Uuid;

/// Simple Data Service UUID (0x5000)
pub const MEASUREMENT_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_5000_0000_1000_8000_0080_5f9b_34fb);

/// Measurement Characteristic UUID (0x5020)
pub const MEASUREMENT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x0000_5020_0000_1000_8000_0080_5f9b_34fb);

/// The device reports micrometers; the application works in millimeters.
const MICROMETERS_PER_MILLIMETER: f64 = 1000.0;

/// Decode a measurement notification payload.
///
/// The payload is exactly 4 bytes: a little-endian signed 32-bit integer in
/// micrometers. Anything else is rejected without touching the value slot.
pub fn decode_measurement(payload: &[u8]) -> Result<f64, AcquisitionError> {
    let bytes: [u8; 4] = payload
        .try_into()
        .map_err(|_| AcquisitionError::Decode(payload.len()))?;

    Ok(f64::from(i32::from_le_bytes(bytes)) / MICROMETERS_PER_MILLIMETER)
}
