//! In-memory measurement buffer and CSV persistence.

use crate::acquisition::types::{AcquisitionError, MeasurementRecord};
use std::path::Path;

/// Timestamp format used in the persisted table.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ordered buffer of measurement records for one run.
///
/// Appends never reorder or deduplicate; sequencing is the scheduler's job.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    records: Vec<MeasurementRecord>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record in arrival order.
    pub fn append(&mut self, record: MeasurementRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all buffered records, ready for a fresh run.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Write all records as a CSV table, replacing the destination file.
    ///
    /// A failure here leaves the in-memory buffer untouched so the caller can
    /// report it and retry elsewhere.
    pub fn persist(&self, path: &Path) -> Result<(), AcquisitionError> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| AcquisitionError::Persistence(e.to_string()))?;

        writer
            .write_record(["Measurement Number", "Timestamp", "Value (mm)"])
            .map_err(|e| AcquisitionError::Persistence(e.to_string()))?;

        for record in &self.records {
            writer
                .write_record(&[
                    record.sequence.to_string(),
                    record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    format!("{:.3}", record.value_mm),
                ])
                .map_err(|e| AcquisitionError::Persistence(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| AcquisitionError::Persistence(e.to_string()))?;

        tracing::info!(records = self.records.len(), path = %path.display(), "measurements saved");

        Ok(())
    }
}
