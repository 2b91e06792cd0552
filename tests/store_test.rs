//! Unit tests for the measurement store and CSV persistence.

use chrono::{Local, TimeZone};
use sylvac_capture::acquisition::types::{AcquisitionError, MeasurementRecord};
use sylvac_capture::storage::store::MeasurementStore;

fn record(sequence: u32, value_mm: f64) -> MeasurementRecord {
    MeasurementRecord {
        sequence,
        timestamp: Local.with_ymd_and_hms(2024, 5, 17, 9, 30, sequence).unwrap(),
        value_mm,
    }
}

fn store_with(records: &[(u32, f64)]) -> MeasurementStore {
    let mut store = MeasurementStore::new();
    for &(sequence, value_mm) in records {
        store.append(record(sequence, value_mm));
    }
    store
}

#[test]
fn test_append_preserves_order() {
    let store = store_with(&[(1, 10.0), (2, 10.5), (3, 9.8)]);

    let sequences: Vec<u32> = store.records().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_persist_writes_expected_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.csv");

    let store = store_with(&[(1, 10.0), (2, -0.0015)]);
    store.persist(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();

    assert_eq!(lines.next(), Some("Measurement Number,Timestamp,Value (mm)"));
    assert_eq!(lines.next(), Some("1,2024-05-17 09:30:01,10.000"));
    assert_eq!(lines.next(), Some("2,2024-05-17 09:30:02,-0.002"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_persisted_table_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.csv");

    let store = store_with(&[(1, 10.000), (2, 10.001), (3, 10.002)]);
    store.persist(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(rows.len(), store.len());
    for (row, record) in rows.iter().zip(store.records()) {
        assert_eq!(row[0].parse::<u32>().unwrap(), record.sequence);
        assert_eq!(&row[1], record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().as_str());
        assert_eq!(&row[2], format!("{:.3}", record.value_mm).as_str());
    }
}

#[test]
fn test_persist_replaces_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.csv");

    store_with(&[(1, 1.0), (2, 2.0), (3, 3.0)]).persist(&path).unwrap();
    store_with(&[(1, 4.0)]).persist(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2); // header + one row
}

#[test]
fn test_persist_failure_keeps_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("measurements.csv");

    let store = store_with(&[(1, 10.0), (2, 10.5)]);
    let result = store.persist(&path);

    assert!(matches!(result, Err(AcquisitionError::Persistence(_))));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_empty_store_persists_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.csv");

    MeasurementStore::new().persist(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
}
