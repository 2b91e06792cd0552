//! Controller tests that need no device: configuration rejection happens
//! before any BLE interaction.

use sylvac_capture::{AcquisitionConfig, AcquisitionError, AcquisitionEvent, Controller};

#[tokio::test]
async fn test_zero_target_count_rejected_before_device_interaction() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("measurements.csv");

    let config = AcquisitionConfig {
        target_count: 0,
        output_path: output_path.clone(),
        ..AcquisitionConfig::default()
    };

    let mut controller = Controller::new(config);
    let events = controller.event_receiver();

    let result = controller.run().await;

    assert!(matches!(result, Err(AcquisitionError::Configuration(_))));
    assert!(controller.records().is_empty());
    assert!(!output_path.exists());

    let terminal: Vec<AcquisitionEvent> = events.try_iter().collect();
    assert_eq!(terminal.len(), 1);
    assert!(matches!(terminal[0], AcquisitionEvent::Aborted { .. }));
}

#[tokio::test]
async fn test_negative_interval_rejected() {
    let config = AcquisitionConfig {
        interval_seconds: -0.5,
        ..AcquisitionConfig::default()
    };

    let result = Controller::new(config).run().await;
    assert!(matches!(result, Err(AcquisitionError::Configuration(_))));
}

#[tokio::test]
async fn test_nan_interval_rejected() {
    let config = AcquisitionConfig {
        interval_seconds: f64::NAN,
        ..AcquisitionConfig::default()
    };

    let result = Controller::new(config).run().await;
    assert!(matches!(result, Err(AcquisitionError::Configuration(_))));
}

#[tokio::test]
async fn test_oversized_interval_rejected() {
    // Finite but beyond what a Duration can hold; must fail validation
    // instead of panicking after the device is already connected.
    let config = AcquisitionConfig {
        interval_seconds: 1e300,
        ..AcquisitionConfig::default()
    };

    let result = Controller::new(config).run().await;
    assert!(matches!(result, Err(AcquisitionError::Configuration(_))));
}

#[test]
fn test_zero_interval_is_valid() {
    let config = AcquisitionConfig {
        interval_seconds: 0.0,
        ..AcquisitionConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_config_is_valid() {
    assert!(AcquisitionConfig::default().validate().is_ok());
}
