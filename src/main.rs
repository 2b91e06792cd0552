//! sylvac-capture - BLE measurement logger for Sylvac digital calipers
//!
//! Main entry point: runs one acquisition from the command line.

use sylvac_capture::{AcquisitionConfig, AcquisitionEvent, Controller};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sylvac-capture v{}", env!("CARGO_PKG_VERSION"));

    // Usage: sylvac-capture [count] [interval_seconds] [name_filter] [output]
    let mut args = std::env::args().skip(1);
    let mut config = AcquisitionConfig::default();
    if let Some(count) = args.next() {
        config.target_count = count.parse()?;
    }
    if let Some(interval) = args.next() {
        config.interval_seconds = interval.parse()?;
    }
    if let Some(filter) = args.next() {
        config.name_filter = filter;
    }
    if let Some(output) = args.next() {
        config.output_path = output.into();
    }

    let mut controller = Controller::new(config);

    let events = controller.event_receiver();
    std::thread::spawn(move || {
        for event in events {
            match event {
                AcquisitionEvent::DeviceConnected { name } => {
                    println!("Connected to {}", name);
                }
                AcquisitionEvent::Measurement(record) => {
                    println!("Measurement {}: {:.3} mm", record.sequence, record.value_mm);
                }
                _ => {}
            }
        }
    });

    let cancel = controller.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("cancellation requested");
            cancel.cancel();
        }
    });

    let summary = controller.run().await?;

    println!("Recorded {} measurements", summary.count);
    if let Some(path) = &summary.output {
        println!("Saved to {}", path.display());
    }
    if let Some(err) = &summary.persist_error {
        eprintln!("Failed to save measurements: {}", err);
    }

    Ok(())
}
