//! Batch logger for ThermoBeacon thermometers.
//!
//! Scans for advertising packets for a few minutes, then trawls through the
//! capture to find and decode items of interest. Suitable for operation via
//! cron; one summary line per run goes to stdout, where it can be processed
//! at leisure by `thermobeacon-history`. If you want data fast this isn't
//! for you.

mod config;
mod rssi;
mod session;

use crate::config::{Config, read_sensor_names};
use eyre::Report;
use itertools::Itertools;
use log::error;
use std::fs;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Report> {
    stable_eyre::install()?;
    pretty_env_logger::init();
    color_backtrace::install();

    let config = Config::from_file()?;
    let names = read_sensor_names(&config.sensor_names_filename)?;

    let capture = session::collect(&config.capture).await?;
    if capture.is_empty() {
        println!("Data collection failed");
        process::exit(1);
    }
    if let Some(filename) = &config.capture.capture_filename {
        save_capture(filename, &capture);
    }

    let summary = match thermobeacon::run(&capture, &names, config.validation_window()) {
        Ok(summary) => summary,
        Err(e) => {
            println!("{e}");
            process::exit(1);
        }
    };

    if summary.any_failed {
        // Keep the raw capture around so the silent device can be diagnosed.
        save_capture(&config.failure_dump_filename, &capture);
    }

    if config.collect_signal_strength {
        let stats = rssi::signal_strengths(&capture, &names);
        if !stats.is_empty() {
            println!("Signal strength: [{}]", stats.iter().join(", "));
        }
    }

    println!("Data: [{}]", summary.reports.iter().join(", "));
    Ok(())
}

fn save_capture(filename: &str, capture: &[String]) {
    if let Err(e) = fs::write(filename, capture.join("\n")) {
        error!("Failed to save capture to {filename}: {e}");
    }
}
