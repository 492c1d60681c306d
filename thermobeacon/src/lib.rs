//! A library for turning raw ThermoBeacon advertisement captures into
//! trustworthy per-location measurements.
//!
//! The input is whatever a Bluetooth control shell printed during a scan
//! window: device records, manufacturer-data dumps, and plenty of unrelated
//! noise. [`run`] cleans the capture up, finds the beacons and their
//! payloads, decodes them, throws out implausible and clock-skewed samples,
//! and averages what survives into one [`Report`] per location.

pub mod aggregate;
pub mod climate;
pub mod decode;
pub mod macaddress;
pub mod normalize;
pub mod scan;
pub mod validate;

pub use aggregate::{Report, ScanSummary};
pub use decode::{DecodeError, Sample};
pub use macaddress::{MacAddress, ParseMacAddressError};

use log::warn;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// A fatal condition that stops a capture run. The display strings are the
/// one-line diagnostics logged in place of a data line.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum PipelineError {
    /// Discovery found no devices of the beacon family.
    #[error("No thermometers found")]
    NoThermometers,
    /// No advertisement payloads matched any discovered device.
    #[error("No temperature data in scan")]
    NoPayloads,
    /// Every decoded sample failed the temperature range check.
    #[error("No data in range")]
    NoneInRange,
    /// Every in-range sample fell outside its device's counter window.
    #[error("Data validation checks all fail")]
    AllOutsideWindow,
}

/// Runs the whole decode-and-validate pipeline over one capture.
///
/// `lines` is the raw capture; normalization happens here and is idempotent,
/// so pre-cleaned input is fine too. `names` maps device addresses to
/// human-readable locations, with unmapped devices reported under their
/// address. `validation_window` is the half-width of the per-device counter
/// window, normally the scan duration.
///
/// Malformed payload records are logged and skipped rather than failing the
/// run; the fatal conditions are the ones in [`PipelineError`].
pub fn run(
    lines: &[String],
    names: &HashMap<MacAddress, String>,
    validation_window: Duration,
) -> Result<ScanSummary, PipelineError> {
    let lines = normalize::normalize_all(lines);

    let devices = scan::discover(&lines);
    if devices.is_empty() {
        return Err(PipelineError::NoThermometers);
    }

    let payloads = scan::extract_payloads(&lines, &devices);
    if payloads.is_empty() {
        return Err(PipelineError::NoPayloads);
    }

    let samples: Vec<Sample> = payloads
        .iter()
        .filter_map(|payload| match Sample::decode(payload) {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!("Skipping malformed record {payload:?}: {e}");
                None
            }
        })
        .collect();

    let in_range = validate::filter_range(samples);
    if in_range.is_empty() {
        return Err(PipelineError::NoneInRange);
    }

    let windows = validate::counter_windows(&devices, &in_range, validation_window);
    let validated = validate::filter_window(in_range, &windows);
    if validated.is_empty() {
        return Err(PipelineError::AllOutsideWindow);
    }

    Ok(aggregate::aggregate(&devices, &validated, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(300);

    fn record(reversed_mac: &str, raw_fields: [u16; 4]) -> String {
        let mut line = format!("  {reversed_mac}");
        for raw in raw_fields {
            let [lo, hi] = raw.to_le_bytes();
            line.push_str(&format!(" {lo:02X} {hi:02X}"));
        }
        line
    }

    #[test]
    fn empty_capture_finds_no_thermometers() {
        assert_eq!(
            run(&[], &HashMap::new(), WINDOW),
            Err(PipelineError::NoThermometers)
        );
    }

    #[test]
    fn unrelated_lines_find_no_thermometers() {
        let lines = vec!["[CHG] Device 11:22:33:44:55:66 RSSI: -44".to_string()];
        assert_eq!(
            run(&lines, &HashMap::new(), WINDOW),
            Err(PipelineError::NoThermometers)
        );
    }

    #[test]
    fn discovery_without_payloads_is_no_data() {
        let lines = vec!["[NEW] Device 1A:02:00:00:0D:03 ThermoBeacon".to_string()];
        assert_eq!(
            run(&lines, &HashMap::new(), WINDOW),
            Err(PipelineError::NoPayloads)
        );
    }

    #[test]
    fn out_of_range_samples_are_no_data_in_range() {
        let lines = vec![
            "[NEW] Device 1A:02:00:00:0D:03 ThermoBeacon".to_string(),
            // 70 °C, beyond anything the sensor can measure.
            record("03 0D 00 00 02 1A", [3000, 70 * 16, 890, 100]),
        ];
        assert_eq!(
            run(&lines, &HashMap::new(), WINDOW),
            Err(PipelineError::NoneInRange)
        );
    }

    #[test]
    fn counters_straddling_their_own_window_all_fail() {
        // Two wildly different counters: the window straddles the midpoint
        // and contains neither.
        let lines = vec![
            "[NEW] Device 1A:02:00:00:0D:03 ThermoBeacon".to_string(),
            record("03 0D 00 00 02 1A", [3000, 320, 890, 0]),
            record("03 0D 00 00 02 1A", [3000, 320, 890, 65000]),
        ];
        assert_eq!(
            run(&lines, &HashMap::new(), WINDOW),
            Err(PipelineError::AllOutsideWindow)
        );
    }

    #[test]
    fn malformed_records_are_skipped() {
        let lines = vec![
            "[NEW] Device 1A:02:00:00:0D:03 ThermoBeacon".to_string(),
            // Truncated dump, then a good one.
            "  03 0D 00 00 02 1A B8 0B".to_string(),
            record("03 0D 00 00 02 1A", [3000, 320, 890, 100]),
        ];
        let summary = run(&lines, &HashMap::new(), WINDOW).unwrap();
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].temperature, 20.0);
    }
}
