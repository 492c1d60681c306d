//! Averaging of validated samples into one report per device.

use crate::climate;
use crate::decode::Sample;
use crate::macaddress::MacAddress;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Averaged readings and derived quantities for one location.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub vapor_pressure_deficit: f64,
    pub dew_point: f64,
    pub heat_index: f64,
    pub battery_voltage: f64,
}

impl Report {
    /// Obviously-wrong placeholder for a device that produced no valid
    /// samples, keeping the output shape stable for downstream parsers.
    fn sentinel(location: String) -> Self {
        Report {
            location,
            temperature: 0.0,
            humidity: -273.15,
            vapor_pressure_deficit: 100.0,
            dew_point: -1.0,
            heat_index: -1.0,
            battery_voltage: -1.0,
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "('{}', {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2})",
            self.location,
            self.temperature,
            self.humidity,
            self.vapor_pressure_deficit,
            self.dew_point,
            self.heat_index,
            self.battery_voltage
        )
    }
}

/// Outcome of one capture run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanSummary {
    /// One report per discovered device, sorted by location.
    pub reports: Vec<Report>,
    /// Set when some device yielded no valid samples this run.
    pub any_failed: bool,
}

/// Averages the validated samples per device and derives the reported
/// quantities. Every discovered device gets an entry, so a failed device
/// still shows up (as a sentinel) in the log.
pub fn aggregate(
    devices: &[MacAddress],
    validated: &[Sample],
    names: &HashMap<MacAddress, String>,
) -> ScanSummary {
    let by_device: HashMap<MacAddress, Vec<&Sample>> = validated
        .iter()
        .map(|sample| (sample.mac, sample))
        .into_group_map();

    let mut any_failed = false;
    let mut reports = Vec::with_capacity(devices.len());
    for device in devices {
        let location = names
            .get(device)
            .cloned()
            .unwrap_or_else(|| device.to_string());
        match by_device.get(device) {
            Some(samples) => {
                let count = samples.len() as f64;
                let battery_voltage =
                    samples.iter().map(|s| s.battery_voltage).sum::<f64>() / count;
                let temperature = samples.iter().map(|s| s.temperature).sum::<f64>() / count;
                let humidity = samples.iter().map(|s| s.humidity).sum::<f64>() / count;
                reports.push(Report {
                    location,
                    temperature: round2(temperature),
                    humidity: round2(humidity),
                    vapor_pressure_deficit: round2(climate::vapor_pressure_deficit(
                        temperature,
                        humidity,
                    )),
                    dew_point: round2(climate::dew_point(temperature, humidity)),
                    heat_index: round2(climate::heat_index(temperature, humidity)),
                    battery_voltage: round2(battery_voltage),
                });
            }
            None => {
                any_failed = true;
                reports.push(Report::sentinel(location));
            }
        }
    }
    reports.sort_by(|a, b| a.location.cmp(&b.location));

    ScanSummary { reports, any_failed }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
