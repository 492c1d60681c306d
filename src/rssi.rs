//! Optional signal-strength diagnostics, useful when deciding where devices
//! can live; of little use once satisfactory locations have been found.

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use thermobeacon::MacAddress;
use thermobeacon::normalize::normalize;
use thermobeacon::scan::discover;

const RSSI_MARKER: &str = "RSSI";

/// Signal strength statistics for one thermometer across one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalStrength {
    pub location: String,
    pub min: i32,
    pub mean: f64,
    pub max: i32,
}

impl Display for SignalStrength {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "('{}', {}, {:.2}, {})",
            self.location, self.min, self.mean, self.max
        )
    }
}

/// Collects min/mean/max RSSI per thermometer found in the capture, sorted
/// by location. Devices without any RSSI record are omitted.
pub fn signal_strengths(
    lines: &[String],
    names: &HashMap<MacAddress, String>,
) -> Vec<SignalStrength> {
    let lines: Vec<String> = lines.iter().map(|line| normalize(line)).collect();
    let devices = discover(&lines);

    let mut levels_by_device: HashMap<MacAddress, Vec<i32>> = HashMap::new();
    for line in &lines {
        if !line.contains(RSSI_MARKER) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (Some(address), Some(level)) = (fields.get(1), fields.get(3)) else {
            continue;
        };
        let (Ok(address), Ok(level)) = (address.parse::<MacAddress>(), level.parse::<i32>())
        else {
            continue;
        };
        if devices.contains(&address) {
            levels_by_device.entry(address).or_default().push(level);
        }
    }

    levels_by_device
        .into_iter()
        .map(|(address, levels)| {
            let location = names
                .get(&address)
                .cloned()
                .unwrap_or_else(|| address.to_string());
            SignalStrength {
                location,
                min: levels.iter().copied().min().unwrap_or(0),
                mean: levels.iter().sum::<i32>() as f64 / levels.len() as f64,
                max: levels.iter().copied().max().unwrap_or(0),
            }
        })
        .sorted_by(|a, b| a.location.cmp(&b.location))
        .collect()
}
