//! Range and counter-window checks that weed out corrupted advertisements.
//!
//! The odd packet arrives with radically incorrect values; a temperature
//! range check catches most of them, and a per-device window around the
//! median counter value catches the rest.

use crate::decode::Sample;
use crate::macaddress::MacAddress;
use itertools::Itertools;
use std::collections::HashMap;
use std::time::Duration;

/// Lowest temperature the vendor claims the sensors report.
pub const TEMPERATURE_MIN: f64 = -20.0;
/// Highest temperature the vendor claims the sensors report.
pub const TEMPERATURE_MAX: f64 = 65.0;

/// Keeps only samples whose temperature is physically plausible. Bounds are
/// inclusive.
pub fn filter_range(samples: Vec<Sample>) -> Vec<Sample> {
    samples
        .into_iter()
        .filter(|sample| (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&sample.temperature))
        .collect()
}

/// Half-open bounds on a device's counter values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidationWindow {
    pub lower: i64,
    pub upper: i64,
}

impl ValidationWindow {
    fn around(midpoint: f64, half_width: f64) -> Self {
        ValidationWindow {
            lower: (midpoint - half_width).floor() as i64,
            upper: (midpoint + half_width).floor() as i64,
        }
    }

    pub fn contains(&self, counter: i64) -> bool {
        self.lower <= counter && counter < self.upper
    }
}

/// Derives a per-device window centred on the median counter value of that
/// device's samples. Devices with no samples get a degenerate window centred
/// at 0.
pub fn counter_windows(
    devices: &[MacAddress],
    samples: &[Sample],
    window: Duration,
) -> HashMap<MacAddress, ValidationWindow> {
    let counters: HashMap<MacAddress, Vec<i64>> = samples
        .iter()
        .map(|sample| (sample.mac, sample.counter))
        .into_group_map();
    let half_width = window.as_secs_f64();
    devices
        .iter()
        .map(|device| {
            let midpoint = counters.get(device).map_or(0.0, |values| median(values));
            (*device, ValidationWindow::around(midpoint, half_width))
        })
        .collect()
}

/// Drops samples whose counter falls outside their own device's window.
pub fn filter_window(
    samples: Vec<Sample>,
    windows: &HashMap<MacAddress, ValidationWindow>,
) -> Vec<Sample> {
    samples
        .into_iter()
        .filter(|sample| {
            windows
                .get(&sample.mac)
                .is_some_and(|window| window.contains(sample.counter))
        })
        .collect()
}

fn median(values: &[i64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temperature: f64, counter: i64) -> Sample {
        Sample {
            mac: "1A:02:00:00:0D:03".parse().unwrap(),
            battery_voltage: 3.0,
            temperature,
            humidity: 50.0,
            counter,
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let kept = filter_range(vec![sample(-20.0, 0), sample(65.0, 0), sample(20.0, 0)]);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn range_rejects_just_outside() {
        assert!(filter_range(vec![sample(-20.01, 0), sample(65.01, 0)]).is_empty());
    }

    #[test]
    fn window_excludes_corrupted_counter() {
        let devices = vec![sample(20.0, 0).mac];
        let samples: Vec<Sample> = [100, 102, 101, 9999]
            .into_iter()
            .map(|counter| sample(20.0, counter))
            .collect();

        let windows = counter_windows(&devices, &samples, Duration::from_secs(300));
        assert_eq!(
            windows[&devices[0]],
            ValidationWindow {
                lower: -199,
                upper: 401,
            }
        );

        let kept = filter_window(samples, &windows);
        let counters: Vec<i64> = kept.iter().map(|sample| sample.counter).collect();
        assert_eq!(counters, vec![100, 102, 101]);
    }

    #[test]
    fn window_bounds_are_half_open() {
        let devices = vec![sample(20.0, 0).mac];
        let samples = vec![sample(20.0, 100)];
        let windows = counter_windows(&devices, &samples, Duration::from_secs(300));
        let window = windows[&devices[0]];
        assert_eq!(window, ValidationWindow { lower: -200, upper: 400 });
        assert!(window.contains(-200));
        assert!(window.contains(399));
        assert!(!window.contains(400));
    }

    #[test]
    fn silent_device_gets_degenerate_window() {
        let silent: MacAddress = "BE:25:00:00:0A:29".parse().unwrap();
        let windows = counter_windows(&[silent], &[], Duration::from_secs(300));
        assert_eq!(
            windows[&silent],
            ValidationWindow {
                lower: -300,
                upper: 300,
            }
        );
    }

    #[test]
    fn odd_and_even_medians() {
        let devices = vec![sample(20.0, 0).mac];
        // Even count: midpoint between the middle pair, floored bounds.
        let samples: Vec<Sample> = [100, 101].into_iter().map(|c| sample(20.0, c)).collect();
        let windows = counter_windows(&devices, &samples, Duration::from_secs(10));
        assert_eq!(
            windows[&devices[0]],
            ValidationWindow {
                lower: 90,
                upper: 110,
            }
        );
    }
}
