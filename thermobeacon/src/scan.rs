//! Locating ThermoBeacon devices and their advertisement payloads within a
//! normalized capture.

use crate::macaddress::MacAddress;
use crate::normalize::DEVICE_MARKER;
use log::warn;
use std::collections::HashSet;

/// Device name the beacon family advertises under, upper-cased to match
/// normalized records.
pub const FAMILY_NAME: &str = "THERMOBEACON";

/// Finds the addresses of all ThermoBeacon devices in the capture,
/// deduplicated in first-seen order.
///
/// A discovery record is a line carrying the family name; removing whitespace
/// and the known marker substrings leaves the bare address. Residue that does
/// not parse as an address is skipped with a warning.
pub fn discover(lines: &[String]) -> Vec<MacAddress> {
    let mut seen = HashSet::new();
    let mut devices = Vec::new();
    for line in lines {
        if !line.contains(FAMILY_NAME) {
            continue;
        }
        let bare = line
            .replace(' ', "")
            .replace(DEVICE_MARKER, "")
            .replace(FAMILY_NAME, "");
        match bare.parse::<MacAddress>() {
            Ok(mac) => {
                if seen.insert(mac) {
                    devices.push(mac);
                }
            }
            Err(e) => warn!("Ignoring unparseable device record {line:?}: {e}"),
        }
    }
    devices
}

/// Collects, for each known device in order, every line carrying its reversed
/// address, truncated to start at the address itself.
pub fn extract_payloads(lines: &[String], devices: &[MacAddress]) -> Vec<String> {
    let mut payloads = Vec::new();
    for device in devices {
        let needle = device.reversed_payload();
        for line in lines {
            if let Some(start) = line.find(&needle) {
                payloads.push(line[start..].to_owned());
            }
        }
    }
    payloads
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    #[test]
    fn discover_dedups_in_first_seen_order() {
        let lines = vec![
            "DEVICE 1A:67:00:00:06:5C THERMOBEACON".to_string(),
            "DEVICE BC:DA:00:00:04:27 THERMOBEACON".to_string(),
            "DEVICE 1A:67:00:00:06:5C THERMOBEACON".to_string(),
        ];
        assert_eq!(
            discover(&lines),
            vec![mac("1A:67:00:00:06:5C"), mac("BC:DA:00:00:04:27")]
        );
    }

    #[test]
    fn discover_skips_other_devices_and_junk() {
        let lines = vec![
            "DEVICE 11:22:33:44:55:66 SOMETHINGELSE".to_string(),
            "DEVICE NOT-AN-ADDRESS THERMOBEACON".to_string(),
            "DEVICE 1A:02:00:00:0D:03 THERMOBEACON".to_string(),
        ];
        assert_eq!(discover(&lines), vec![mac("1A:02:00:00:0D:03")]);
    }

    #[test]
    fn discover_empty_capture() {
        assert_eq!(discover(&[]), Vec::new());
    }

    #[test]
    fn extract_cuts_leading_noise() {
        let lines = vec!["GARBAGE 03 0D 00 00 02 1A B8 0B 40 01 7A 03 64 00".to_string()];
        let payloads = extract_payloads(&lines, &[mac("1A:02:00:00:0D:03")]);
        assert_eq!(
            payloads,
            vec!["03 0D 00 00 02 1A B8 0B 40 01 7A 03 64 00".to_string()]
        );
    }

    #[test]
    fn extract_nothing_for_silent_device() {
        let lines = vec!["DEVICE 1A:02:00:00:0D:03 THERMOBEACON".to_string()];
        assert_eq!(
            extract_payloads(&lines, &[mac("1A:02:00:00:0D:03")]),
            Vec::<String>::new()
        );
    }
}
