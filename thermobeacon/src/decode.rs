//! Decoding of a single manufacturer-data record into physical measurements.

use crate::macaddress::{MacAddress, ParseMacAddressError};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Hex byte tokens a record must carry: 6 address bytes followed by four
/// 16-bit fields.
const MIN_TOKENS: usize = 14;
/// Offset of the first data byte, just after the reversed address.
const DATA_START: usize = 6;
/// Scaling divisors for battery voltage, temperature, humidity and counter,
/// in record order.
const SCALING: [f64; 4] = [1000.0, 16.0, 16.0, 1.0];

/// An error decoding a manufacturer-data record.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("Record has {length} fields, expected at least {expected}")]
    WrongLength { length: usize, expected: usize },
    #[error("Invalid hex field '{0}'")]
    InvalidField(String),
    #[error(transparent)]
    InvalidAddress(#[from] ParseMacAddressError),
}

/// One decoded advertisement from a single beacon.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub mac: MacAddress,
    /// Battery voltage in volts.
    pub battery_voltage: f64,
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Device-local free-running timer in seconds since an unknown epoch.
    /// Only good for relative-time checks within one capture.
    pub counter: i64,
}

impl Display for Sample {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {:.2}°C, {:.2}% humidity, {:.3} V, counter {}",
            self.mac, self.temperature, self.humidity, self.battery_voltage, self.counter
        )
    }
}

impl Sample {
    /// Decodes a normalized record that starts with the reversed device
    /// address, as produced by the extractor.
    ///
    /// Tokens beyond the four data fields (hex-dump gutter text and the
    /// like) are ignored.
    pub fn decode(record: &str) -> Result<Sample, DecodeError> {
        let tokens: Vec<&str> = record.split_whitespace().collect();
        if tokens.len() < MIN_TOKENS {
            return Err(DecodeError::WrongLength {
                length: tokens.len(),
                expected: MIN_TOKENS,
            });
        }
        let mac = MacAddress::from_reversed_tokens(&tokens[..DATA_START])?;

        let mut fields = [0.0; 4];
        for (index, scale) in SCALING.iter().enumerate() {
            let offset = DATA_START + 2 * index;
            // Data bytes are backwards in pairs.
            let pair = format!("{}{}", tokens[offset + 1], tokens[offset]);
            let raw =
                u16::from_str_radix(&pair, 16).map_err(|_| DecodeError::InvalidField(pair))?;
            let mut value = f64::from(raw) / scale;
            // Voltage, temperature and humidity are 12-bit two's-complement
            // quantities, so a scaled value at or above 2048 had its sign bit
            // misread as +2048. The counter is a plain unsigned timer and is
            // left alone.
            if index < 3 && value >= 2048.0 {
                value -= 4096.0;
            }
            fields[index] = value;
        }

        Ok(Sample {
            mac,
            battery_voltage: fields[0],
            temperature: fields[1],
            humidity: fields[2],
            counter: fields[3] as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a record for the given raw field values, the way they appear in
    /// a capture: reversed address, then little-endian byte pairs.
    fn record(raw_fields: [u16; 4]) -> String {
        let mut record = "03 0D 00 00 02 1A".to_string();
        for raw in raw_fields {
            let [lo, hi] = raw.to_le_bytes();
            record.push_str(&format!(" {lo:02X} {hi:02X}"));
        }
        record
    }

    #[test]
    fn decode_valid() {
        // 3.000 V, 20.0 °C, 55.625 %, counter 100.
        let sample = Sample::decode(&record([3000, 320, 890, 100])).unwrap();
        assert_eq!(sample.mac.to_string(), "1A:02:00:00:0D:03");
        assert_eq!(sample.battery_voltage, 3.0);
        assert_eq!(sample.temperature, 20.0);
        assert_eq!(sample.humidity, 55.625);
        assert_eq!(sample.counter, 100);
    }

    #[test]
    fn decode_ignores_trailing_gutter() {
        let record = format!("{}  ........@.Z.D...", record([3000, 320, 890, 100]));
        let sample = Sample::decode(&record).unwrap();
        assert_eq!(sample.counter, 100);
    }

    #[test]
    fn decode_too_short() {
        assert_eq!(
            Sample::decode("03 0D 00 00 02 1A B8 0B"),
            Err(DecodeError::WrongLength {
                length: 8,
                expected: 14,
            })
        );
    }

    #[test]
    fn decode_empty() {
        assert_eq!(
            Sample::decode(""),
            Err(DecodeError::WrongLength {
                length: 0,
                expected: 14,
            })
        );
    }

    #[test]
    fn decode_bad_hex() {
        assert_eq!(
            Sample::decode("03 0D 00 00 02 1A ZZ 0B 40 01 7A 03 64 00"),
            Err(DecodeError::InvalidField("0BZZ".to_string()))
        );
    }

    #[test]
    fn decode_negative_temperature() {
        // -5.5 °C is 0xFFA8 in the sensor's 16-bit encoding.
        let sample = Sample::decode(&record([3000, 0xFFA8, 890, 100])).unwrap();
        assert_eq!(sample.temperature, -5.5);
    }

    /// A scaled value of exactly 2048 wraps to -2048; 2047 does not.
    #[test]
    fn sign_correction_boundary() {
        let wrapped = Sample::decode(&record([3000, 2048 * 16, 890, 100])).unwrap();
        assert_eq!(wrapped.temperature, -2048.0);

        let unwrapped = Sample::decode(&record([3000, 2047 * 16, 890, 100])).unwrap();
        assert_eq!(unwrapped.temperature, 2047.0);
    }

    /// The counter is never sign-corrected, however large it gets.
    #[test]
    fn counter_not_sign_corrected() {
        let sample = Sample::decode(&record([3000, 320, 890, 40000])).unwrap();
        assert_eq!(sample.counter, 40000);
    }

    /// Encoding known values with the documented scaling and decoding them
    /// again recovers the originals.
    #[test]
    fn round_trip() {
        let sample = Sample::decode(&record([2970, (23.4375f64 * 16.0) as u16, 801, 12345]))
            .unwrap();
        assert!((sample.battery_voltage - 2.97).abs() < 1e-6);
        assert!((sample.temperature - 23.4375).abs() < 1e-6);
        assert!((sample.humidity - 50.0625).abs() < 1e-6);
        assert_eq!(sample.counter, 12345);
    }

    #[test]
    fn display() {
        let sample = Sample::decode(&record([3000, 320, 890, 100])).unwrap();
        assert_eq!(
            sample.to_string(),
            "1A:02:00:00:0D:03: 20.00°C, 55.62% humidity, 3.000 V, counter 100"
        );
    }
}
