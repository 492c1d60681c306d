use eyre::Report;
use serde::de::Error as _;
use serde::{Deserialize as _, Deserializer};
use serde_derive::Deserialize;
use stable_eyre::eyre::WrapErr;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::time::Duration;
use thermobeacon::{MacAddress, ParseMacAddressError};

const DEFAULT_SENSOR_NAMES_FILENAME: &str = "sensor-names.toml";
const DEFAULT_FAILURE_DUMP_FILENAME: &str = "capture-failure.log";
const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(300);
const CONFIG_FILENAME: &str = "thermobeacon-logger.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// TOML table mapping beacon addresses to location names.
    pub sensor_names_filename: String,
    /// Where the raw capture is dumped when some device yields no valid
    /// samples.
    pub failure_dump_filename: String,
    /// Report per-device signal strength, useful when placing devices.
    pub collect_signal_strength: bool,
    /// Half-width of the per-device counter validation window. Defaults to
    /// the scan duration, but the two can be set independently.
    #[serde(
        deserialize_with = "de_opt_duration_seconds",
        rename = "validation_window_seconds"
    )]
    pub validation_window: Option<Duration>,
    pub capture: CaptureConfig,
}

impl Config {
    pub fn from_file() -> Result<Config, Report> {
        Config::read(CONFIG_FILENAME)
    }

    fn read(filename: &str) -> Result<Config, Report> {
        let config_file =
            read_to_string(filename).wrap_err_with(|| format!("Reading {filename}"))?;
        Ok(toml::from_str(&config_file)?)
    }

    /// The counter window half-width to validate against.
    pub fn validation_window(&self) -> Duration {
        self.validation_window.unwrap_or(self.capture.scan_duration)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            sensor_names_filename: DEFAULT_SENSOR_NAMES_FILENAME.to_owned(),
            failure_dump_filename: DEFAULT_FAILURE_DUMP_FILENAME.to_owned(),
            collect_signal_strength: false,
            validation_window: None,
            capture: Default::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Adapter to `select` in the control shell; the default adapter if
    /// unset.
    #[serde(deserialize_with = "de_opt_mac_address")]
    pub controller: Option<MacAddress>,
    #[serde(
        deserialize_with = "de_duration_seconds",
        rename = "scan_duration_seconds"
    )]
    pub scan_duration: Duration,
    /// Read a previously saved capture instead of scanning. Fast and
    /// reproducible, for debugging.
    pub replay_filename: Option<String>,
    /// Save the raw capture for later replay.
    pub capture_filename: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> CaptureConfig {
        CaptureConfig {
            controller: None,
            scan_duration: DEFAULT_SCAN_DURATION,
            replay_filename: None,
            capture_filename: None,
        }
    }
}

pub fn de_duration_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let seconds = u64::deserialize(d)?;
    Ok(Duration::from_secs(seconds))
}

fn de_opt_duration_seconds<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Duration>, D::Error> {
    let seconds = u64::deserialize(d)?;
    Ok(Some(Duration::from_secs(seconds)))
}

fn de_opt_mac_address<'de, D: Deserializer<'de>>(d: D) -> Result<Option<MacAddress>, D::Error> {
    let address = String::deserialize(d)?;
    address.parse().map(Some).map_err(D::Error::custom)
}

pub fn read_sensor_names(filename: &str) -> Result<HashMap<MacAddress, String>, Report> {
    let sensor_names_file =
        read_to_string(filename).wrap_err_with(|| format!("Reading {filename}"))?;
    let names = toml::from_str::<HashMap<String, String>>(&sensor_names_file)?
        .into_iter()
        .map(|(mac_address, name)| Ok::<_, ParseMacAddressError>((mac_address.parse()?, name)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(names)
}
