//! Parsing of historical `Data:` log lines into per-location time series.
//!
//! Each run of the logger leaves one summary line in the log, usually
//! prefixed with a timestamp by whatever scheduled it. The prefix is kept
//! verbatim as the row label; this module never interprets it.

use itertools::Itertools;
use std::collections::BTreeSet;

/// Marker introducing the report list in a log line.
pub const DATA_MARKER: &str = "Data:";
/// Diagnostic logged by runs that found no payloads; such lines are skipped.
const NO_DATA_MARKER: &str = "No temperature data in scan";

/// Reported quantity selectable on the command line, numbered as documented
/// in the usage text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Temperature = 1,
    Humidity = 2,
    VaporPressureDeficit = 3,
    DewPoint = 4,
    HeatIndex = 5,
    BatteryVoltage = 6,
}

impl Field {
    pub fn from_code(code: usize) -> Option<Field> {
        match code {
            1 => Some(Field::Temperature),
            2 => Some(Field::Humidity),
            3 => Some(Field::VaporPressureDeficit),
            4 => Some(Field::DewPoint),
            5 => Some(Field::HeatIndex),
            6 => Some(Field::BatteryVoltage),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Temperature => "Temperature",
            Field::Humidity => "Humidity",
            Field::VaporPressureDeficit => "Vapour Pressure Deficit",
            Field::DewPoint => "Dew point",
            Field::HeatIndex => "Heat index",
            Field::BatteryVoltage => "Battery voltage",
        }
    }

    fn index(self) -> usize {
        self as usize - 1
    }
}

/// One parsed log line: when it was recorded and the readings per location.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// Whatever preceded the data marker, verbatim.
    pub timestamp: String,
    /// (location, numeric fields) per report tuple, in line order.
    pub entries: Vec<(String, Vec<f64>)>,
}

/// Parses every line carrying a data marker, in file order.
pub fn parse_log<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<LogRecord> {
    lines.into_iter().filter_map(parse_record).collect()
}

fn parse_record(line: &str) -> Option<LogRecord> {
    if line.contains(NO_DATA_MARKER) {
        return None;
    }
    let (prefix, rest) = line.split_once(DATA_MARKER)?;
    Some(LogRecord {
        timestamp: prefix.trim().to_owned(),
        entries: tuples(rest).map(parse_entry).collect(),
    })
}

/// Yields the text inside each `(` .. `)` pair, left to right.
fn tuples(text: &str) -> impl Iterator<Item = &str> {
    text.split('(')
        .skip(1)
        .filter_map(|part| part.split(')').next())
}

fn parse_entry(tuple: &str) -> (String, Vec<f64>) {
    let mut parts = tuple.split(',');
    let location = parts
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_owned();
    let values = parts
        .filter_map(|part| part.trim().parse::<f64>().ok())
        .collect();
    (location, values)
}

/// The sorted union of locations seen anywhere in the log.
pub fn locations(records: &[LogRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.entries.iter().map(|(location, _)| location.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Projects one field of one record onto the given location columns; `None`
/// where a location has no reading in this record.
pub fn project(record: &LogRecord, locations: &[String], field: Field) -> Vec<Option<f64>> {
    locations
        .iter()
        .map(|location| {
            record
                .entries
                .iter()
                .find(|(entry_location, _)| entry_location == location)
                .and_then(|(_, values)| values.get(field.index()).copied())
        })
        .collect()
}

/// Fixed-width rendering of one row of values; missing readings show as
/// `---`.
pub fn format_row(values: &[Option<f64>]) -> String {
    values
        .iter()
        .map(|value| {
            let text = match value {
                Some(value) => format!("{value:.2}"),
                None => "---".to_owned(),
            };
            format!("{text:<6}")
        })
        .join(" ,  ")
}
