//! Utility to report one quantity per location over time from the
//! accumulated scan log.

mod history;

use crate::history::Field;
use eyre::{Report, WrapErr};
use std::fs::read_to_string;
use std::process;

fn main() -> Result<(), Report> {
    stable_eyre::install()?;
    pretty_env_logger::init();
    color_backtrace::install();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        usage_and_exit();
    }
    let filename = &args[1];
    let (Ok(code), Ok(samples)) = (args[2].parse::<usize>(), args[3].parse::<usize>()) else {
        usage_and_exit();
    };
    let Some(field) = Field::from_code(code) else {
        usage_and_exit();
    };

    let contents = read_to_string(filename).wrap_err_with(|| format!("Reading {filename}"))?;
    let records = history::parse_log(contents.lines());
    let locations = history::locations(&records);

    println!("{} at locations", field.label());
    println!("\t\t{locations:?}");

    let start = records.len().saturating_sub(samples);
    for record in &records[start..] {
        let row = history::project(record, &locations, field);
        println!("{} {}", record.timestamp, history::format_row(&row));
    }

    Ok(())
}

fn usage_and_exit() -> ! {
    eprintln!("Usage: thermobeacon-history <logfile> <field> <samples>");
    eprintln!(
        "Field codes: temperature 1, humidity 2, vpd 3, dew point 4, heat index 5, battery voltage 6"
    );
    process::exit(1);
}
