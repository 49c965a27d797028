/// Example: Parse a station source file and print its points
///
/// Usage:
///   cargo run --example parse_source -- <format> <file>
///
/// <format> is one of json-measurements, nmea-gps, rain-log.
///
/// Nothing is written to a store. Shows:
///   - Each point as InfluxDB line protocol
///   - Units that were skipped and why

use station_ingest::ingest::{parse_json_measurements, parse_nmea, parse_rain_log, RainGauge};
use station_ingest::model::SourceFormat;
use station_ingest::store::line_protocol;
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <format> <file>", args[0]);
        eprintln!();
        eprintln!("Formats: json-measurements, nmea-gps, rain-log");
        std::process::exit(1);
    }

    let format: SourceFormat = match args[1].parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let filename = &args[2];
    let bytes = fs::read(filename).expect("Failed to read source file");
    let text = String::from_utf8_lossy(&bytes);

    println!("Parsing {} data from: {}\n", format, filename);

    let report = match format {
        SourceFormat::JsonMeasurements => {
            parse_json_measurements(&text).expect("Malformed measurements document")
        }
        SourceFormat::NmeaGps => parse_nmea(&text),
        SourceFormat::RainLog => parse_rain_log(&text, &RainGauge::default()),
    };

    for point in &report.points {
        println!("{}", line_protocol::render(point));
    }

    println!();
    println!("✓ Parsed {} points", report.points.len());

    if !report.skipped.is_empty() {
        println!("⚠ Skipped {} units:", report.skipped.len());
        for skipped in &report.skipped {
            println!("   {}", skipped);
        }
    }
}
