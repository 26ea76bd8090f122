use clap::Parser;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rulegraph::validation::SampleMessage;
use serde_json::{Map, Value, json};
use std::fs;

const MESSAGE_TYPES: &[&str] = &[
    "POST_TELEMETRY_REQUEST",
    "POST_ATTRIBUTES_REQUEST",
    "CONNECT_EVENT",
    "DISCONNECT_EVENT",
    "ALARM",
];

const DEVICE_TYPES: &[&str] = &["thermostat", "meter", "tracker", "gateway"];

/// A CLI tool to generate sample messages for the rule chain editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "sample_message.json")]
    output: String,

    /// The minimum number of readings in the generated `readings` array
    #[arg(long, default_value_t = 0)]
    min: usize,

    /// The maximum number of readings in the generated `readings` array
    #[arg(long, default_value_t = 6)]
    max: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let message_type = MESSAGE_TYPES.choose(&mut rng).copied().unwrap_or("POST_TELEMETRY_REQUEST");
    let sample = SampleMessage::new(
        generate_body(&mut rng, cli.min, cli.max),
        generate_headers(&mut rng),
        message_type,
    );

    let json_output = serde_json::to_string_pretty(&sample)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated a '{}' sample message and saved it to '{}'",
        message_type, cli.output
    );
    Ok(())
}

/// Telemetry payload with a nested object and a variable-length array.
fn generate_body(rng: &mut ThreadRng, min_readings: usize, max_readings: usize) -> Value {
    let count = rng.random_range(min_readings..=max_readings);
    let readings: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "seq": i,
                "temperature": round2(rng.random_range(-10.0..40.0)),
                "humidity": round2(rng.random_range(10.0..90.0)),
            })
        })
        .collect();

    json!({
        "temperature": round2(rng.random_range(-10.0..40.0)),
        "battery": {
            "level": rng.random_range(0..=100),
            "charging": rng.random_bool(0.3),
        },
        "location": {
            "lat": round2(rng.random_range(-90.0..90.0)),
            "lon": round2(rng.random_range(-180.0..180.0)),
        },
        "readings": readings,
    })
}

fn generate_headers(rng: &mut ThreadRng) -> Map<String, Value> {
    let device_type = DEVICE_TYPES.choose(rng).copied().unwrap_or("meter");
    let mut headers = Map::new();
    headers.insert(
        "deviceName".to_string(),
        Value::String(format!("{}-{:04}", device_type, rng.random_range(0..10_000))),
    );
    headers.insert("deviceType".to_string(), Value::String(device_type.to_string()));
    headers.insert(
        "ts".to_string(),
        Value::String(rng.random_range(1_700_000_000_000u64..1_800_000_000_000u64).to_string()),
    );
    headers
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
