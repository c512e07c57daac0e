use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use fare_client::{load_settings, FareRequestController};
use shared::{
    domain::{
        current_pickup_datetime, Coordinate, PassengerCount, RideRequest, DEFAULT_COORDINATE,
    },
    protocol::PredictionOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Ask the taxi fare prediction service for a fare estimate")]
struct Args {
    /// Free-form pickup time; defaults to now.
    #[arg(long)]
    pickup_datetime: Option<String>,
    #[arg(long, default_value_t = DEFAULT_COORDINATE.longitude, allow_hyphen_values = true)]
    pickup_longitude: f64,
    #[arg(long, default_value_t = DEFAULT_COORDINATE.latitude, allow_hyphen_values = true)]
    pickup_latitude: f64,
    #[arg(long, default_value_t = DEFAULT_COORDINATE.longitude, allow_hyphen_values = true)]
    dropoff_longitude: f64,
    #[arg(long, default_value_t = DEFAULT_COORDINATE.latitude, allow_hyphen_values = true)]
    dropoff_latitude: f64,
    /// Clamped into 1..=10.
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    passenger_count: i64,

    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint: Option<String>,
    /// Request deadline in seconds, 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
    /// Also print the full API response and raw fare value.
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn ride_request(&self) -> RideRequest {
        let passenger_count = PassengerCount::clamped(self.passenger_count);
        if i64::from(passenger_count.get()) != self.passenger_count {
            tracing::warn!(
                requested = self.passenger_count,
                used = passenger_count.get(),
                "passenger count clamped"
            );
        }
        RideRequest::new(
            self.pickup_datetime
                .clone()
                .unwrap_or_else(current_pickup_datetime),
            Coordinate::new(self.pickup_longitude, self.pickup_latitude),
            Coordinate::new(self.dropoff_longitude, self.dropoff_latitude),
            passenger_count,
        )
    }
}

fn print_outcome(outcome: &PredictionOutcome, json: bool, verbose: bool) -> Result<()> {
    if json {
        let rendered = if verbose {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string_pretty(&outcome.result)?
        };
        println!("{rendered}");
        return Ok(());
    }

    if verbose {
        if let Some(body) = &outcome.response_body {
            println!("Full API Response: {body}");
        }
        if let Some(raw) = outcome.raw_fare() {
            println!("Raw prediction value: {raw}");
        }
    }
    if outcome.result.is_success() {
        println!("{}", outcome.result);
    } else {
        eprintln!("{}", outcome.result);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())
        .context("failed to load client settings")?
        .with_overrides(args.endpoint.as_deref(), args.timeout_secs)
        .context("invalid command line settings")?;
    let controller =
        FareRequestController::new(&settings).context("failed to build prediction client")?;

    let request = args.ride_request();
    let outcome = controller.submit_detailed(&request).await;
    print_outcome(&outcome, args.json, args.verbose)?;

    Ok(if outcome.result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
