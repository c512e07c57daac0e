use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use fare_client::load_settings;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::FareGuiApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop form for the taxi fare prediction service")]
struct Args {
    /// Settings file; defaults to ./fare.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint: Option<String>,
    /// Request deadline in seconds, 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())
        .context("failed to load client settings")?
        .with_overrides(args.endpoint.as_deref(), args.timeout_secs)
        .context("invalid command line settings")?;
    tracing::info!(endpoint = %settings.endpoint, timeout = ?settings.request_timeout, "starting fare gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Taxi Fare Predictor")
            .with_inner_size([820.0, 900.0])
            .with_min_inner_size([560.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Taxi Fare Predictor",
        options,
        Box::new(|cc| {
            FareGuiApp::apply_visuals(&cc.egui_ctx);
            Ok(Box::new(FareGuiApp::new(cmd_tx, ui_rx)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run fare gui: {err}"))
}
