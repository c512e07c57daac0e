use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{RideRequest, MAX_PASSENGERS, MIN_PASSENGERS},
    protocol::PredictionResult,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{err_label, UiError, UiEvent},
    form::RideForm,
    orchestration::dispatch_backend_command,
    session::PredictionSession,
};
use crate::ui::map::RideMap;

const APP_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0xad, 0xd8, 0xe6);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(0x1e, 0x7b, 0x34);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xb0, 0x1c, 0x1c);
const COORDINATE_SPEED: f64 = 0.0001;

pub struct FareGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    form: RideForm,
    session: PredictionSession,
    map: RideMap,

    status: String,
    status_banner: Option<UiError>,
}

impl FareGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            form: RideForm::default(),
            session: PredictionSession::new(),
            map: RideMap::default(),
            status: "Starting prediction worker...".to_string(),
            status_banner: None,
        }
    }

    pub fn apply_visuals(ctx: &egui::Context) {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = APP_BACKGROUND;
        visuals.window_fill = APP_BACKGROUND;
        ctx.set_visuals(visuals);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::BackendReady { endpoint } => {
                    self.status = format!("Ready - predictions from {endpoint}");
                }
                UiEvent::PredictionFinished {
                    submission,
                    outcome,
                } => {
                    let summary = outcome.result.user_message();
                    if self.session.complete(submission, outcome) {
                        self.status = format!("Submission #{}: {summary}", submission.0);
                    } else {
                        tracing::warn!(submission = submission.0, "dropping stale prediction");
                    }
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status = err.message().to_string();
                    self.status_banner = Some(err);
                }
            }
        }
    }

    fn submission_blocked(&self) -> bool {
        self.session.is_pending()
            || self
                .status_banner
                .as_ref()
                .is_some_and(UiError::blocks_submission)
    }

    fn submit_prediction(&mut self) {
        let request = self.form.to_request();
        let Some(submission) = self.session.begin(&request) else {
            return;
        };

        match dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Predict {
                submission,
                request,
            },
        ) {
            Ok(()) => {
                self.status = "Requesting prediction...".to_string();
                self.status_banner = None;
            }
            Err(err) => {
                self.session.release_pending();
                self.status = err.message().to_string();
                self.status_banner = Some(err);
            }
        }
    }

    fn show_status_banner(&self, ui: &mut egui::Ui) {
        if let Some(err) = &self.status_banner {
            ui.colored_label(
                ERROR_COLOR,
                format!("{} error: {}", err_label(err.category()), err.message()),
            );
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Please provide the details of your ride:");
        ui.add_space(4.0);

        egui::Grid::new("ride_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Pickup Date and Time");
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.form.pickup_datetime);
                    if ui.small_button("Now").clicked() {
                        self.form.reset_pickup_to_now();
                    }
                });
                ui.end_row();

                coordinate_row(ui, "Pickup Longitude", &mut self.form.pickup_longitude);
                coordinate_row(ui, "Pickup Latitude", &mut self.form.pickup_latitude);
                coordinate_row(ui, "Dropoff Longitude", &mut self.form.dropoff_longitude);
                coordinate_row(ui, "Dropoff Latitude", &mut self.form.dropoff_latitude);

                ui.label("Passenger Count");
                ui.add(
                    egui::DragValue::new(&mut self.form.passenger_count)
                        .range(MIN_PASSENGERS..=MAX_PASSENGERS),
                );
                ui.end_row();
            });
    }

    fn show_predict_action(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button = ui.add_enabled(
                !self.submission_blocked(),
                egui::Button::new("Predict Fare"),
            );
            if button.clicked() {
                self.submit_prediction();
            }
            if self.session.is_pending() {
                ui.spinner();
                ui.label("Waiting for the prediction service...");
            }
        });
    }

    fn show_result(&self, ui: &mut egui::Ui) {
        let Some(entry) = self.session.latest() else {
            ui.weak("No prediction yet.");
            return;
        };

        let message = entry.outcome.result.user_message();
        match entry.outcome.result {
            PredictionResult::Success { .. } => {
                ui.label(egui::RichText::new(message).color(SUCCESS_COLOR).strong());
            }
            _ => {
                ui.colored_label(ERROR_COLOR, message);
            }
        }

        ui.weak(format!(
            "Ride requested for {} at {} with {} passenger(s)",
            entry.request.pickup_datetime,
            format_route(&entry.request),
            entry.request.passenger_count
        ));

        egui::CollapsingHeader::new("API response")
            .id_salt("api_response")
            .default_open(false)
            .show(ui, |ui| match &entry.outcome.response_body {
                Some(body) => {
                    let pretty =
                        serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                    ui.label("Full API Response:");
                    ui.code(pretty);
                    if let Some(raw) = entry.outcome.raw_fare() {
                        ui.label(format!("Raw prediction value: {raw}"));
                    }
                }
                None => {
                    ui.weak("No response body was decoded.");
                }
            });
    }
}

fn format_route(request: &RideRequest) -> String {
    format!(
        "({:.6}, {:.6}) -> ({:.6}, {:.6})",
        request.pickup_latitude,
        request.pickup_longitude,
        request.dropoff_latitude,
        request.dropoff_longitude
    )
}

fn coordinate_row(ui: &mut egui::Ui, label: &str, value: &mut f64) {
    ui.label(label);
    ui.add(
        egui::DragValue::new(value)
            .speed(COORDINATE_SPEED)
            .min_decimals(6)
            .max_decimals(6),
    );
    ui.end_row();
}

impl eframe::App for FareGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("TaxiFareModel Prediction");
                ui.label(
                    "Welcome to the Taxi Fare Predictor! Estimate the fare of your ride based on various parameters.",
                );
                ui.add_space(8.0);
                self.show_status_banner(ui);

                self.show_form(ui);
                ui.add_space(8.0);
                self.show_predict_action(ui);
                ui.add_space(8.0);
                self.show_result(ui);

                ui.separator();
                ui.heading("Map of Pickup and Dropoff Locations");
                let (pickup, dropoff) = (self.form.pickup(), self.form.dropoff());
                self.map.show(ui, pickup, dropoff);
            });
        });

        let repaint_after = if self.session.is_pending() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint_after);
    }
}
