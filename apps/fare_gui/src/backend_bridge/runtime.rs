//! Backend worker: owns the async runtime and runs one prediction at a time.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use fare_client::{ClientSettings, FarePredictor, FareRequestController};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    let endpoint = settings.endpoint.to_string();
    match FareRequestController::new(&settings) {
        Ok(controller) => spawn_worker(Arc::new(controller), endpoint, cmd_rx, ui_tx),
        Err(err) => {
            tracing::error!("failed to build prediction client: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err}"),
            )));
            // Dropping the receiver makes later dispatches report a disconnect.
            thread::spawn(move || drop(cmd_rx))
        }
    }
}

pub fn spawn_worker(
    predictor: Arc<dyn FarePredictor>,
    endpoint: String,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        tracing::info!(%endpoint, "prediction worker ready");
        let _ = ui_tx.try_send(UiEvent::BackendReady { endpoint });

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Predict {
                        submission,
                        request,
                    } => {
                        let outcome = predictor.predict(&request).await;
                        if ui_tx
                            .send(UiEvent::PredictionFinished {
                                submission,
                                outcome,
                            })
                            .is_err()
                        {
                            tracing::debug!("ui event receiver closed; stopping worker");
                            break;
                        }
                    }
                }
            }
        });
    })
}
