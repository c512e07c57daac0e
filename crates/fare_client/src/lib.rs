//! HTTP client for the remote fare-prediction endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::RideRequest,
    protocol::{PredictionOutcome, PredictionResult},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub use self::config::{load_settings, ClientSettings, SettingsError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Seam between the presentation layer and whatever produces predictions.
#[async_trait]
pub trait FarePredictor: Send + Sync {
    async fn predict(&self, request: &RideRequest) -> PredictionOutcome;
}

/// Issues one GET per submission and folds every failure into a
/// [`PredictionResult`]. Never retries.
pub struct FareRequestController {
    http: Client,
    endpoint: Url,
    request_timeout: Option<Duration>,
}

impl FareRequestController {
    pub fn new(settings: &ClientSettings) -> Result<Self, ControllerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: settings.endpoint.clone(),
            request_timeout: settings.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn submit(&self, request: &RideRequest) -> PredictionResult {
        self.submit_detailed(request).await.result
    }

    pub async fn submit_detailed(&self, request: &RideRequest) -> PredictionOutcome {
        debug!(
            endpoint = %self.endpoint,
            pickup_datetime = %request.pickup_datetime,
            passenger_count = request.passenger_count.get(),
            "requesting fare prediction"
        );

        let outcome = match self.fetch(request).await {
            Ok(body) => PredictionOutcome::from_body(body),
            Err(err) => PredictionOutcome::without_body(self.classify_failure(&err)),
        };

        match &outcome.result {
            PredictionResult::Success { fare } => info!(fare = *fare, "fare prediction succeeded"),
            failed => warn!(result = %failed, "fare prediction failed"),
        }
        outcome
    }

    async fn fetch(&self, request: &RideRequest) -> reqwest::Result<Value> {
        self.http
            .get(self.endpoint.clone())
            .query(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    fn classify_failure(&self, err: &reqwest::Error) -> PredictionResult {
        match self.request_timeout {
            Some(after) if err.is_timeout() => PredictionResult::timeout(after),
            _ => PredictionResult::network_error(err.to_string()),
        }
    }
}

#[async_trait]
impl FarePredictor for FareRequestController {
    async fn predict(&self, request: &RideRequest) -> PredictionOutcome {
        self.submit_detailed(request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
