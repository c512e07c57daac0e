use super::*;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::domain::{Coordinate, PassengerCount, DEFAULT_COORDINATE};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

const TEST_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Clone)]
struct CaptureState {
    tx: Arc<Mutex<Option<oneshot::Sender<HashMap<String, String>>>>>,
}

async fn capture_query(
    State(state): State<CaptureState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(params);
    }
    Json(json!({ "fare": 7.25 }))
}

async fn spawn_prediction_server(app: Router) -> std::io::Result<Url> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{addr}/predict")).expect("mock url"))
}

async fn spawn_json_server(body: Value) -> Url {
    let app = Router::new().route(
        "/predict",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    spawn_prediction_server(app).await.expect("spawn server")
}

fn controller_for(endpoint: Url) -> FareRequestController {
    FareRequestController::new(&ClientSettings {
        endpoint,
        request_timeout: Some(TEST_TIMEOUT),
    })
    .expect("controller")
}

fn sample_request() -> RideRequest {
    RideRequest::new(
        "2013-07-06 17:18:00",
        DEFAULT_COORDINATE,
        Coordinate::new(-73.950655, 40.783282),
        PassengerCount::clamped(2),
    )
}

#[tokio::test]
async fn numeric_string_fare_is_success() {
    let endpoint = spawn_json_server(json!({ "fare": "12.5" })).await;
    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert_eq!(result, PredictionResult::Success { fare: 12.5 });
}

#[tokio::test]
async fn non_numeric_fare_is_invalid_number() {
    let endpoint = spawn_json_server(json!({ "fare": "not-a-number" })).await;
    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert!(matches!(result, PredictionResult::InvalidNumber { raw } if raw == "not-a-number"));
}

#[tokio::test]
async fn empty_object_is_missing_field() {
    let endpoint = spawn_json_server(json!({})).await;
    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert_eq!(result, PredictionResult::MissingField);
}

#[tokio::test]
async fn server_error_status_is_network_error() {
    let app = Router::new().route("/predict", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");

    let result = controller_for(endpoint).submit(&sample_request()).await;
    match result {
        PredictionResult::NetworkError { message } => assert!(message.contains("500"), "{message}"),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_error_status_is_network_error() {
    let app = Router::new().route("/predict", get(|| async { StatusCode::UNPROCESSABLE_ENTITY }));
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");

    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert!(matches!(result, PredictionResult::NetworkError { .. }));
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let endpoint = Url::parse(&format!("http://{addr}/predict")).expect("url");

    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert!(matches!(result, PredictionResult::NetworkError { .. }), "{result:?}");
    assert!(result.is_transport_failure());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let app = Router::new().route(
        "/predict",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "fare": 1.0 }))
        }),
    );
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");

    let result = controller_for(endpoint).submit(&sample_request()).await;
    assert_eq!(result, PredictionResult::Timeout { after_ms: 300 });
    assert!(result.is_transport_failure());
}

#[tokio::test]
async fn non_json_body_is_network_error() {
    let app = Router::new().route("/predict", get(|| async { "<html>maintenance</html>" }));
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");

    let outcome = controller_for(endpoint)
        .submit_detailed(&sample_request())
        .await;
    assert!(matches!(outcome.result, PredictionResult::NetworkError { .. }));
    assert!(outcome.response_body.is_none());
}

#[tokio::test]
async fn sends_all_six_fields_as_query_parameters() {
    let (tx, rx) = oneshot::channel();
    let app = Router::new()
        .route("/predict", get(capture_query))
        .with_state(CaptureState {
            tx: Arc::new(Mutex::new(Some(tx))),
        });
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");

    let request = RideRequest::new(
        "2013-07-06 17:18:00",
        DEFAULT_COORDINATE,
        Coordinate::new(-73.950655, 40.783282),
        PassengerCount::clamped(25),
    );
    let result = controller_for(endpoint).submit(&request).await;
    assert_eq!(result, PredictionResult::Success { fare: 7.25 });

    let params = rx.await.expect("captured query");
    assert_eq!(params.len(), 6);
    assert_eq!(params["pickup_datetime"], "2013-07-06 17:18:00");
    assert_eq!(params["pickup_longitude"], "-73.985428");
    assert_eq!(params["pickup_latitude"], "40.748817");
    assert_eq!(params["dropoff_longitude"], "-73.950655");
    assert_eq!(params["dropoff_latitude"], "40.783282");
    assert_eq!(params["passenger_count"], "10");
}

#[tokio::test]
async fn identical_submissions_are_not_deduplicated() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/predict",
        get(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Json(json!({ "fare": n as f64 }))
            }
        }),
    );
    let endpoint = spawn_prediction_server(app).await.expect("spawn server");
    let controller = controller_for(endpoint);
    let request = sample_request();

    let first = controller.submit(&request).await;
    let second = controller.submit(&request).await;

    assert_eq!(first.fare(), Some(1.0));
    assert_eq!(second.fare(), Some(2.0));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn detailed_outcome_keeps_decoded_body() {
    let endpoint = spawn_json_server(json!({ "fare": 14.2, "currency": "USD" })).await;
    let outcome = controller_for(endpoint)
        .submit_detailed(&sample_request())
        .await;

    assert_eq!(outcome.result, PredictionResult::Success { fare: 14.2 });
    assert_eq!(outcome.raw_fare(), Some(&json!(14.2)));
    assert_eq!(
        outcome.response_body,
        Some(json!({ "fare": 14.2, "currency": "USD" }))
    );
}

#[tokio::test]
async fn controller_works_behind_predictor_trait() {
    let endpoint = spawn_json_server(json!({ "fare": "3" })).await;
    let predictor: Arc<dyn FarePredictor> = Arc::new(controller_for(endpoint));

    let outcome = predictor.predict(&sample_request()).await;
    assert_eq!(outcome.result.fare(), Some(3.0));
}
