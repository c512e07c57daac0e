use std::{fmt, time::Duration};

use serde::Serialize;
use serde_json::Value;

use crate::error::FareDecodeError;

pub const FARE_KEY: &str = "fare";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionResult {
    Success { fare: f64 },
    MissingField,
    InvalidNumber { raw: String },
    NetworkError { message: String },
    Timeout { after_ms: u64 },
}

impl PredictionResult {
    /// Maps a decoded 2xx body onto a result.
    pub fn from_body(body: &Value) -> Self {
        match decode_fare(body) {
            Ok(fare) => Self::Success { fare },
            Err(FareDecodeError::MissingField) => Self::MissingField,
            Err(FareDecodeError::InvalidNumber { raw }) => Self::InvalidNumber { raw },
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            after_ms: after.as_millis() as u64,
        }
    }

    pub fn fare(&self) -> Option<f64> {
        match self {
            Self::Success { fare } => Some(*fare),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True when the request never produced a usable response.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Success { fare } => format!("Predicted Fare: {}", format_fare(*fare)),
            Self::MissingField => FareDecodeError::MissingField.to_string(),
            Self::InvalidNumber { raw } => {
                FareDecodeError::InvalidNumber { raw: raw.clone() }.to_string()
            }
            Self::NetworkError { message } => format!("An error occurred: {message}"),
            Self::Timeout { after_ms } => {
                format!("Request timed out after {}s", *after_ms as f64 / 1000.0)
            }
        }
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// A result plus the JSON body it was decoded from, when there was one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,
}

impl PredictionOutcome {
    pub fn from_body(body: Value) -> Self {
        Self {
            result: PredictionResult::from_body(&body),
            response_body: Some(body),
        }
    }

    pub fn without_body(result: PredictionResult) -> Self {
        Self {
            result,
            response_body: None,
        }
    }

    pub fn raw_fare(&self) -> Option<&Value> {
        self.response_body.as_ref().and_then(fare_field)
    }
}

pub fn format_fare(fare: f64) -> String {
    format!("${fare:.2}")
}

fn fare_field(body: &Value) -> Option<&Value> {
    body.as_object().and_then(|obj| obj.get(FARE_KEY))
}

/// Typed decode of the `fare` field.
///
/// Absent key and non-object bodies are `MissingField`; anything present that
/// is not a number or numeric string is `InvalidNumber`. Parseable text such as
/// `"inf"` or `"NaN"` is accepted as is.
pub fn decode_fare(body: &Value) -> Result<f64, FareDecodeError> {
    let raw = fare_field(body).ok_or(FareDecodeError::MissingField)?;
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FareDecodeError::InvalidNumber {
        raw: raw_text(raw),
    })
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_string_fare_decodes() {
        assert_eq!(
            PredictionResult::from_body(&json!({ "fare": "12.5" })),
            PredictionResult::Success { fare: 12.5 }
        );
    }

    #[test]
    fn numeric_fare_decodes() {
        assert_eq!(decode_fare(&json!({ "fare": 8 })), Ok(8.0));
        assert_eq!(decode_fare(&json!({ "fare": " 3.25 " })), Ok(3.25));
    }

    #[test]
    fn absent_key_is_missing_field() {
        assert_eq!(
            PredictionResult::from_body(&json!({})),
            PredictionResult::MissingField
        );
        assert_eq!(
            PredictionResult::from_body(&json!({ "price": 4.0 })),
            PredictionResult::MissingField
        );
        assert_eq!(
            PredictionResult::from_body(&json!([1, 2])),
            PredictionResult::MissingField
        );
    }

    #[test]
    fn present_but_not_numeric_is_invalid_number() {
        assert_eq!(
            PredictionResult::from_body(&json!({ "fare": "not-a-number" })),
            PredictionResult::InvalidNumber {
                raw: "not-a-number".to_string()
            }
        );
        for body in [
            json!({ "fare": null }),
            json!({ "fare": true }),
            json!({ "fare": [12.5] }),
            json!({ "fare": { "value": 3 } }),
        ] {
            assert!(
                matches!(
                    PredictionResult::from_body(&body),
                    PredictionResult::InvalidNumber { .. }
                ),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn parseable_non_finite_text_is_success() {
        assert_eq!(decode_fare(&json!({ "fare": "inf" })), Ok(f64::INFINITY));
        assert_eq!(decode_fare(&json!({ "fare": "1e400" })), Ok(f64::INFINITY));
        assert_eq!(decode_fare(&json!({ "fare": "-inf" })), Ok(f64::NEG_INFINITY));

        let result = PredictionResult::from_body(&json!({ "fare": "NaN" }));
        assert!(result.is_success(), "{result:?}");
        assert!(result.fare().is_some_and(f64::is_nan));
    }

    #[test]
    fn user_messages_match_form_copy() {
        assert_eq!(
            PredictionResult::Success { fare: 12.5 }.user_message(),
            "Predicted Fare: $12.50"
        );
        assert_eq!(
            PredictionResult::MissingField.user_message(),
            "Prediction key 'fare' not found in the response"
        );
        assert_eq!(
            PredictionResult::InvalidNumber { raw: "x".into() }.user_message(),
            "Prediction value is not a valid number"
        );
        assert_eq!(
            PredictionResult::network_error("500 Internal Server Error").user_message(),
            "An error occurred: 500 Internal Server Error"
        );
        assert_eq!(
            PredictionResult::timeout(Duration::from_millis(1500)).user_message(),
            "Request timed out after 1.5s"
        );
    }

    #[test]
    fn timeout_counts_as_transport_failure() {
        assert!(PredictionResult::timeout(Duration::from_secs(1)).is_transport_failure());
        assert!(PredictionResult::network_error("refused").is_transport_failure());
        assert!(!PredictionResult::MissingField.is_transport_failure());
    }

    #[test]
    fn outcome_exposes_raw_fare() {
        let outcome = PredictionOutcome::from_body(json!({ "fare": "9.1", "model": "v2" }));
        assert_eq!(outcome.raw_fare(), Some(&json!("9.1")));
        assert_eq!(outcome.result.fare(), Some(9.1));
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let value = serde_json::to_value(PredictionResult::Success { fare: 1.5 }).expect("json");
        assert_eq!(value, json!({ "status": "success", "fare": 1.5 }));
    }
}
