use thiserror::Error;

/// Why a successful response could not be turned into a fare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FareDecodeError {
    #[error("Prediction key 'fare' not found in the response")]
    MissingField,
    #[error("Prediction value is not a valid number")]
    InvalidNumber { raw: String },
}
