//! Bridge between the UI thread and the prediction worker.

pub mod commands;
pub mod runtime;
