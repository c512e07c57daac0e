//! Controller layer: UI events, session state, form model, and command orchestration.

pub mod events;
pub mod form;
pub mod orchestration;
pub mod session;
