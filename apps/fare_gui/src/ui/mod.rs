//! UI layer: app shell, ride form, result area, and route map.

pub mod app;
pub mod map;

pub use app::FareGuiApp;
