//! Thermometer gauge widget, its canvas backends, and an HTTP host screen
//! that drives it from a slider.

pub mod canvas;
pub mod colors;
pub mod config;
pub mod error;
pub mod screen;
pub mod server;
pub mod thermometer;

pub use config::GaugeAttributes;
pub use error::{Error, Result};
pub use thermometer::{Drawable, Thermometer};
