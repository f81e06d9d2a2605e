//! Windowing and context setup for the viewer.

pub mod app;

pub use app::*;
