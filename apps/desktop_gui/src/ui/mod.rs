//! UI layer for desktop GUI: the single-window Q&A app.

pub mod app;

pub use app::{QaApp, APP_TITLE};
