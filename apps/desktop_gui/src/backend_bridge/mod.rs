//! Backend bridge: command queue from the UI and the worker that drives the controller.

pub mod commands;
pub mod runtime;
