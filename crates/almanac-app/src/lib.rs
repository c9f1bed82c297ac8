//! HTTP surface for the occurrence engine.

pub mod app;
pub mod calendar_handler;
pub mod error;
