//! Shared settings, errors and route constants for the almanac workspace.

pub mod config;
pub mod constants;
pub mod error;
