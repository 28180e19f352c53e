#![forbid(unsafe_code)]

//! Core data model and service configuration.

pub mod config;
pub mod types;
