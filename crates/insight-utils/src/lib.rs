//! Shared utilities for stock-insight
//!
//! This crate provides common functionality used across the stock-insight
//! workspace, including logging setup and environment variable helpers.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_or, env_parse, env_string};
pub use logging::{LogFormat, init_tracing};
