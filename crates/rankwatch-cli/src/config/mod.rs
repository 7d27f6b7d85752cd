//! Application configuration module.
//!
//! Manages the TOML config file holding the default platform, the Riot API
//! rate budget and the scheduler pacing.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
