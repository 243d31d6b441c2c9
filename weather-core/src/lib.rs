//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a `WeatherProvider` trait
//! - Shared domain models (records, history entries)
//! - The append-only search history
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;

pub use client::WeatherClient;
pub use config::Config;
pub use error::{WeatherError, WeatherResult};
pub use history::HistoryStore;
pub use model::{HistoryEntry, WeatherRecord};
pub use provider::{WeatherProvider, provider_from_config};
