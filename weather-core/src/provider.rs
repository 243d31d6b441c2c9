use crate::{Config, WeatherRecord, error::WeatherResult, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions for a free-text city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> WeatherResult<WeatherRecord>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.resolve_api_key()?;

    let provider = OpenWeatherProvider::new(api_key)
        .with_endpoint(config.endpoint.clone())
        .with_timeout(config.timeout())?;

    Ok(Box::new(provider))
}
