use tracing::info;

use crate::{
    error::WeatherResult, history::HistoryStore, model::WeatherRecord, provider::WeatherProvider,
};

/// Fetches current conditions and keeps the search history.
#[derive(Debug)]
pub struct WeatherClient {
    provider: Box<dyn WeatherProvider>,
    history: HistoryStore,
}

impl WeatherClient {
    pub fn new(provider: Box<dyn WeatherProvider>, history: HistoryStore) -> Self {
        Self { provider, history }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Look up `city`. On success the raw input is appended to the history,
    /// even when the provider resolves it to a differently spelled name.
    pub async fn fetch(&self, city: &str) -> WeatherResult<WeatherRecord> {
        let record = self.provider.current(city).await?;
        info!(input = city, resolved = %record.city, "weather fetched");

        self.history.append(city);
        Ok(record)
    }
}
