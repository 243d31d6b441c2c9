use thiserror::Error;

/// Everything that can go wrong between asking for a city and holding a
/// [`WeatherRecord`](crate::WeatherRecord).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection failure, timeout, or the body could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-200 `cod`.
    #[error("API Error: {message}")]
    Api { message: String },

    /// The payload was not JSON or lacked a required field.
    #[error("Error parsing weather data: {0}")]
    Parse(String),

    /// The history file could not be read or written.
    #[error("History file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}

pub type WeatherResult<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_shows_provider_message() {
        let err = WeatherError::Api { message: "city not found".into() };
        assert_eq!(err.to_string(), "API Error: city not found");
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: WeatherError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
