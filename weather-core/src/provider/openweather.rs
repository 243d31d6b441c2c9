use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    error::{WeatherError, WeatherResult},
    model::WeatherRecord,
};

use super::WeatherProvider;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> WeatherResult<Self> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    async fn fetch_current(&self, city: &str) -> WeatherResult<WeatherRecord> {
        debug!(city, endpoint = %self.endpoint, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        // Error responses carry a JSON body too, so read it whatever the status.
        let status = res.status();
        let body = res.text().await?;

        parse_current(status, &body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> WeatherResult<WeatherRecord> {
        self.fetch_current(city).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u32,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    /// Meters.
    visibility: f64,
}

/// Turn a current-conditions body into a record.
fn parse_current(status: StatusCode, body: &str) -> WeatherResult<WeatherRecord> {
    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(_) if !status.is_success() => {
            return Err(WeatherError::Api {
                message: format!("request failed with status {}: {}", status, truncate_body(body)),
            });
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(code) = status_code(&payload) {
        if code != 200 {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| status.to_string());
            info!(code, %message, "OpenWeather returned an error");
            return Err(WeatherError::Api { message });
        }
    }

    let parsed: OwCurrentResponse = serde_json::from_value(payload)?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| WeatherError::Parse("weather array is empty".to_string()))?;

    Ok(WeatherRecord {
        city: parsed.name,
        country: parsed.sys.country,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        condition,
        wind_speed_mps: parsed.wind.speed,
        cloudiness_pct: parsed.clouds.all,
        visibility_km: parsed.visibility / 1000.0,
        sunrise: local_clock(parsed.sys.sunrise)?,
        sunset: local_clock(parsed.sys.sunset)?,
    })
}

/// `cod` is a number on success and a string such as `"404"` on errors.
fn status_code(payload: &Value) -> Option<i64> {
    match payload.get("cod")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Epoch seconds to the wall-clock time in the local time zone.
fn local_clock(ts: i64) -> WeatherResult<NaiveTime> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local).time())
        .ok_or_else(|| WeatherError::Parse(format!("timestamp {ts} is out of range")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn paris() -> Value {
        json!({
            "name": "Paris",
            "sys": { "country": "FR", "sunrise": 1700000000, "sunset": 1700040000 },
            "main": { "temp": 15.5, "feels_like": 14.2, "humidity": 60, "pressure": 1012 },
            "weather": [{ "description": "clear sky" }],
            "wind": { "speed": 3.1 },
            "clouds": { "all": 10 },
            "visibility": 10000,
            "cod": 200
        })
    }

    fn expected_clock(ts: i64) -> NaiveTime {
        Local.timestamp_opt(ts, 0).single().unwrap().time()
    }

    #[test]
    fn parses_successful_payload() {
        let record = parse_current(StatusCode::OK, &paris().to_string()).unwrap();

        assert_eq!(record.city, "Paris");
        assert_eq!(record.country, "FR");
        assert_eq!(record.condition, "clear sky");
        assert_eq!(format!("{:.2}", record.visibility_km), "10.00");
        assert_eq!(record.temperature_c, 15.5);
        assert_eq!(record.feels_like_c, 14.2);
        assert_eq!(record.humidity_pct, 60);
        assert_eq!(record.pressure_hpa, 1012);
        assert_eq!(record.wind_speed_mps, 3.1);
        assert_eq!(record.cloudiness_pct, 10);
        assert_eq!(record.sunrise, expected_clock(1700000000));
        assert_eq!(record.sunset, expected_clock(1700040000));
    }

    #[test]
    fn visibility_is_converted_to_kilometres() {
        for meters in [0, 1, 450, 999, 1005, 6437, 10000] {
            let mut payload = paris();
            payload["visibility"] = json!(meters);

            let record = parse_current(StatusCode::OK, &payload.to_string()).unwrap();
            assert_eq!(
                format!("{:.2}", record.visibility_km),
                format!("{:.2}", meters as f64 / 1000.0)
            );
        }
    }

    #[test]
    fn string_cod_is_an_api_error() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        let err = parse_current(StatusCode::NOT_FOUND, body).unwrap_err();

        match err {
            WeatherError::Api { message } => assert_eq!(message, "city not found"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_cod_is_an_api_error_even_with_http_ok() {
        let body = r#"{"cod":404,"message":"city not found"}"#;
        let err = parse_current(StatusCode::OK, body).unwrap_err();

        assert!(matches!(err, WeatherError::Api { ref message } if message == "city not found"));
    }

    #[test]
    fn api_error_without_message_falls_back_to_status() {
        let err = parse_current(StatusCode::UNAUTHORIZED, r#"{"cod":401}"#).unwrap_err();

        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let mut payload = paris();
        payload["main"].as_object_mut().unwrap().remove("pressure");

        let err = parse_current(StatusCode::OK, &payload.to_string()).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn empty_weather_array_is_a_parse_error() {
        let mut payload = paris();
        payload["weather"] = json!([]);

        let err = parse_current(StatusCode::OK, &payload.to_string()).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let err = parse_current(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn non_json_error_page_is_an_api_error() {
        let body = "x".repeat(500);
        let err = parse_current(StatusCode::BAD_GATEWAY, &body).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.ends_with("..."));
    }

    #[tokio::test]
    async fn sends_city_key_and_metric_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "São Paulo"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into())
            .with_endpoint(format!("{}/data/2.5/weather", server.uri()));

        let record = provider.current("São Paulo").await.unwrap();
        assert_eq!(record.city, "Paris");
    }

    #[tokio::test]
    async fn reads_error_body_on_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into()).with_endpoint(server.uri());

        let err = provider.current("Atlantis").await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: city not found");
    }

    #[tokio::test]
    async fn slow_server_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(paris())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into())
            .with_endpoint(server.uri())
            .with_timeout(Duration::from_millis(100))
            .unwrap();

        let err = provider.current("Paris").await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let provider = OpenWeatherProvider::new("KEY".into())
            .with_endpoint("http://127.0.0.1:1/data/2.5/weather");

        let err = provider.current("Paris").await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
    }
}
