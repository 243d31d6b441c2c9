use std::{
    convert::Infallible,
    future::Future,
    io::{self, Write},
    time::Duration,
};

use weather_core::{Config, WeatherRecord, model::CLOCK_FORMAT};

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Console presentation: typewriter lines and a progress spinner.
#[derive(Debug, Clone)]
pub struct Renderer {
    char_delay: Duration,
    spinner: bool,
}

impl Renderer {
    pub fn new(char_delay: Duration, spinner: bool) -> Self {
        Self { char_delay, spinner }
    }

    /// No delays and no spinner.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, false)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.typing_delay(), config.spinner)
    }

    /// Labeled lines for a record, in display order.
    pub fn record_lines(record: &WeatherRecord) -> Vec<String> {
        vec![
            format!("City: {}, {}", record.city, record.country),
            format!("Temperature: {:.2} °C", record.temperature_c),
            format!("Feels Like: {:.2} °C", record.feels_like_c),
            format!("Condition: {}", record.condition),
            format!("Humidity: {}%", record.humidity_pct),
            format!("Wind Speed: {:.2} m/s", record.wind_speed_mps),
            format!("Cloudiness: {}%", record.cloudiness_pct),
            format!("Visibility: {:.2} km", record.visibility_km),
            format!("Pressure: {} hPa", record.pressure_hpa),
            format!("Sunrise: {}", record.sunrise.format(CLOCK_FORMAT)),
            format!("Sunset: {}", record.sunset.format(CLOCK_FORMAT)),
        ]
    }

    pub async fn show<W: Write>(&self, out: &mut W, record: &WeatherRecord) -> io::Result<()> {
        for line in Self::record_lines(record) {
            self.typewrite(out, &line).await?;
        }
        Ok(())
    }

    /// Print `text` one character at a time, then a newline.
    pub async fn typewrite<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        if self.char_delay.is_zero() {
            return writeln!(out, "{text}");
        }

        let mut buf = [0u8; 4];
        for c in text.chars() {
            out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            out.flush()?;
            tokio::time::sleep(self.char_delay).await;
        }
        writeln!(out)
    }

    /// Drive `task` to completion while a spinner runs after `message`.
    pub async fn with_spinner<W, F>(&self, out: &mut W, message: &str, task: F) -> io::Result<F::Output>
    where
        W: Write,
        F: Future,
    {
        if !self.spinner {
            return Ok(task.await);
        }

        write!(out, "{message} ")?;
        out.flush()?;

        let output = tokio::select! {
            output = task => output,
            never = spin(&mut *out) => match never {},
        };

        write!(out, "\x08 \n")?;
        out.flush()?;
        Ok(output)
    }
}

async fn spin<W: Write>(out: &mut W) -> Infallible {
    let mut ticker = tokio::time::interval(SPINNER_TICK);
    let mut frame = 0;
    loop {
        ticker.tick().await;
        // Cosmetic only, write errors are ignored here.
        let _ = write!(out, "\x08{}", SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]);
        let _ = out.flush();
        frame += 1;
    }
}
