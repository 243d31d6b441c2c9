use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Local;
use tracing::debug;
use weather_core::{WeatherClient, model::TIMESTAMP_FORMAT};

use crate::render::Renderer;

const MENU: &str = "\n**************** Weather App Menu ****************\n\
                    1. Fetch Weather\n\
                    2. Show Search History\n\
                    3. Show Local Time\n\
                    0. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    FetchWeather,
    ShowHistory,
    ShowLocalTime,
    Exit,
}

impl MenuChoice {
    /// `None` for anything that is not one of the listed numbers.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<i64>().ok()? {
            1 => Some(MenuChoice::FetchWeather),
            2 => Some(MenuChoice::ShowHistory),
            3 => Some(MenuChoice::ShowLocalTime),
            0 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// The interactive loop: print the menu, read a choice, dispatch, repeat.
pub struct Menu<R, W> {
    client: WeatherClient,
    renderer: Renderer,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(client: WeatherClient, renderer: Renderer, input: R, output: W) -> Self {
        Self { client, renderer, input, output }
    }

    /// Runs until the user picks `0` or input ends.
    pub async fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                writeln!(self.output)?;
                break;
            };

            match MenuChoice::parse(&line) {
                Some(MenuChoice::FetchWeather) => self.fetch_weather().await?,
                Some(MenuChoice::ShowHistory) => self.show_history()?,
                Some(MenuChoice::ShowLocalTime) => self.show_local_time().await?,
                Some(MenuChoice::Exit) => break,
                None => writeln!(self.output, "Invalid choice. Try again.")?,
            }
        }

        writeln!(self.output, "Exiting weather fetcher")?;
        self.output.flush()?;
        Ok(())
    }

    /// Print `label` and read one line without its terminator. `None` on end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    async fn fetch_weather(&mut self) -> Result<()> {
        let Some(city) = self.prompt("Enter city name: ")? else {
            return Ok(());
        };

        let result = self
            .renderer
            .with_spinner(&mut self.output, "Fetching weather data...", self.client.fetch(&city))
            .await?;

        match result {
            Ok(record) => self.renderer.show(&mut self.output, &record).await?,
            Err(err) => {
                debug!(city = %city, %err, "weather lookup failed");
                writeln!(self.output, "{err}")?;
            }
        }

        Ok(())
    }

    fn show_history(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Search History ---")?;

        match self.client.history().read_all() {
            Ok(Some(lines)) => {
                for line in lines {
                    writeln!(self.output, "{line}")?;
                }
            }
            Ok(None) => writeln!(self.output, "No history found.")?,
            Err(err) => {
                debug!(path = %self.client.history().path().display(), %err, "history read failed");
                writeln!(self.output, "{err}")?;
            }
        }

        Ok(())
    }

    async fn show_local_time(&mut self) -> Result<()> {
        let now = Local::now().format(TIMESTAMP_FORMAT);
        self.renderer.typewrite(&mut self.output, &format!("Local Time: {now}")).await?;
        Ok(())
    }
}
