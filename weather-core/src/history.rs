use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, error};

use crate::{error::WeatherResult, model::HistoryEntry};

pub const DEFAULT_HISTORY_FILE: &str = "weather_history.txt";

/// Append-only plain-text log of searched cities.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a search. Write failures are logged, never returned.
    pub fn append(&self, city: &str) {
        if let Err(err) = self.try_append(city) {
            error!(path = %self.path.display(), %err, "Error saving history");
        }
    }

    /// Record a search, reporting I/O failures to the caller.
    pub fn try_append(&self, city: &str) -> io::Result<()> {
        let entry = HistoryEntry::now(city);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{entry}")?;
        file.flush()?;
        debug!(path = %self.path.display(), %entry, "history entry appended");
        Ok(())
    }

    /// All lines, oldest first. `None` when nothing has been recorded yet.
    ///
    /// Invalid UTF-8 is replaced line by line rather than failing the whole read.
    pub fn read_all(&self) -> WeatherResult<Option<Vec<String>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            lines.push(String::from_utf8_lossy(line).into_owned());
        }

        Ok(Some(lines))
    }
}
