use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::core::history::{EntryBody, HistoryEntry};
use crate::core::render::RenderedEntry;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins over `level`; with neither, only warnings are shown.
pub fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Plain-text transcript of finished history entries.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Fail early if the file cannot be created or appended to
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => Err("No log file specified. Use /log <filename> to enable logging first.".into()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active && self.file_path.is_some()
    }

    pub fn log_entry(&self, entry: &HistoryEntry) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new().create(true).append(true).open(file_path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "[{}] {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.kind.as_str()
        )?;
        for line in transcript_text(entry).lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &str| {
            Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }
}

/// Plain text for an entry, as written to the transcript and the terminal.
pub fn transcript_text(entry: &HistoryEntry) -> String {
    match &entry.body {
        EntryBody::Message(message) => message.clone(),
        EntryBody::Rendered(RenderedEntry::Text(text)) => text.source.clone(),
        EntryBody::Rendered(RenderedEntry::Image { src }) => format!("[image] {src}"),
        EntryBody::Rendered(RenderedEntry::Audio { src, .. }) => format!("[audio] {src}"),
    }
}
