use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use clap::ValueEnum;

/// Report format selected with `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Destination of a report: stdout, or the file named by `--output`.
pub struct Output {
    writer: Box<dyn Write>,
    target: String,
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                target: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            target: path.display().to_string(),
        })
    }

    /// Writes `value` in `format`, using `write_text` for the text form.
    pub fn write_report<T, F>(
        &mut self,
        format: OutputFormat,
        value: &T,
        write_text: F,
    ) -> anyhow::Result<()>
    where
        T: serde::Serialize,
        F: FnOnce(&mut Self, &T) -> io::Result<()>,
    {
        let written = match format {
            OutputFormat::Json => serde_json::to_writer_pretty(&mut *self, value)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(self)),
            OutputFormat::Text => write_text(self, value),
        };
        written
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to write report to {}", self.target))
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Formats an optional number, or `-` when absent or not finite.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => "-".to_string(),
    }
}
