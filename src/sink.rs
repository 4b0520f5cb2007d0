use crate::error::{FinancialMetricsError, Result};
use crate::table::ResultTable;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(FinancialMetricsError::UnsupportedDestination(
                path.display().to_string(),
            )),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Destination for rendered tables. Each sink owns one output, so records
/// processed in parallel never share a writer.
pub trait ResultSink {
    fn write_table(&mut self, table: &ResultTable) -> Result<()>;
}

/// Writes one table to one file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Picks the format from the file extension (`.json` or `.csv`).
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = OutputFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn with_format(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for FileSink {
    fn write_table(&mut self, table: &ResultTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, table)?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => writer.write_all(table.to_csv()?.as_bytes())?,
        }
        writer.flush()?;

        info!(
            "Wrote {} rows x {} periods to {}",
            table.rows.len(),
            table.periods.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Collects tables in memory, e.g. to hand them to a mailer or a test.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<ResultTable>,
}

impl ResultSink for MemorySink {
    fn write_table(&mut self, table: &ResultTable) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }
}
