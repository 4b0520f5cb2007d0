//! # Financial Metrics Builder
//!
//! A library for turning sparse, multi-period financial summaries (extracted
//! from statements by an upstream document reader) into two presentation
//! tables: derived ratios and a common-size restatement.
//!
//! ## Core Concepts
//!
//! - **Summary Record**: period labels plus one series per catalog line item.
//!   Cells may be numbers, `"12,345"`-style strings, blanks or nulls.
//! - **Normalization**: every cell becomes a number or absent before any
//!   formula runs. Nothing in a record aborts the run except a missing
//!   `Years` array.
//! - **Metrics**: growth, margin, turnover, liquidity, leverage and per-head
//!   ratios, rounded to 3 significant digits. An absent operand or zero
//!   denominator blanks only that cell.
//! - **Vertical Analysis**: income-statement lines as a share of Revenue,
//!   balance-sheet lines as a share of Total Assets, with equity closing the
//!   balance sheet to 100%.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_metrics_builder::*;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "Years": [2022, 2023],
//!     "Revenue": [100, 150],
//!     "COGS": [40, 60]
//! });
//!
//! let record = SummaryRecord::from_json(&raw).unwrap();
//! let metrics = compute_metrics(&record).to_table();
//! assert_eq!(metrics.row("Gross Margin (%)").unwrap(), ["60", "60"]);
//!
//! write_vertical(&raw, "out/vertical.json").unwrap();
//! ```

pub mod chart_of_accounts;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod schema;
pub mod sink;
pub mod table;
pub mod utils;
pub mod vertical;

pub use chart_of_accounts::{LineItem, Section};
pub use engine::{eligible, DerivedMetric, Metric, MetricsEngine, MetricsTable, Unit};
pub use error::{FinancialMetricsError, Result};
pub use ingestion::{normalize_cell, normalize_record, normalize_series};
pub use schema::*;
pub use sink::{FileSink, MemorySink, OutputFormat, ResultSink};
pub use table::{ResultTable, TableRow};
pub use utils::*;
pub use vertical::{VerticalAnalyzer, VerticalResult, VerticalTable};

use log::{debug, info};
use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;

/// Both tables computed from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub metrics: MetricsTable,
    pub vertical: VerticalTable,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialAnalyzer {
    options: AnalysisOptions,
}

impl FinancialAnalyzer {
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn compute_metrics(&self, record: &SummaryRecord) -> MetricsTable {
        MetricsEngine::new(self.options).compute(record)
    }

    pub fn compute_vertical(&self, record: &SummaryRecord) -> VerticalTable {
        VerticalAnalyzer::new(self.options).compute(record)
    }

    /// Runs the two analyzers side by side; neither reads the other's output.
    pub fn analyze(&self, record: &SummaryRecord) -> Analysis {
        let (metrics, vertical) = rayon::join(
            || self.compute_metrics(record),
            || self.compute_vertical(record),
        );
        Analysis { metrics, vertical }
    }

    pub fn analyze_json(&self, raw: &Value) -> Result<Analysis> {
        let record = SummaryRecord::from_json(raw)?;
        info!(
            "Analyzing summary with {} periods",
            record.period_count()
        );
        Ok(self.analyze(&record))
    }

    /// Analyzes independent records in parallel. Results keep input order and
    /// one bad record never affects the others.
    pub fn analyze_batch(&self, raws: &[Value]) -> Vec<Result<Analysis>> {
        debug!("Analyzing batch of {} summaries", raws.len());
        raws.par_iter().map(|raw| self.analyze_json(raw)).collect()
    }

    /// Metrics entry point: normalizes `raw`, computes the ratio table and hands
    /// it to `sink`.
    ///
    /// Returns [`FinancialMetricsError::NotARecord`] or
    /// [`FinancialMetricsError::MissingPeriods`] when there is nothing to compute;
    /// see [`FinancialMetricsError::is_not_computed`].
    pub fn write_metrics_to(&self, raw: &Value, sink: &mut dyn ResultSink) -> Result<ResultTable> {
        let record = SummaryRecord::from_json(raw)?;
        let table = self.compute_metrics(&record).to_table();
        sink.write_table(&table)?;
        Ok(table)
    }

    /// Vertical entry point, same contract as [`Self::write_metrics_to`].
    pub fn write_vertical_to(&self, raw: &Value, sink: &mut dyn ResultSink) -> Result<ResultTable> {
        let record = SummaryRecord::from_json(raw)?;
        let table = self.compute_vertical(&record).to_table();
        sink.write_table(&table)?;
        Ok(table)
    }

    pub fn write_metrics(&self, raw: &Value, destination: impl AsRef<Path>) -> Result<ResultTable> {
        let mut sink = FileSink::new(destination.as_ref())?;
        self.write_metrics_to(raw, &mut sink)
    }

    pub fn write_vertical(&self, raw: &Value, destination: impl AsRef<Path>) -> Result<ResultTable> {
        let mut sink = FileSink::new(destination.as_ref())?;
        self.write_vertical_to(raw, &mut sink)
    }
}

pub fn compute_metrics(record: &SummaryRecord) -> MetricsTable {
    FinancialAnalyzer::default().compute_metrics(record)
}

pub fn compute_vertical(record: &SummaryRecord) -> VerticalTable {
    FinancialAnalyzer::default().compute_vertical(record)
}

pub fn analyze_batch(raws: &[Value]) -> Vec<Result<Analysis>> {
    FinancialAnalyzer::default().analyze_batch(raws)
}

pub fn write_metrics(raw: &Value, destination: impl AsRef<Path>) -> Result<ResultTable> {
    FinancialAnalyzer::default().write_metrics(raw, destination)
}

pub fn write_vertical(raw: &Value, destination: impl AsRef<Path>) -> Result<ResultTable> {
    FinancialAnalyzer::default().write_vertical(raw, destination)
}
