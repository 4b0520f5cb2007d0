use crate::chart_of_accounts::LineItem;
use crate::error::{FinancialMetricsError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A normalized cell: a number, or `None` when the source had no usable figure.
pub type Cell = Option<f64>;

/// Ordered reporting periods shared by every series in a record.
///
/// Labels are kept exactly as extracted (usually integer years, sometimes text
/// such as `"FY2023"`) so they round-trip unchanged into the output tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodSet(pub Vec<Value>);

impl PeriodSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Plain-text labels for tabular output; strings are written without quotes.
    pub fn labels(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|label| match label {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect()
    }
}

impl<T: Into<Value>> FromIterator<T> for PeriodSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Normalized summary of one document set: every catalog item holds exactly
/// one cell per period.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    periods: PeriodSet,
    items: BTreeMap<LineItem, Vec<Cell>>,
}

impl SummaryRecord {
    /// A record where every catalog item is absent for every period.
    pub fn new(periods: PeriodSet) -> Self {
        let n = periods.len();
        let items = LineItem::ALL
            .iter()
            .map(|item| (*item, vec![None; n]))
            .collect();
        Self { periods, items }
    }

    /// Replaces one series, padding with absent cells or truncating so it
    /// stays aligned to the period set.
    pub fn with_series(mut self, item: LineItem, mut cells: Vec<Cell>) -> Self {
        cells.resize(self.periods.len(), None);
        self.items.insert(item, cells);
        self
    }

    /// Parses and normalizes a raw JSON summary. See [`crate::ingestion::normalize_record`].
    pub fn from_json(raw: &Value) -> Result<Self> {
        crate::ingestion::normalize_record(raw)
    }

    pub fn periods(&self) -> &PeriodSet {
        &self.periods
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn series(&self, item: LineItem) -> &[Cell] {
        self.items.get(&item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, item: LineItem, period: usize) -> Cell {
        self.series(item).get(period).copied().flatten()
    }
}

/// Tuning knobs for rendering. The defaults reproduce the reference report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisOptions {
    #[schemars(description = "Significant digits kept when rounding derived metrics. Default 3.")]
    pub significant_digits: u32,

    #[schemars(description = "Decimal places shown for common-size percentages. Default 1.")]
    pub percent_decimals: usize,

    #[schemars(
        description = "Days in one reporting period, used by the days-outstanding metrics. 365 for annual statements."
    )]
    pub days_in_period: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            significant_digits: 3,
            percent_decimals: 1,
            days_in_period: 365.0,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.significant_digits == 0 {
            return Err(FinancialMetricsError::InvalidOptions(
                "significant_digits must be at least 1".to_string(),
            ));
        }
        if !self.days_in_period.is_finite() || self.days_in_period <= 0.0 {
            return Err(FinancialMetricsError::InvalidOptions(format!(
                "days_in_period must be a positive number, got {}",
                self.days_in_period
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PeriodLabel {
    #[schemars(description = "Fiscal year, e.g. 2023")]
    Year(i64),
    #[schemars(description = "Free-form period label, e.g. 'FY2023' or 'TTM'")]
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawCell {
    #[schemars(description = "Reported figure")]
    Number(f64),
    #[schemars(
        description = "Figure as printed, thousands separators allowed (\"12,345\"). Use \"\" when not reported."
    )]
    Text(String),
    #[schemars(description = "Not reported")]
    Blank,
}

/// Shape of the summary record the extraction step is asked to produce.
/// Every array must have one entry per element of `Years`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SummaryTemplate {
    #[serde(rename = "Years")]
    #[schemars(description = "Reporting periods, oldest first")]
    pub years: Vec<PeriodLabel>,

    #[serde(rename = "Revenue", default)]
    #[schemars(description = "Total sales / turnover for the period")]
    pub revenue: Vec<RawCell>,

    #[serde(rename = "COGS", default)]
    #[schemars(description = "Cost of goods sold / cost of sales")]
    pub cogs: Vec<RawCell>,

    #[serde(rename = "Gross Margin", default)]
    #[schemars(description = "Gross profit as reported (Revenue minus COGS)")]
    pub gross_margin: Vec<RawCell>,

    #[serde(rename = "Operating Expenses", default)]
    pub operating_expenses: Vec<RawCell>,

    #[serde(rename = "EBIT", default)]
    #[schemars(description = "Earnings before interest and taxes")]
    pub ebit: Vec<RawCell>,

    #[serde(rename = "Interest Paid", default)]
    pub interest_paid: Vec<RawCell>,

    #[serde(rename = "Taxes", default)]
    pub taxes: Vec<RawCell>,

    #[serde(rename = "Net Income", default)]
    pub net_income: Vec<RawCell>,

    #[serde(rename = "SDE", default)]
    #[schemars(description = "Seller's discretionary earnings")]
    pub sde: Vec<RawCell>,

    #[serde(rename = "Cash", default)]
    pub cash: Vec<RawCell>,

    #[serde(rename = "Accounts Receivable", default)]
    pub accounts_receivable: Vec<RawCell>,

    #[serde(rename = "Inventory", default)]
    pub inventory: Vec<RawCell>,

    #[serde(rename = "Current Assets", default)]
    pub current_assets: Vec<RawCell>,

    #[serde(rename = "Accounts Payable", default)]
    pub accounts_payable: Vec<RawCell>,

    #[serde(rename = "Current Liabilities", default)]
    pub current_liabilities: Vec<RawCell>,

    #[serde(rename = "Total Liabilities", alias = "Total Liabilites", default)]
    pub total_liabilities: Vec<RawCell>,

    #[serde(rename = "Total Assets", default)]
    pub total_assets: Vec<RawCell>,

    #[serde(rename = "Total Equity", default)]
    pub total_equity: Vec<RawCell>,

    #[serde(rename = "Number of Employees", default)]
    #[schemars(description = "Headcount at period end")]
    pub number_of_employees: Vec<RawCell>,
}

impl SummaryTemplate {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SummaryTemplate)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Normalizes a typed template through the same path as raw JSON input.
    pub fn into_record(self) -> Result<SummaryRecord> {
        let raw = serde_json::to_value(&self)?;
        SummaryRecord::from_json(&raw)
    }
}
