use crate::error::Result;
use crate::ingestion::PERIODS_KEY;
use crate::schema::PeriodSet;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Row label; empty for the separator row.
    pub label: String,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }

    pub fn blank(periods: usize) -> Self {
        Self::new("", vec![String::new(); periods])
    }

    pub fn is_blank(&self) -> bool {
        self.label.is_empty() && self.cells.iter().all(String::is_empty)
    }
}

/// A rendered output table: the period labels plus one row of text cells per
/// metric or line item, in presentation order.
///
/// Serializes as `{"Years": [...], "<label>": [...], ...}` with `Years` first.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub periods: PeriodSet,
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn new(periods: PeriodSet) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// First row carrying `label`.
    pub fn row(&self, label: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.cells.as_slice())
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Spreadsheet layout: a `Metric` header followed by one column per period,
    /// one line per row. The separator row is written as an empty line of cells.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Metric".to_string()];
        header.extend(self.periods.labels());
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.cells.len() + 1);
            record.push(row.label.as_str());
            record.extend(row.cells.iter().map(String::as_str));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len() + 1))?;
        map.serialize_entry(PERIODS_KEY, &self.periods)?;
        for row in &self.rows {
            map.serialize_entry(&row.label, &row.cells)?;
        }
        map.end()
    }
}
