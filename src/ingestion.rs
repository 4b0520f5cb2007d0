use crate::chart_of_accounts::LineItem;
use crate::error::{FinancialMetricsError, Result};
use crate::schema::{Cell, PeriodSet, SummaryRecord};
use log::debug;
use serde_json::{Map, Value};

pub const PERIODS_KEY: &str = "Years";

/// Converts one raw cell to a number, or `None` when it carries no usable figure.
///
/// Accepts native numbers and strings such as `"12,345"` or `" -1,000.5 "`.
/// Blanks, `null`, booleans, nested values and anything unparseable are absent,
/// as are non-finite results ("NaN", "inf").
pub fn normalize_cell(raw: &Value) -> Cell {
    match raw {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_grouped_number(text),
        _ => None,
    }
}

/// Parses a number written with comma thousands separators.
pub fn parse_grouped_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalizes a raw series to exactly `periods` cells.
///
/// Short arrays are padded with absent cells, long ones truncated. A value that
/// is not an array at all yields an all-absent series.
pub fn normalize_series(raw: Option<&Value>, periods: usize) -> Vec<Cell> {
    let Some(raw) = raw else {
        return vec![None; periods];
    };

    let Value::Array(values) = raw else {
        debug!("Expected an array of period values, got {}; treating as blank", raw);
        return vec![None; periods];
    };

    if values.len() != periods {
        debug!(
            "Series has {} values for {} periods; aligning to periods",
            values.len(),
            periods
        );
    }

    let mut cells: Vec<Cell> = values.iter().take(periods).map(normalize_cell).collect();
    cells.resize(periods, None);
    cells
}

/// Builds a [`SummaryRecord`] from an extracted summary such as
/// `{"Years": [2022, 2023], "Revenue": [100, "1,250"], ...}`.
///
/// Only two inputs are rejected, and both mean "nothing to compute": a value
/// that is not a JSON object, and an object without a `Years` array.
pub fn normalize_record(raw: &Value) -> Result<SummaryRecord> {
    let Value::Object(map) = raw else {
        return Err(FinancialMetricsError::NotARecord(json_type_name(raw).to_string()));
    };

    let periods = match map.get(PERIODS_KEY) {
        Some(Value::Array(years)) => PeriodSet(years.clone()),
        _ => return Err(FinancialMetricsError::MissingPeriods),
    };
    let n = periods.len();

    let mut record = SummaryRecord::new(periods);
    for item in LineItem::ALL {
        let series = normalize_series(lookup(map, item), n);
        record = record.with_series(item, series);
    }

    for key in map.keys() {
        if key != PERIODS_KEY && LineItem::from_key(key).is_none() {
            debug!("Ignoring line item outside the catalog: {}", key);
        }
    }

    Ok(record)
}

fn lookup<'a>(map: &'a Map<String, Value>, item: LineItem) -> Option<&'a Value> {
    map.get(item.name()).or_else(|| {
        item.aliases()
            .iter()
            .find_map(|alias| map.get(*alias))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
