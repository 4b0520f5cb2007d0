//! Common-size restatement: every income-statement line as a share of Revenue
//! and every balance-sheet line as a share of Total Assets.

use crate::chart_of_accounts::{LineItem, Section};
use crate::schema::{AnalysisOptions, Cell, PeriodSet, SummaryRecord};
use crate::table::{ResultTable, TableRow};
use crate::utils::format_percentage;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalResult {
    pub item: LineItem,
    /// Unrounded percentages of the section's base line.
    pub values: Vec<Cell>,
}

impl VerticalResult {
    pub fn formatted(&self, decimals: usize) -> Vec<String> {
        self.values
            .iter()
            .map(|cell| {
                cell.map(|v| format_percentage(v, decimals))
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalTable {
    pub periods: PeriodSet,
    pub income_statement: Vec<VerticalResult>,
    pub balance_sheet: Vec<VerticalResult>,
    pub percent_decimals: usize,
}

impl VerticalTable {
    pub fn get(&self, item: LineItem) -> Option<&VerticalResult> {
        self.income_statement
            .iter()
            .chain(self.balance_sheet.iter())
            .find(|result| result.item == item)
    }

    /// Income-statement rows, one blank separator row, then balance-sheet rows.
    pub fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(self.periods.clone());
        for result in &self.income_statement {
            table.push_row(TableRow::new(
                result.item.name(),
                result.formatted(self.percent_decimals),
            ));
        }
        table.push_row(TableRow::blank(self.periods.len()));
        for result in &self.balance_sheet {
            table.push_row(TableRow::new(
                result.item.name(),
                result.formatted(self.percent_decimals),
            ));
        }
        table
    }
}

pub struct VerticalAnalyzer {
    options: AnalysisOptions,
}

impl VerticalAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn compute(&self, record: &SummaryRecord) -> VerticalTable {
        debug!(
            "Computing common-size statements over {} periods",
            record.period_count()
        );

        VerticalTable {
            periods: record.periods().clone(),
            income_statement: LineItem::INCOME_STATEMENT
                .iter()
                .map(|item| self.restate(record, *item))
                .collect(),
            balance_sheet: LineItem::BALANCE_SHEET
                .iter()
                .map(|item| self.restate(record, *item))
                .collect(),
            percent_decimals: self.options.percent_decimals,
        }
    }

    fn restate(&self, record: &SummaryRecord, item: LineItem) -> VerticalResult {
        let values = (0..record.period_count())
            .map(|period| match item {
                // The base line is 100 wherever it was reported, zero included.
                LineItem::Revenue => record.cell(item, period).map(|_| 100.0),
                // Equity closes the balance sheet against liabilities rather than
                // using the reported equity figure.
                LineItem::TotalEquity => {
                    share_of_base(record, LineItem::TotalLiabilities, period)
                        .map(|liabilities| 100.0 - liabilities)
                }
                _ => share_of_base(record, item, period),
            })
            .collect();

        VerticalResult { item, values }
    }
}

impl Default for VerticalAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

/// The base line an item is restated against.
pub fn base_line(item: LineItem) -> Option<LineItem> {
    match item.section() {
        Section::IncomeStatement => Some(LineItem::Revenue),
        Section::BalanceSheet => Some(LineItem::TotalAssets),
        Section::Operational => None,
    }
}

fn share_of_base(record: &SummaryRecord, item: LineItem, period: usize) -> Cell {
    let base_item = base_line(item)?;
    let base = record.cell(base_item, period)?;
    let value = record.cell(item, period)?;
    if base == 0.0 {
        return None;
    }

    let share = value / base * 100.0;
    if !share.is_finite() {
        warn!(
            "Dropping common-size {} for period {:?}: {} {} over {} {} is {}",
            item,
            record.periods().as_slice().get(period),
            item,
            value,
            base_item,
            base,
            share
        );
        return None;
    }
    Some(share)
}
