use crate::chart_of_accounts::LineItem;
use crate::schema::{AnalysisOptions, Cell, PeriodSet, SummaryRecord};
use crate::table::{ResultTable, TableRow};
use crate::utils::{format_significant, round_to_significant_digits};
use log::{debug, warn};
use std::fmt;

/// Derived ratios reported for every period of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    RevenueGrowthRate,
    RevenueFluctuation,
    GrossMargin,
    GrossMarginExpansion,
    NetMargin,
    NetIncomeGrowthRate,
    InventoryTurnover,
    DaysToTurnInventory,
    DaysSalesOutstanding,
    DaysInPayables,
    InterestCoverageRatio,
    CurrentRatio,
    AcidTestRatio,
    DebtToEquityRatio,
    ReturnOnEquity,
    ReturnOnTotalAssets,
    EffectiveTaxRate,
    RevenuePerEmployee,
    NetIncomePerEmployee,
    SdeMultiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Ratio,
    Days,
    Currency,
}

impl Unit {
    fn scale(self, options: &AnalysisOptions) -> f64 {
        match self {
            Unit::Percent => 100.0,
            Unit::Days => options.days_in_period,
            Unit::Ratio | Unit::Currency => 1.0,
        }
    }
}

impl Metric {
    /// Catalog order, which is also the row order of the metrics table.
    pub fn all() -> impl Iterator<Item = Metric> {
        FORMULAS.iter().map(|formula| formula.metric)
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::RevenueGrowthRate => "Revenue Growth Rate (%)",
            Metric::RevenueFluctuation => "Revenue Fluctuation (%)",
            Metric::GrossMargin => "Gross Margin (%)",
            Metric::GrossMarginExpansion => "Gross Margin Expansion (pp)",
            Metric::NetMargin => "Net Margin (%)",
            Metric::NetIncomeGrowthRate => "Net Income Growth Rate (%)",
            Metric::InventoryTurnover => "Inventory Turnover / yr",
            Metric::DaysToTurnInventory => "Days to Turn Inventory",
            Metric::DaysSalesOutstanding => "Days Sales Outstanding",
            Metric::DaysInPayables => "Days in Payables",
            Metric::InterestCoverageRatio => "Interest Coverage Ratio",
            Metric::CurrentRatio => "Current Ratio",
            Metric::AcidTestRatio => "Acid Test Ratio",
            Metric::DebtToEquityRatio => "Debt-to-Equity Ratio",
            Metric::ReturnOnEquity => "Return on Equity (%)",
            Metric::ReturnOnTotalAssets => "RoR on Total Assets (%)",
            Metric::EffectiveTaxRate => "Effective Tax Rate (%)",
            Metric::RevenuePerEmployee => "Revenue per employee",
            Metric::NetIncomePerEmployee => "Net Income per employee",
            Metric::SdeMultiple => "SDE/EBIT multiple",
        }
    }

    pub fn unit(self) -> Unit {
        self.formula().unit
    }

    /// True when the metric compares period i with period i-1.
    pub fn needs_prior_period(self) -> bool {
        self.formula().operands.iter().any(|op| op.lag > 0)
    }

    fn formula(self) -> &'static Formula {
        FORMULAS
            .iter()
            .find(|formula| formula.metric == self)
            .unwrap_or_else(|| unreachable!("every metric has a formula"))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A line item read at period `i - lag`.
#[derive(Debug, Clone, Copy)]
struct Operand {
    item: LineItem,
    lag: usize,
}

const fn cur(item: LineItem) -> Operand {
    Operand { item, lag: 0 }
}

const fn prior(item: LineItem) -> Operand {
    Operand { item, lag: 1 }
}

/// One row of the metric table. `denominators` index into `operands` and must
/// be non-zero; `compute` receives the operand values in declaration order and
/// returns `None` when a derived denominator is zero.
struct Formula {
    metric: Metric,
    operands: &'static [Operand],
    denominators: &'static [usize],
    compute: fn(&[f64]) -> Option<f64>,
    unit: Unit,
}

use LineItem::*;

static FORMULAS: [Formula; 20] = [
    Formula {
        metric: Metric::RevenueGrowthRate,
        operands: &[cur(Revenue), prior(Revenue)],
        denominators: &[1],
        compute: |v| Some((v[0] - v[1]) / v[1]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::RevenueFluctuation,
        operands: &[cur(Revenue), prior(Revenue)],
        denominators: &[1],
        compute: |v| Some(((v[0] - v[1]) / v[1]).abs()),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::GrossMargin,
        operands: &[cur(Revenue), cur(Cogs)],
        denominators: &[0],
        compute: |v| Some((v[0] - v[1]) / v[0]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::GrossMarginExpansion,
        operands: &[cur(GrossMargin), prior(GrossMargin)],
        denominators: &[],
        compute: |v| Some(v[0] - v[1]),
        unit: Unit::Currency,
    },
    Formula {
        metric: Metric::NetMargin,
        operands: &[cur(NetIncome), cur(Revenue)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::NetIncomeGrowthRate,
        operands: &[cur(NetIncome), prior(NetIncome)],
        denominators: &[1],
        compute: |v| Some((v[0] - v[1]) / v[1]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::InventoryTurnover,
        operands: &[cur(Cogs), cur(Inventory)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Ratio,
    },
    Formula {
        metric: Metric::DaysToTurnInventory,
        operands: &[cur(Inventory), cur(Cogs)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Days,
    },
    Formula {
        metric: Metric::DaysSalesOutstanding,
        operands: &[cur(AccountsReceivable), cur(Revenue)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Days,
    },
    Formula {
        metric: Metric::DaysInPayables,
        operands: &[cur(AccountsPayable), cur(Cogs)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Days,
    },
    Formula {
        metric: Metric::InterestCoverageRatio,
        operands: &[cur(Ebit), cur(InterestPaid)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Ratio,
    },
    Formula {
        metric: Metric::CurrentRatio,
        operands: &[cur(CurrentAssets), cur(CurrentLiabilities)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Ratio,
    },
    Formula {
        metric: Metric::AcidTestRatio,
        operands: &[cur(CurrentAssets), cur(Inventory), cur(CurrentLiabilities)],
        denominators: &[2],
        compute: |v| Some((v[0] - v[1]) / v[2]),
        unit: Unit::Ratio,
    },
    Formula {
        metric: Metric::DebtToEquityRatio,
        operands: &[cur(TotalLiabilities), cur(TotalEquity)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Ratio,
    },
    Formula {
        metric: Metric::ReturnOnEquity,
        operands: &[cur(NetIncome), cur(TotalEquity)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::ReturnOnTotalAssets,
        operands: &[cur(NetIncome), cur(TotalAssets)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::EffectiveTaxRate,
        operands: &[cur(Taxes), cur(Ebit), cur(InterestPaid)],
        denominators: &[],
        compute: |v| {
            let pretax_income = v[1] - v[2];
            if pretax_income == 0.0 {
                None
            } else {
                Some(v[0] / pretax_income)
            }
        },
        unit: Unit::Percent,
    },
    Formula {
        metric: Metric::RevenuePerEmployee,
        operands: &[cur(Revenue), cur(NumberOfEmployees)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Currency,
    },
    Formula {
        metric: Metric::NetIncomePerEmployee,
        operands: &[cur(NetIncome), cur(NumberOfEmployees)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Currency,
    },
    Formula {
        metric: Metric::SdeMultiple,
        operands: &[cur(Sde), cur(Ebit)],
        denominators: &[1],
        compute: |v| Some(v[0] / v[1]),
        unit: Unit::Ratio,
    },
];

/// Returns the operand values when every operand is present and every
/// designated denominator is non-zero.
pub fn eligible(operands: &[Cell], denominators: &[usize]) -> Option<Vec<f64>> {
    let values = operands.iter().copied().collect::<Option<Vec<f64>>>()?;
    if denominators
        .iter()
        .any(|&idx| values.get(idx).map_or(true, |v| *v == 0.0))
    {
        return None;
    }
    Some(values)
}

/// One metric across every period; `None` cells render as `""`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetric {
    pub metric: Metric,
    pub values: Vec<Cell>,
}

impl DerivedMetric {
    pub fn formatted(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|cell| cell.map(format_significant).unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    pub periods: PeriodSet,
    pub metrics: Vec<DerivedMetric>,
}

impl MetricsTable {
    pub fn get(&self, metric: Metric) -> Option<&DerivedMetric> {
        self.metrics.iter().find(|derived| derived.metric == metric)
    }

    pub fn to_table(&self) -> ResultTable {
        let mut table = ResultTable::new(self.periods.clone());
        for derived in &self.metrics {
            table.push_row(TableRow::new(derived.metric.name(), derived.formatted()));
        }
        table
    }
}

pub struct MetricsEngine {
    options: AnalysisOptions,
}

impl MetricsEngine {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn compute(&self, record: &SummaryRecord) -> MetricsTable {
        let n = record.period_count();
        debug!("Computing {} metrics over {} periods", FORMULAS.len(), n);

        let metrics = FORMULAS
            .iter()
            .map(|formula| DerivedMetric {
                metric: formula.metric,
                values: (0..n)
                    .map(|period| self.evaluate(formula, record, period))
                    .collect(),
            })
            .collect();

        MetricsTable {
            periods: record.periods().clone(),
            metrics,
        }
    }

    fn evaluate(&self, formula: &Formula, record: &SummaryRecord, period: usize) -> Cell {
        let operands: Vec<Cell> = formula
            .operands
            .iter()
            .map(|op| {
                period
                    .checked_sub(op.lag)
                    .and_then(|idx| record.cell(op.item, idx))
            })
            .collect();

        let values = eligible(&operands, formula.denominators)?;
        let raw = (formula.compute)(&values)? * formula.unit.scale(&self.options);

        if !raw.is_finite() {
            warn!(
                "Dropping {} for period {:?}: result {} from operands {:?}",
                formula.metric,
                record.periods().as_slice().get(period),
                raw,
                formula
                    .operands
                    .iter()
                    .map(|op| op.item.name())
                    .zip(values.iter())
                    .collect::<Vec<_>>()
            );
            return None;
        }

        Some(round_to_significant_digits(raw, self.options.significant_digits))
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}
