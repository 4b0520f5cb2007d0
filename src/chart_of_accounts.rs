use std::fmt;

/// Statement a line item is reported on. Drives the base line used by the
/// common-size restatement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    IncomeStatement,
    BalanceSheet,
    /// Operating data that belongs to neither statement (headcount).
    Operational,
}

/// The fixed catalog of line items the engine reads from a summary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineItem {
    Revenue,
    Cogs,
    GrossMargin,
    OperatingExpenses,
    Ebit,
    InterestPaid,
    Taxes,
    NetIncome,
    Sde,
    Cash,
    AccountsReceivable,
    Inventory,
    CurrentAssets,
    AccountsPayable,
    CurrentLiabilities,
    TotalLiabilities,
    TotalAssets,
    TotalEquity,
    NumberOfEmployees,
}

impl LineItem {
    pub const ALL: [LineItem; 19] = [
        LineItem::Revenue,
        LineItem::Cogs,
        LineItem::GrossMargin,
        LineItem::OperatingExpenses,
        LineItem::Ebit,
        LineItem::InterestPaid,
        LineItem::Taxes,
        LineItem::NetIncome,
        LineItem::Sde,
        LineItem::Cash,
        LineItem::AccountsReceivable,
        LineItem::Inventory,
        LineItem::CurrentAssets,
        LineItem::AccountsPayable,
        LineItem::CurrentLiabilities,
        LineItem::TotalLiabilities,
        LineItem::TotalAssets,
        LineItem::TotalEquity,
        LineItem::NumberOfEmployees,
    ];

    /// Row order of the income-statement block in the common-size table.
    pub const INCOME_STATEMENT: [LineItem; 9] = [
        LineItem::Revenue,
        LineItem::Cogs,
        LineItem::GrossMargin,
        LineItem::OperatingExpenses,
        LineItem::Ebit,
        LineItem::InterestPaid,
        LineItem::Taxes,
        LineItem::NetIncome,
        LineItem::Sde,
    ];

    /// Row order of the balance-sheet block in the common-size table.
    pub const BALANCE_SHEET: [LineItem; 9] = [
        LineItem::Cash,
        LineItem::AccountsReceivable,
        LineItem::Inventory,
        LineItem::CurrentAssets,
        LineItem::TotalAssets,
        LineItem::AccountsPayable,
        LineItem::CurrentLiabilities,
        LineItem::TotalLiabilities,
        LineItem::TotalEquity,
    ];

    /// The key this item carries in a summary record.
    pub fn name(self) -> &'static str {
        match self {
            LineItem::Revenue => "Revenue",
            LineItem::Cogs => "COGS",
            LineItem::GrossMargin => "Gross Margin",
            LineItem::OperatingExpenses => "Operating Expenses",
            LineItem::Ebit => "EBIT",
            LineItem::InterestPaid => "Interest Paid",
            LineItem::Taxes => "Taxes",
            LineItem::NetIncome => "Net Income",
            LineItem::Sde => "SDE",
            LineItem::Cash => "Cash",
            LineItem::AccountsReceivable => "Accounts Receivable",
            LineItem::Inventory => "Inventory",
            LineItem::CurrentAssets => "Current Assets",
            LineItem::AccountsPayable => "Accounts Payable",
            LineItem::CurrentLiabilities => "Current Liabilities",
            LineItem::TotalLiabilities => "Total Liabilities",
            LineItem::TotalAssets => "Total Assets",
            LineItem::TotalEquity => "Total Equity",
            LineItem::NumberOfEmployees => "Number of Employees",
        }
    }

    /// Alternate keys seen in extracted summaries. Only consulted when the
    /// canonical name is missing.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LineItem::TotalLiabilities => &["Total Liabilites"],
            _ => &[],
        }
    }

    pub fn section(self) -> Section {
        match self {
            LineItem::Revenue
            | LineItem::Cogs
            | LineItem::GrossMargin
            | LineItem::OperatingExpenses
            | LineItem::Ebit
            | LineItem::InterestPaid
            | LineItem::Taxes
            | LineItem::NetIncome
            | LineItem::Sde => Section::IncomeStatement,
            LineItem::NumberOfEmployees => Section::Operational,
            _ => Section::BalanceSheet,
        }
    }

    /// Looks up a catalog item by its canonical name or one of its aliases.
    pub fn from_key(key: &str) -> Option<LineItem> {
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.name() == key || item.aliases().contains(&key))
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
