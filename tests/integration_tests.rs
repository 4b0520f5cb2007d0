use financial_metrics_builder::*;
use serde_json::{json, Value};
use std::fs;

fn metrics_row(raw: &Value, label: &str) -> Vec<String> {
    let record = SummaryRecord::from_json(raw).unwrap();
    compute_metrics(&record)
        .to_table()
        .row(label)
        .unwrap_or_else(|| panic!("missing metric row {}", label))
        .to_vec()
}

fn vertical_row(raw: &Value, label: &str) -> Vec<String> {
    let record = SummaryRecord::from_json(raw).unwrap();
    compute_vertical(&record)
        .to_table()
        .row(label)
        .unwrap_or_else(|| panic!("missing vertical row {}", label))
        .to_vec()
}

fn retail_summary() -> Value {
    json!({
        "Years": [2021, 2022, 2023],
        "Revenue": ["1,200,000", "1,380,000", "1,311,000"],
        "COGS": ["720,000", "800,400", "773,490"],
        "Gross Margin": [480000, 579600, 537510],
        "Operating Expenses": [300000, 330000, 345000],
        "EBIT": [180000, 249600, 192510],
        "Interest Paid": [20000, 18000, ""],
        "Taxes": [40000, 57900, 45000],
        "Net Income": [120000, 173700, 147510],
        "SDE": [260000, 330000, 290000],
        "Cash": [150000, 180000, 250000],
        "Accounts Receivable": [100000, 115000, 130000],
        "Inventory": [240000, 250000, 0],
        "Current Assets": [490000, 545000, 380000],
        "Accounts Payable": [75000, 80000, 95000],
        "Current Liabilities": [160000, 170000, 0],
        "Total Liabilites": [400000, 380000, 350000],
        "Total Assets": [1000000, 1100000, 1000000],
        "Total Equity": [600000, 720000, 650000],
        "Number of Employees": [15, 16, null],
        "Company Notes": ["ignored", "ignored", "ignored"]
    })
}

#[test]
fn test_gross_margin_and_growth_scenario() {
    let raw = json!({"Years": [2022, 2023], "Revenue": [100, 150], "COGS": [40, 60]});
    assert_eq!(metrics_row(&raw, "Gross Margin (%)"), vec!["60", "60"]);
    assert_eq!(metrics_row(&raw, "Revenue Growth Rate (%)"), vec!["", "50"]);
}

#[test]
fn test_absent_current_revenue_blanks_dependent_metrics() {
    let raw = json!({"Years": [2022, 2023], "Revenue": [100, ""], "COGS": [40, 60]});
    assert_eq!(metrics_row(&raw, "Gross Margin (%)"), vec!["60", ""]);
    assert_eq!(metrics_row(&raw, "Revenue Growth Rate (%)"), vec!["", ""]);
}

#[test]
fn test_zero_denominator_only_blanks_its_own_metric() {
    let raw = json!({
        "Years": [2023],
        "Current Assets": [500],
        "Current Liabilities": [0],
        "Total Liabilities": [300],
        "Total Equity": [600]
    });
    assert_eq!(metrics_row(&raw, "Current Ratio"), vec![""]);
    assert_eq!(metrics_row(&raw, "Debt-to-Equity Ratio"), vec!["0.5"]);
}

#[test]
fn test_equity_from_complement_when_not_reported() {
    let raw = json!({"Years": [2023], "Total Assets": [1000], "Total Liabilities": [400]});
    assert_eq!(vertical_row(&raw, "Total Equity"), vec!["60"]);
    assert_eq!(vertical_row(&raw, "Total Liabilities"), vec!["40"]);
}

#[test]
fn test_full_retail_summary() {
    let raw = retail_summary();

    assert_eq!(
        metrics_row(&raw, "Revenue Growth Rate (%)"),
        vec!["", "15", "-5"]
    );
    assert_eq!(
        metrics_row(&raw, "Revenue Fluctuation (%)"),
        vec!["", "15", "5"]
    );
    assert_eq!(metrics_row(&raw, "Gross Margin (%)"), vec!["40", "42", "41"]);
    assert_eq!(
        metrics_row(&raw, "Gross Margin Expansion (pp)"),
        vec!["", "99600", "-42100"]
    );
    assert_eq!(metrics_row(&raw, "Net Margin (%)"), vec!["10", "12.6", "11.3"]);
    assert_eq!(
        metrics_row(&raw, "Inventory Turnover / yr"),
        vec!["3", "3.2", ""]
    );
    assert_eq!(
        metrics_row(&raw, "Days to Turn Inventory"),
        vec!["122", "114", "0"]
    );
    assert_eq!(
        metrics_row(&raw, "Interest Coverage Ratio"),
        vec!["9", "13.9", ""]
    );
    assert_eq!(metrics_row(&raw, "Current Ratio"), vec!["3.06", "3.21", ""]);
    assert_eq!(metrics_row(&raw, "Acid Test Ratio"), vec!["1.56", "1.74", ""]);
    assert_eq!(
        metrics_row(&raw, "Debt-to-Equity Ratio"),
        vec!["0.667", "0.528", "0.538"]
    );
    assert_eq!(
        metrics_row(&raw, "Effective Tax Rate (%)"),
        vec!["25", "25", ""]
    );
    assert_eq!(
        metrics_row(&raw, "Revenue per employee"),
        vec!["80000", "86200", ""]
    );
    assert_eq!(
        metrics_row(&raw, "SDE/EBIT multiple"),
        vec!["1.44", "1.32", "1.51"]
    );

    assert_eq!(vertical_row(&raw, "Revenue"), vec!["100", "100", "100"]);
    assert_eq!(vertical_row(&raw, "COGS"), vec!["60", "58", "59"]);
    assert_eq!(vertical_row(&raw, "Interest Paid"), vec!["1.7", "1.3", ""]);
    assert_eq!(vertical_row(&raw, "Cash"), vec!["15", "16.4", "25"]);
    assert_eq!(vertical_row(&raw, "Total Equity"), vec!["60", "65.5", "65"]);
}

#[test]
fn test_prior_period_metrics_never_fill_first_period() {
    let raw = retail_summary();
    for label in [
        "Revenue Growth Rate (%)",
        "Revenue Fluctuation (%)",
        "Gross Margin Expansion (pp)",
        "Net Income Growth Rate (%)",
    ] {
        assert_eq!(metrics_row(&raw, label)[0], "", "{}", label);
    }
}

#[test]
fn test_absence_propagates_to_every_metric() {
    let raw = json!({
        "Years": [2023],
        "Revenue": [""],
        "COGS": [null],
        "Gross Margin": ["n/a"],
        "EBIT": [true],
        "Net Income": [{"value": 5}],
        "Total Assets": ["—"]
    });
    let record = SummaryRecord::from_json(&raw).unwrap();
    let table = compute_metrics(&record).to_table();
    for row in &table.rows {
        assert_eq!(row.cells, vec![""], "{}", row.label);
    }
}

#[test]
fn test_balance_sheet_closure_holds_for_every_period() {
    let raw = retail_summary();
    let record = SummaryRecord::from_json(&raw).unwrap();
    let vertical = compute_vertical(&record);
    let liabilities = &vertical.get(LineItem::TotalLiabilities).unwrap().values;
    let equity = &vertical.get(LineItem::TotalEquity).unwrap().values;

    for (l, e) in liabilities.iter().zip(equity.iter()) {
        let total = l.unwrap() + e.unwrap();
        assert!((total - 100.0).abs() < 1e-9, "closure broke: {}", total);
    }
}

#[test]
fn test_analysis_is_idempotent() {
    let raw = retail_summary();
    let analyzer = FinancialAnalyzer::default();
    let first = analyzer.analyze_json(&raw).unwrap();
    let second = analyzer.analyze_json(&raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.metrics.to_table().to_json().unwrap(),
        second.metrics.to_table().to_json().unwrap()
    );
}

#[test]
fn test_empty_period_set_yields_empty_tables() {
    let raw = json!({"Years": [], "Revenue": [100]});
    let analysis = FinancialAnalyzer::default().analyze_json(&raw).unwrap();

    let metrics = analysis.metrics.to_table();
    assert_eq!(metrics.rows.len(), Metric::all().count());
    assert!(metrics.rows.iter().all(|row| row.cells.is_empty()));

    let vertical = analysis.vertical.to_table();
    assert!(vertical.rows.iter().all(|row| row.cells.is_empty()));
}

#[test]
fn test_output_shape_round_trips_through_json() {
    let raw = json!({"Years": [2022, "FY2023"], "Revenue": [100, 150], "COGS": [40, 60]});
    let record = SummaryRecord::from_json(&raw).unwrap();

    let metrics: Value = compute_metrics(&record).to_table().to_value().unwrap();
    assert_eq!(metrics["Years"], json!([2022, "FY2023"]));
    assert_eq!(metrics["Gross Margin (%)"], json!(["60", "60"]));
    let keys: Vec<&String> = metrics.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "Years");
    assert_eq!(keys[1], "Revenue Growth Rate (%)");
    assert_eq!(keys.len(), Metric::all().count() + 1);

    let vertical: Value = compute_vertical(&record).to_table().to_value().unwrap();
    assert_eq!(vertical[""], json!(["", ""]));
    assert_eq!(vertical["Revenue"], json!(["100", "100"]));
    assert_eq!(vertical["COGS"], json!(["40", "40"]));
}

#[test]
fn test_entry_points_write_files() {
    let dir = tempfile::tempdir().unwrap();
    let raw = retail_summary();

    let metrics_path = dir.path().join("analysis.json");
    let table = write_metrics(&raw, &metrics_path).unwrap();
    let written: Value = serde_json::from_str(&fs::read_to_string(&metrics_path).unwrap()).unwrap();
    assert_eq!(written, table.to_value().unwrap());

    let vertical_path = dir.path().join("vertical.csv");
    write_vertical(&raw, &vertical_path).unwrap();
    let csv = fs::read_to_string(&vertical_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Metric,2021,2022,2023");
    assert_eq!(lines[1], "Revenue,100,100,100");
    assert_eq!(lines[10], ",,,");
    assert_eq!(lines[11], "Cash,15,16.4,25");
}

#[test]
fn test_entry_points_signal_nothing_to_compute() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");

    let err = write_metrics(&json!({"Not Found": "Not Found"}), &path).unwrap_err();
    assert!(err.is_not_computed());
    let err = write_vertical(&json!("summary"), &path).unwrap_err();
    assert!(err.is_not_computed());
    assert!(!path.exists());

    let err = write_metrics(&retail_summary(), dir.path().join("analysis.xlsx")).unwrap_err();
    assert!(!err.is_not_computed());
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    let raws = vec![
        json!({"Years": [2023], "Revenue": [200], "COGS": [50]}),
        json!({"Revenue": [1]}),
        json!({"Years": [2023], "Revenue": [400], "COGS": [300]}),
    ];

    let results = analyze_batch(&raws);
    assert_eq!(results.len(), 3);

    let first = results[0].as_ref().unwrap().metrics.to_table();
    assert_eq!(first.row("Gross Margin (%)").unwrap(), ["75"]);
    assert!(results[1].as_ref().unwrap_err().is_not_computed());
    let third = results[2].as_ref().unwrap().metrics.to_table();
    assert_eq!(third.row("Gross Margin (%)").unwrap(), ["25"]);
}

#[test]
fn test_memory_sink_collects_both_tables() {
    let analyzer = FinancialAnalyzer::new(AnalysisOptions {
        percent_decimals: 2,
        ..AnalysisOptions::default()
    })
    .unwrap();
    let raw = json!({"Years": [2023], "Revenue": [300], "Taxes": [7]});

    let mut sink = MemorySink::default();
    analyzer.write_metrics_to(&raw, &mut sink).unwrap();
    analyzer.write_vertical_to(&raw, &mut sink).unwrap();

    assert_eq!(sink.tables.len(), 2);
    assert_eq!(sink.tables[1].row("Taxes").unwrap(), ["2.33"]);
}
