use bizlens::config::AnalysisSettings;
use bizlens::loader::load_by_name;
use bizlens::metrics::{customers, finance, hr, inventory, percent_change, suppliers, FinanceLabels};
use bizlens::output::export_report;
use bizlens::types::{AlertKind, Severity};
use bizlens::{build_report, CsvTableSource, Period, TabularDataset, TableName, TableSource};
use std::fs;
use std::path::Path;

fn write_fixture(dir: &Path) {
    fs::write(
        dir.join("finance.csv"),
        "date,type,amount,category\n\
         2024-01-10,Revenue,800,Sales\n\
         2024-01-20,Expense,400,Rent\n\
         2024-02-05,Revenue,1000,Sales\n\
         2024-02-10,Expense,700,Payroll\n\
         2024-02-12,Expense,500,Rent\n",
    )
    .unwrap();
    fs::write(
        dir.join("inventory.csv"),
        "product_id,product,category,quantity,minimum_level,unit_cost,quantity_sold,unit_price,date\n\
         A1,Apple,Fruit,5,10,1.0,0,2.0,2024-01-01\n\
         B1,Banana,Fruit,40,10,0.5,0,1.0,2024-01-05\n\
         A1,Apple,Fruit,20,10,1.0,50,10.0,2024-02-01\n\
         C1,Cherry,Fruit,2,15,3.0,1,4.0,2024-02-03\n",
    )
    .unwrap();
    fs::write(
        dir.join("customers.csv"),
        "name,age,gender,average_spend,city,date\n\
         Ana,30,Female,100,Lisbon,2024-02-02\n\
         Bo,50,Male,300,Porto,2024-02-03\n\
         Cy,40,female,200,Lisbon,2024-01-09\n",
    )
    .unwrap();
    fs::write(
        dir.join("hr.csv"),
        "name,department,salary,hire_date\nDee,Ops,3000,2024-02-01\nEd,Sales,2000,2023-05-01\n",
    )
    .unwrap();
    fs::write(
        dir.join("suppliers.csv"),
        "supplier,rating,registration_date\n\
         Acme,4.5,2024-02-01\n\
         Bolt,2.0,2024-02-02\n\
         Core,4.5,2024-02-03\n",
    )
    .unwrap();
}

fn february() -> Period {
    Period::parse("2024-02-01", "2024-02-29").unwrap()
}

#[test]
fn full_report_from_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let source = CsvTableSource::new(dir.path());
    let report = build_report(&source, february(), &AnalysisSettings::default());

    let fin = report.finance.as_ref().unwrap();
    assert_eq!((fin.revenue, fin.expense, fin.profit), (1000.0, 1200.0, -200.0));
    assert_eq!(fin.revenue_change, Some(0.25));
    assert_eq!(fin.expense_change, Some(2.0));

    let inv = report.inventory.as_ref().unwrap();
    assert_eq!(inv.unique_product_count, 2);
    assert_eq!(inv.low_stock_count, 1);

    // Apple's latest snapshot (20 on hand) is above its minimum.
    let low: Vec<&str> =
        report.distributions.low_stock.iter().map(|i| i.product.as_str()).collect();
    assert_eq!(low, vec!["Cherry"]);

    // Banana never sold in February but still ranks among the least sellers.
    assert_eq!(report.distributions.least_selling.keys(), vec!["Banana", "Cherry", "Apple"]);
    assert_eq!(report.distributions.least_selling.get("Banana"), Some(0.0));
    assert_eq!(report.distributions.top_selling.keys(), vec!["Apple", "Cherry"]);

    assert_eq!(report.distributions.expenses_by_category.keys(), vec!["Payroll", "Rent"]);
    assert_eq!(report.distributions.suppliers.top.keys(), vec!["Acme", "Core", "Bolt"]);
    assert_eq!(report.distributions.suppliers.bottom.keys(), vec!["Bolt", "Acme", "Core"]);

    let cust = report.customers.as_ref().unwrap();
    assert_eq!(cust.total_clients, 2);
    assert_eq!(cust.pct_female, Some(50.0));
    assert_eq!(cust.total_clients_change, Some(1.0));

    assert_eq!(report.hr.as_ref().unwrap().total_employees, 1);
    assert_eq!(report.hr.as_ref().unwrap().total_employees_change, None);

    let kinds: Vec<AlertKind> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::LowStock,
            AlertKind::NegativeProfit,
            AlertKind::HighExpenses,
            AlertKind::LowRevenue
        ]
    );
    assert_eq!(report.alerts[1].severity, Severity::Danger);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn report_serializes_without_nan() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("customers.csv"), "name,age,date\n").unwrap();
    let source = CsvTableSource::new(dir.path());
    let report = build_report(&source, february(), &AnalysisSettings::default());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["customers"]["avg_age"].is_null());
    assert!(json["finance"].is_null());
    assert_eq!(report.warnings.len(), 5);
}

#[test]
fn export_writes_summary_and_series() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let out = dir.path().join("out");
    let source = CsvTableSource::new(dir.path());
    let report = build_report(&source, february(), &AnalysisSettings::default());
    let written = export_report(&report, &out).unwrap();
    assert!(written.iter().any(|p| p.ends_with("summary.json")));
    let alerts = fs::read_to_string(out.join("alerts.csv")).unwrap();
    assert!(alerts.contains("Negative profit"));
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["finance"]["profit"], -200.0);
    assert_eq!(summary["previous_period"]["end"], "2024-01-31");
}

#[test]
fn every_calculator_is_safe_on_empty_input() {
    let empty = TabularDataset::default();
    let labels = FinanceLabels::default();
    let f = finance::compute_summary(Some(&empty), None, &labels);
    assert_eq!((f.revenue, f.expense, f.profit), (0.0, 0.0, 0.0));
    assert_eq!((f.revenue_change, f.expense_change, f.profit_change), (None, None, None));

    let i = inventory::compute_summary(Some(&empty), None);
    assert_eq!((i.unique_product_count, i.total_value, i.low_stock_count), (0, 0.0, 0));
    assert_eq!(i.total_value_change, None);

    let c = customers::compute_summary(Some(&empty), None);
    assert_eq!(c.total_clients, 0);
    assert_eq!((c.avg_age, c.avg_spend, c.pct_female), (None, None, None));

    let h = hr::compute_summary(None, None);
    assert_eq!((h.total_employees, h.total_monthly_cost), (0, 0.0));

    let s = suppliers::compute_summary(Some(&empty), Some(&empty));
    assert_eq!((s.total_suppliers, s.avg_rating, s.avg_rating_change), (0, None, None));
}

#[test]
fn scenario_percent_changes() {
    assert_eq!(percent_change(Some(150.0), Some(100.0)), Some(0.5));
    assert_eq!(percent_change(Some(50.0), Some(0.0)), None);
}

#[test]
fn unknown_table_names_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = CsvTableSource::new(dir.path());
    assert!(load_by_name(&source, "warehouse", None).unwrap().is_empty());
    assert!(source.load(TableName::Finance, None).is_err());
}
