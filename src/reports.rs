// Orchestration of one analytics run, plus the flattening of its results into
// printable rows.
//
// Each domain is loaded and summarised on its own; a failure in one is turned
// into a warning and never stops the others.
use crate::alerts::evaluate_alerts;
use crate::config::AnalysisSettings;
use crate::dataset::TabularDataset;
use crate::distribution;
use crate::error::Result;
use crate::loader::TableSource;
use crate::metrics::{
    customers, finance, hr, inventory, suppliers, Aggregate, CustomerSummary,
    FinanceSummary, HrSummary, InventorySummary, SupplierSummary,
};
use crate::period::Period;
use crate::types::{
    AlertRecord, AlertRow, DistributionSeries, LowStockItem, LowStockRow, MetricRow, SeriesRow,
    SupplierRanking, TableName,
};
use crate::util::{format_change, format_int, format_number, format_optional};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distributions {
    pub expenses_by_category: DistributionSeries,
    pub revenue_by_category: DistributionSeries,
    pub low_stock: Vec<LowStockItem>,
    pub inventory_value_by_category: DistributionSeries,
    pub top_selling: DistributionSeries,
    pub least_selling: DistributionSeries,
    pub suppliers: SupplierRanking,
    pub customers_by_city: DistributionSeries,
    pub employees_by_department: DistributionSeries,
    pub payroll_by_department: DistributionSeries,
}

/// Everything computed for one period. Summaries are `None` when their table
/// could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub period: Period,
    pub previous_period: Period,
    pub finance: Option<FinanceSummary>,
    pub inventory: Option<InventorySummary>,
    pub customers: Option<CustomerSummary>,
    pub hr: Option<HrSummary>,
    pub suppliers: Option<SupplierSummary>,
    pub distributions: Distributions,
    pub alerts: Vec<AlertRecord>,
    pub warnings: Vec<String>,
}

/// Current and previous window of one table.
struct Windows {
    current: TabularDataset,
    previous: TabularDataset,
}

struct Run<'a, S: TableSource + ?Sized> {
    source: &'a S,
    period: Period,
    previous: Period,
    warnings: Vec<String>,
}

impl<'a, S: TableSource + ?Sized> Run<'a, S> {
    fn warn(&mut self, table: TableName, message: String) {
        warn!(%table, "{}", message);
        self.warnings.push(format!("{table}: {message}"));
    }

    fn windows(&mut self, table: TableName) -> Option<Windows> {
        let loaded = self.source.load(table, Some(&self.period)).and_then(|current| {
            let previous = self.source.load(table, Some(&self.previous))?;
            Ok(Windows { current, previous })
        });
        match loaded {
            Ok(w) => Some(w),
            Err(e) => {
                self.warn(table, e.to_string());
                None
            }
        }
    }

    fn unfiltered(&mut self, table: TableName) -> Option<TabularDataset> {
        match self.source.load(table, None) {
            Ok(ds) => Some(ds),
            Err(e) => {
                self.warn(table, e.to_string());
                None
            }
        }
    }

    /// Record why the current window could not be aggregated, if it could not.
    fn note<T>(&mut self, table: TableName, aggregate: &Aggregate<T>) {
        if let Some(why) = aggregate.insufficiency() {
            self.warn(table, format!("insufficient data for the period ({why})"));
        }
    }
}

/// Run the full pipeline for `period` against `source`.
#[instrument(skip(source, settings), fields(start = %period.start, end = %period.end))]
pub fn build_report<S: TableSource + ?Sized>(
    source: &S,
    period: Period,
    settings: &AnalysisSettings,
) -> Report {
    let mut run = Run {
        source,
        period,
        previous: period.previous(),
        warnings: Vec::new(),
    };
    let labels = settings.finance_labels();
    let top_n = Some(settings.top_n);
    let mut dists = Distributions::default();

    let finance_summary = run.windows(TableName::Finance).map(|w| {
        run.note(TableName::Finance, &finance::aggregate(Some(&w.current), &labels));
        dists.expenses_by_category = distribution::expenses_by_category(&w.current, &labels, top_n);
        dists.revenue_by_category = distribution::revenue_by_category(&w.current, &labels, top_n);
        finance::compute_summary(Some(&w.current), Some(&w.previous), &labels)
    });

    let inventory_windows = run.windows(TableName::Inventory);
    let inventory_summary = inventory_windows.as_ref().map(|w| {
        run.note(TableName::Inventory, &inventory::aggregate(Some(&w.current)));
        dists.low_stock = distribution::low_stock_items(&w.current, None);
        dists.inventory_value_by_category =
            distribution::inventory_value_by_category(&w.current, top_n);
        dists.top_selling = distribution::top_selling(&w.current, top_n);
        inventory::compute_summary(Some(&w.current), Some(&w.previous))
    });
    // Least sellers are ranked across the whole catalogue, not just products
    // that moved in the period.
    if let Some(w) = &inventory_windows {
        if let Some(all_products) = run.unfiltered(TableName::Inventory) {
            dists.least_selling = distribution::least_selling(&all_products, &w.current, top_n);
        }
    }

    let customer_summary = run.windows(TableName::Customers).map(|w| {
        run.note(TableName::Customers, &customers::aggregate(Some(&w.current)));
        dists.customers_by_city = distribution::customers_by_city(&w.current, top_n);
        customers::compute_summary(Some(&w.current), Some(&w.previous))
    });

    let hr_summary = run.windows(TableName::Hr).map(|w| {
        run.note(TableName::Hr, &hr::aggregate(Some(&w.current)));
        dists.employees_by_department = distribution::employees_by_department(&w.current);
        dists.payroll_by_department = distribution::payroll_by_department(&w.current);
        hr::compute_summary(Some(&w.current), Some(&w.previous))
    });

    let supplier_summary = run.windows(TableName::Suppliers).map(|w| {
        run.note(TableName::Suppliers, &suppliers::aggregate(Some(&w.current)));
        dists.suppliers = distribution::supplier_ranking(&w.current, settings.top_n);
        suppliers::compute_summary(Some(&w.current), Some(&w.previous))
    });

    let alerts = evaluate_alerts(
        inventory_summary.as_ref(),
        &dists.low_stock,
        finance_summary.as_ref(),
        settings.low_stock_alert_limit,
    );

    info!(
        alerts = alerts.len(),
        warnings = run.warnings.len(),
        "report built"
    );

    Report {
        period,
        previous_period: run.previous,
        finance: finance_summary,
        inventory: inventory_summary,
        customers: customer_summary,
        hr: hr_summary,
        suppliers: supplier_summary,
        distributions: dists,
        alerts,
        warnings: run.warnings,
    }
}

/// Per-domain summaries of one period without the distributions and alerts.
pub fn build_summary<S: TableSource + ?Sized>(
    source: &S,
    table: TableName,
    period: Period,
    settings: &AnalysisSettings,
) -> Result<Vec<MetricRow>> {
    let current = source.load(table, Some(&period))?;
    let previous = source.load(table, Some(&period.previous()))?;
    let (cur, prev) = (Some(&current), Some(&previous));
    let rows = match table {
        TableName::Finance => {
            finance_rows(&finance::compute_summary(cur, prev, &settings.finance_labels()))
        }
        TableName::Inventory => inventory_rows(&inventory::compute_summary(cur, prev)),
        TableName::Customers => customer_rows(&customers::compute_summary(cur, prev)),
        TableName::Hr => hr_rows(&hr::compute_summary(cur, prev)),
        TableName::Suppliers => supplier_rows(&suppliers::compute_summary(cur, prev)),
    };
    Ok(rows)
}

fn metric(domain: TableName, name: &str, current: String, change: Option<f64>) -> MetricRow {
    MetricRow {
        domain: domain.to_string(),
        metric: name.to_string(),
        current,
        change: format_change(change),
    }
}

pub fn finance_rows(s: &FinanceSummary) -> Vec<MetricRow> {
    let d = TableName::Finance;
    vec![
        metric(d, "revenue", format_number(s.revenue, 2), s.revenue_change),
        metric(d, "expense", format_number(s.expense, 2), s.expense_change),
        metric(d, "profit", format_number(s.profit, 2), s.profit_change),
    ]
}

pub fn inventory_rows(s: &InventorySummary) -> Vec<MetricRow> {
    let d = TableName::Inventory;
    vec![
        metric(
            d,
            "unique_product_count",
            format_int(s.unique_product_count),
            s.unique_product_count_change,
        ),
        metric(d, "total_value", format_number(s.total_value, 2), s.total_value_change),
        metric(d, "low_stock_count", format_int(s.low_stock_count), s.low_stock_count_change),
    ]
}

pub fn customer_rows(s: &CustomerSummary) -> Vec<MetricRow> {
    let d = TableName::Customers;
    vec![
        metric(d, "total_clients", format_int(s.total_clients), s.total_clients_change),
        metric(d, "avg_age", format_optional(s.avg_age, 1), s.avg_age_change),
        metric(d, "avg_spend", format_optional(s.avg_spend, 2), s.avg_spend_change),
        metric(d, "pct_female", format_optional(s.pct_female, 1), s.pct_female_change),
    ]
}

pub fn hr_rows(s: &HrSummary) -> Vec<MetricRow> {
    let d = TableName::Hr;
    vec![
        metric(d, "total_employees", format_int(s.total_employees), s.total_employees_change),
        metric(
            d,
            "total_monthly_cost",
            format_number(s.total_monthly_cost, 2),
            s.total_monthly_cost_change,
        ),
    ]
}

pub fn supplier_rows(s: &SupplierSummary) -> Vec<MetricRow> {
    let d = TableName::Suppliers;
    vec![
        metric(d, "total_suppliers", format_int(s.total_suppliers), s.total_suppliers_change),
        metric(d, "avg_rating", format_optional(s.avg_rating, 2), s.avg_rating_change),
    ]
}

/// All available summaries of a report as one table.
pub fn metric_rows(report: &Report) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    if let Some(s) = &report.finance {
        rows.extend(finance_rows(s));
    }
    if let Some(s) = &report.inventory {
        rows.extend(inventory_rows(s));
    }
    if let Some(s) = &report.customers {
        rows.extend(customer_rows(s));
    }
    if let Some(s) = &report.hr {
        rows.extend(hr_rows(s));
    }
    if let Some(s) = &report.suppliers {
        rows.extend(supplier_rows(s));
    }
    rows
}

pub fn series_rows(series: &DistributionSeries) -> Vec<SeriesRow> {
    series
        .entries
        .iter()
        .enumerate()
        .map(|(idx, e)| SeriesRow {
            rank: idx + 1,
            key: e.key.clone(),
            value: format_number(e.value, 2),
        })
        .collect()
}

pub fn low_stock_rows(items: &[LowStockItem]) -> Vec<LowStockRow> {
    items
        .iter()
        .map(|i| LowStockRow {
            product_id: i.product_id.clone(),
            product: i.product.clone(),
            quantity: format_number(i.quantity, 0),
            minimum_level: format_number(i.minimum_level, 0),
            gap: format_number(i.gap, 0),
        })
        .collect()
}

pub fn alert_rows(alerts: &[AlertRecord]) -> Vec<AlertRow> {
    alerts
        .iter()
        .map(|a| AlertRow {
            severity: serde_plain(&a.severity),
            title: a.title.clone(),
            message: a.message.clone(),
            dashboard: serde_plain(&a.dashboard),
        })
        .collect()
}

/// Render a unit enum the way it serializes (`"warning"`, `"finance"`).
fn serde_plain<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Named series of a report, for export.
pub fn named_series(report: &Report) -> Vec<(&'static str, &DistributionSeries)> {
    let d = &report.distributions;
    vec![
        ("expenses_by_category", &d.expenses_by_category),
        ("revenue_by_category", &d.revenue_by_category),
        ("inventory_value_by_category", &d.inventory_value_by_category),
        ("top_selling", &d.top_selling),
        ("least_selling", &d.least_selling),
        ("top_suppliers", &d.suppliers.top),
        ("bottom_suppliers", &d.suppliers.bottom),
        ("customers_by_city", &d.customers_by_city),
        ("employees_by_department", &d.employees_by_department),
        ("payroll_by_department", &d.payroll_by_department),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::loader::MemoryTableSource;
    use crate::types::{AlertKind, Severity};

    struct Failing;

    impl TableSource for Failing {
        fn load(&self, table: TableName, _: Option<&Period>) -> Result<TabularDataset> {
            Err(Error::unavailable(
                table,
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            ))
        }
    }

    fn period() -> Period {
        Period::parse("2024-02-01", "2024-02-29").unwrap()
    }

    #[test]
    fn failing_source_yields_warnings_not_panics() {
        let report = build_report(&Failing, period(), &AnalysisSettings::default());
        assert!(report.finance.is_none());
        assert!(report.hr.is_none());
        assert!(report.alerts.is_empty());
        assert_eq!(report.warnings.len(), 5);
        assert!(report.warnings[0].starts_with("Finance: table Finance is unavailable"));
    }

    #[test]
    fn one_missing_domain_does_not_block_the_rest() {
        let ledger = TabularDataset::from_rows(
            &["date", "type", "amount", "category"],
            &[
                &["2024-02-03", "Revenue", "1000", "Sales"],
                &["2024-02-04", "Expense", "1200", "Rent"],
            ],
        );
        let source = MemoryTableSource::new().with_table(TableName::Finance, ledger);
        let report = build_report(&source, period(), &AnalysisSettings::default());

        let fin = report.finance.as_ref().unwrap();
        assert_eq!(fin.profit, -200.0);
        assert_eq!(report.alerts[0].kind, AlertKind::NegativeProfit);
        assert_eq!(report.alerts[0].severity, Severity::Danger);
        assert_eq!(report.alerts[0].payload["profit"], -200.0);
        // Empty tables are reported, not fatal.
        assert!(report.warnings.iter().any(|w| w.starts_with("HR: insufficient data")));
        assert_eq!(report.hr, Some(HrSummary::default()));
        assert_eq!(report.previous_period, Period::parse("2024-01-03", "2024-01-31").unwrap());
    }

    #[test]
    fn low_stock_alerts_follow_the_configured_limit() {
        let stock = TabularDataset::from_rows(
            &["product_id", "product", "quantity", "minimum_level", "date"],
            &[
                &["A", "Apple", "1", "10", "2024-02-02"],
                &["B", "Banana", "2", "10", "2024-02-02"],
                &["C", "Cherry", "3", "10", "2024-02-02"],
            ],
        );
        let source = MemoryTableSource::new().with_table(TableName::Inventory, stock);
        let settings = AnalysisSettings {
            low_stock_alert_limit: 2,
            ..AnalysisSettings::default()
        };
        let report = build_report(&source, period(), &settings);

        assert_eq!(report.distributions.low_stock.len(), 3);
        let stock_alerts: Vec<&str> = report
            .alerts
            .iter()
            .filter(|a| a.kind == AlertKind::LowStock)
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(stock_alerts, vec!["Low stock: Apple", "Low stock: Banana"]);
    }

    #[test]
    fn summary_rows_cover_each_metric() {
        let source = MemoryTableSource::new();
        let settings = AnalysisSettings::default();
        let rows = build_summary(&source, TableName::Customers, period(), &settings).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].current, "-");
        assert_eq!(rows[0].change, "-");
    }

    #[test]
    fn alert_rows_use_serialized_names() {
        let rows = alert_rows(&crate::alerts::finance_alerts(&FinanceSummary {
            revenue: 10.0,
            expense: 20.0,
            profit: -10.0,
            ..Default::default()
        }));
        assert_eq!(rows[0].severity, "danger");
        assert_eq!(rows[0].dashboard, "finance");
    }

    #[test]
    fn metric_rows_skip_unavailable_domains() {
        let report = build_report(&Failing, period(), &AnalysisSettings::default());
        assert!(metric_rows(&report).is_empty());
        assert_eq!(named_series(&report).len(), 10);
    }
}
