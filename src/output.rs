use crate::error::Result;
use crate::reports::{alert_rows, low_stock_rows, metric_rows, named_series, series_rows, Report};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Print a titled markdown table, at most `max_rows` rows.
pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    println!("{}\n", render_table(&slice));
}

/// Print the whole report to the terminal.
pub fn print_report(report: &Report, max_rows: usize) {
    println!(
        "Period {} .. {} (compared with {} .. {})\n",
        report.period.start,
        report.period.end,
        report.previous_period.start,
        report.previous_period.end
    );
    preview_table("Summary", &metric_rows(report), usize::MAX);
    preview_table("Low stock", &low_stock_rows(&report.distributions.low_stock), max_rows);
    for (name, series) in named_series(report) {
        preview_table(name, &series_rows(series), max_rows);
    }
    preview_table("Alerts", &alert_rows(&report.alerts), usize::MAX);
    if !report.warnings.is_empty() {
        println!("Warnings:");
        for w in &report.warnings {
            println!("- {}", w);
        }
        println!();
    }
}

/// Write `summary.json`, one CSV per series, `low_stock.csv` and `alerts.csv`
/// into `dir`. Returns the written paths.
pub fn export_report(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let summary = dir.join("summary.json");
    write_json(&summary, report)?;
    written.push(summary);

    let metrics = dir.join("metrics.csv");
    write_csv(&metrics, &metric_rows(report))?;
    written.push(metrics);

    for (name, series) in named_series(report) {
        let path = dir.join(format!("{name}.csv"));
        write_csv(&path, &series_rows(series))?;
        written.push(path);
    }

    let low_stock = dir.join("low_stock.csv");
    write_csv(&low_stock, &low_stock_rows(&report.distributions.low_stock))?;
    written.push(low_stock);

    let alerts = dir.join("alerts.csv");
    write_csv(&alerts, &alert_rows(&report.alerts))?;
    written.push(alerts);

    info!(dir = %dir.display(), files = written.len(), "report exported");
    Ok(written)
}
