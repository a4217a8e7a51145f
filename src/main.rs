// Command-line front end.
//
// Every subcommand resolves a period, builds what it needs from the CSV data
// directory, and prints markdown tables (or JSON with `--json`).
use anyhow::{Context, Result};
use bizlens::config::Settings;
use bizlens::distribution;
use bizlens::output::{export_report, preview_table, print_report};
use bizlens::reports::{alert_rows, build_summary, low_stock_rows, series_rows};
use bizlens::types::DistributionSeries;
use bizlens::{build_report, CsvTableSource, Period, TableName, TableSource};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bizlens", version, about = "Period-over-period business analytics")]
struct Cli {
    /// Directory holding finance.csv, inventory.csv, suppliers.csv, customers.csv and hr.csv.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./bizlens.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct PeriodArgs {
    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    start: String,
    /// Last day of the period (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: String,
}

impl PeriodArgs {
    fn resolve(&self) -> Result<Period> {
        Period::parse(&self.start, &self.end).context("invalid period")
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every summary, distribution and alert for a period.
    Overview(PeriodArgs),
    /// Metrics of one domain against the previous period.
    Summary {
        #[arg(value_enum)]
        domain: Domain,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// One ranking series.
    Distribution {
        #[arg(value_enum)]
        kind: SeriesKind,
        #[command(flatten)]
        period: PeriodArgs,
        /// Series length (defaults to analysis.top_n).
        #[arg(long)]
        top: Option<usize>,
    },
    /// Alerts raised for a period.
    Alerts(PeriodArgs),
    /// The period immediately before the given one.
    PreviousPeriod(PeriodArgs),
    /// Write summary.json and CSV files for a period.
    Export {
        #[command(flatten)]
        period: PeriodArgs,
        /// Output directory (defaults to output_dir).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Domain {
    Finance,
    Inventory,
    Suppliers,
    Customers,
    Hr,
}

impl From<Domain> for TableName {
    fn from(d: Domain) -> Self {
        match d {
            Domain::Finance => TableName::Finance,
            Domain::Inventory => TableName::Inventory,
            Domain::Suppliers => TableName::Suppliers,
            Domain::Customers => TableName::Customers,
            Domain::Hr => TableName::Hr,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SeriesKind {
    Expenses,
    Revenue,
    InventoryValue,
    LowStock,
    TopSelling,
    LeastSelling,
    TopSuppliers,
    BottomSuppliers,
    CustomersByCity,
    EmployeesByDepartment,
    PayrollByDepartment,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    init_tracing(&settings.logging.level);
    info!(data_dir = %settings.data_dir.display(), "starting");

    let source = CsvTableSource::new(&settings.data_dir);
    let analysis = &settings.analysis;

    match &cli.command {
        Command::Overview(args) => {
            let report = build_report(&source, args.resolve()?, analysis);
            if cli.json {
                print_json(&report)?;
            } else {
                print_report(&report, analysis.top_n);
            }
        }
        Command::Summary { domain, period } => {
            let table = TableName::from(*domain);
            let rows = build_summary(&source, table, period.resolve()?, analysis)
                .with_context(|| format!("cannot summarise {table}"))?;
            if cli.json {
                print_json(&rows)?;
            } else {
                preview_table(&format!("{table} summary"), &rows, usize::MAX);
            }
        }
        Command::Distribution { kind, period, top } => {
            let period = period.resolve()?;
            let limit = top.unwrap_or(analysis.top_n);
            let top_n = Some(limit);
            let labels = analysis.finance_labels();
            let load = |table: TableName| {
                source
                    .load(table, Some(&period))
                    .with_context(|| format!("cannot load {table}"))
            };
            let series: DistributionSeries = match kind {
                SeriesKind::Expenses => {
                    distribution::expenses_by_category(&load(TableName::Finance)?, &labels, top_n)
                }
                SeriesKind::Revenue => {
                    distribution::revenue_by_category(&load(TableName::Finance)?, &labels, top_n)
                }
                SeriesKind::InventoryValue => {
                    distribution::inventory_value_by_category(&load(TableName::Inventory)?, top_n)
                }
                SeriesKind::LowStock => {
                    let items = distribution::low_stock_items(&load(TableName::Inventory)?, top_n);
                    if cli.json {
                        print_json(&items)?;
                    } else {
                        preview_table("Low stock", &low_stock_rows(&items), usize::MAX);
                    }
                    return Ok(());
                }
                SeriesKind::TopSelling => {
                    distribution::top_selling(&load(TableName::Inventory)?, top_n)
                }
                SeriesKind::LeastSelling => {
                    let all = source
                        .load(TableName::Inventory, None)
                        .context("cannot load Inventory")?;
                    distribution::least_selling(&all, &load(TableName::Inventory)?, top_n)
                }
                SeriesKind::TopSuppliers | SeriesKind::BottomSuppliers => {
                    let suppliers = load(TableName::Suppliers)?;
                    let ranking = distribution::supplier_ranking(&suppliers, limit);
                    if matches!(kind, SeriesKind::TopSuppliers) {
                        ranking.top
                    } else {
                        ranking.bottom
                    }
                }
                SeriesKind::CustomersByCity => {
                    distribution::customers_by_city(&load(TableName::Customers)?, top_n)
                }
                SeriesKind::EmployeesByDepartment => {
                    distribution::employees_by_department(&load(TableName::Hr)?)
                }
                SeriesKind::PayrollByDepartment => {
                    distribution::payroll_by_department(&load(TableName::Hr)?)
                }
            };
            if cli.json {
                print_json(&series)?;
            } else {
                preview_table(&format!("{kind:?}"), &series_rows(&series), usize::MAX);
            }
        }
        Command::Alerts(args) => {
            let report = build_report(&source, args.resolve()?, analysis);
            if cli.json {
                print_json(&report.alerts)?;
            } else {
                preview_table("Alerts", &alert_rows(&report.alerts), usize::MAX);
            }
            for w in &report.warnings {
                eprintln!("warning: {}", w);
            }
        }
        Command::PreviousPeriod(args) => {
            let period = args.resolve()?;
            let previous = period.previous();
            if cli.json {
                print_json(&previous)?;
            } else {
                println!("{} .. {}", previous.start, previous.end);
            }
        }
        Command::Export { period, out } => {
            let report = build_report(&source, period.resolve()?, analysis);
            let dir = out.clone().unwrap_or_else(|| settings.output_dir.clone());
            let written = export_report(&report, &dir)
                .with_context(|| format!("cannot export to {}", dir.display()))?;
            println!("Outputs saved to {} files in {}", written.len(), dir.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_report_series_has_a_distribution_kind() {
        for name in [
            "expenses",
            "revenue",
            "inventory-value",
            "low-stock",
            "top-selling",
            "least-selling",
            "top-suppliers",
            "bottom-suppliers",
            "customers-by-city",
            "employees-by-department",
            "payroll-by-department",
        ] {
            assert!(SeriesKind::from_str(name, false).is_ok(), "{name}");
        }
    }

    #[test]
    fn distribution_top_is_optional() {
        let cli = Cli::try_parse_from([
            "bizlens",
            "distribution",
            "payroll-by-department",
            "--start",
            "2024-02-01",
            "--end",
            "2024-02-29",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Distribution { kind: SeriesKind::PayrollByDepartment, top: None, .. }
        ));
    }
}
