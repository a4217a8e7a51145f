use crate::alerts::LOW_STOCK_ALERT_LIMIT;
use crate::metrics::FinanceLabels;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BIZLENS";
pub const DEFAULT_CONFIG_FILE: &str = "bizlens";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
}

/// Knobs for one analytics run.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Length of ranking series (top expenses, best sellers, ...).
    pub top_n: usize,
    /// Most low-stock products that raise an alert.
    pub low_stock_alert_limit: usize,
    pub revenue_label: String,
    pub expense_label: String,
}

impl AnalysisSettings {
    pub fn finance_labels(&self) -> FinanceLabels {
        FinanceLabels {
            revenue: self.revenue_label.clone(),
            expense: self.expense_label.clone(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let labels = FinanceLabels::default();
        Self {
            top_n: 10,
            low_stock_alert_limit: LOW_STOCK_ALERT_LIMIT,
            revenue_label: labels.revenue,
            expense_label: labels.expense,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    /// Layered load: built-in defaults, then `bizlens.toml` (or the explicit
    /// file), then `BIZLENS__SECTION__KEY` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = AnalysisSettings::default();
        let mut builder = Config::builder()
            .set_default("data_dir", "data")?
            .set_default("output_dir", "out")?
            .set_default("analysis.top_n", defaults.top_n as u64)?
            .set_default(
                "analysis.low_stock_alert_limit",
                defaults.low_stock_alert_limit as u64,
            )?
            .set_default("analysis.revenue_label", defaults.revenue_label)?
            .set_default("analysis.expense_label", defaults.expense_label)?
            .set_default("logging.level", "info")?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
