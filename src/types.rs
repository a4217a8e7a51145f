use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// The closed set of logical tables the analytics engine reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Finance,
    Inventory,
    Suppliers,
    Customers,
    Hr,
}

impl TableName {
    pub const ALL: [TableName; 5] = [
        TableName::Finance,
        TableName::Inventory,
        TableName::Suppliers,
        TableName::Customers,
        TableName::Hr,
    ];

    /// Column used to restrict a load to a period.
    pub fn date_column(&self) -> &'static str {
        match self {
            Self::Hr => "hire_date",
            Self::Suppliers => "registration_date",
            _ => "date",
        }
    }

    /// File stem used by file-backed sources (`finance.csv`, ...).
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Inventory => "inventory",
            Self::Suppliers => "suppliers",
            Self::Customers => "customers",
            Self::Hr => "hr",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Finance => "Finance",
            Self::Inventory => "Inventory",
            Self::Suppliers => "Suppliers",
            Self::Customers => "Customers",
            Self::Hr => "HR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table '{0}'")]
pub struct UnknownTable(pub String);

impl FromStr for TableName {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finance" => Ok(Self::Finance),
            "inventory" => Ok(Self::Inventory),
            "suppliers" => Ok(Self::Suppliers),
            "customers" | "public" => Ok(Self::Customers),
            "hr" => Ok(Self::Hr),
            other => Err(UnknownTable(other.to_string())),
        }
    }
}

/// One `(key, value)` entry of a distribution series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub key: String,
    pub value: f64,
}

/// Grouped values keyed by category, kept in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistributionSeries {
    pub entries: Vec<SeriesEntry>,
}

impl DistributionSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value)
    }

    /// Stable sort by value, then optional truncation.
    pub(crate) fn sorted(
        mut entries: Vec<SeriesEntry>,
        ascending: bool,
        top_n: Option<usize>,
    ) -> Self {
        entries.sort_by(|a, b| {
            let ord = a.value.total_cmp(&b.value);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        if let Some(n) = top_n {
            entries.truncate(n);
        }
        Self { entries }
    }
}

/// A product whose latest snapshot sits below its minimum level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub product_id: String,
    pub product: String,
    pub quantity: f64,
    pub minimum_level: f64,
    pub gap: f64,
}

/// Best and worst rated suppliers, kept as separate series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplierRanking {
    pub top: DistributionSeries,
    pub bottom: DistributionSeries,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    NegativeProfit,
    HighExpenses,
    LowRevenue,
}

/// Dashboard an alert links to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dashboard {
    Inventory,
    Finance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub payload: BTreeMap<&'static str, f64>,
    pub dashboard: Dashboard,
}

// Rendered rows for terminal previews and CSV export.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[serde(rename = "Domain")]
    #[tabled(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeriesRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LowStockRow {
    #[serde(rename = "ProductId")]
    #[tabled(rename = "ProductId")]
    pub product_id: String,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity")]
    #[tabled(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "MinimumLevel")]
    #[tabled(rename = "MinimumLevel")]
    pub minimum_level: String,
    #[serde(rename = "Gap")]
    #[tabled(rename = "Gap")]
    pub gap: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AlertRow {
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Message")]
    #[tabled(rename = "Message")]
    pub message: String,
    #[serde(rename = "Dashboard")]
    #[tabled(rename = "Dashboard")]
    pub dashboard: String,
}
