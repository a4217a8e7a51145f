use crate::dataset::TabularDataset;
use crate::error::{Error, Result};
use crate::period::Period;
use crate::types::TableName;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where tables come from. Implementations do the I/O; the analytics core
/// only sees the resulting datasets.
pub trait TableSource {
    /// Load `table`, restricted to `period` on the table's date column when
    /// given, or in full when `None`.
    fn load(&self, table: TableName, period: Option<&Period>) -> Result<TabularDataset>;
}

/// Load by logical name. Unknown names yield an empty dataset.
pub fn load_by_name<S: TableSource + ?Sized>(
    source: &S,
    name: &str,
    period: Option<&Period>,
) -> Result<TabularDataset> {
    match name.parse::<TableName>() {
        Ok(table) => source.load(table, period),
        Err(unknown) => {
            warn!(%unknown, "returning empty dataset");
            Ok(TabularDataset::default())
        }
    }
}

/// Keep the rows whose date column falls inside `period`. Rows with an
/// unparseable date are dropped.
pub fn restrict_to_period(
    dataset: TabularDataset,
    table: TableName,
    period: Option<&Period>,
) -> Result<TabularDataset> {
    let Some(period) = period else {
        return Ok(dataset);
    };
    let column = table.date_column();
    let Some(dates) = dataset.dates(column) else {
        if dataset.columns().is_empty() {
            return Ok(dataset);
        }
        return Err(Error::MissingDateColumn { table, column });
    };
    Ok(dataset.filter_rows(|i| dates[i].is_some_and(|d| period.contains(d))))
}

/// One CSV file per table inside a directory (`finance.csv`, `hr.csv`, ...).
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    dir: PathBuf,
}

impl CsvTableSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: TableName) -> PathBuf {
        self.dir.join(format!("{}.csv", table.file_stem()))
    }
}

impl TableSource for CsvTableSource {
    fn load(&self, table: TableName, period: Option<&Period>) -> Result<TabularDataset> {
        let path = self.path_for(table);
        let full = read_csv(&path).map_err(|e| Error::unavailable(table, e))?;
        let total = full.len();
        let ds = restrict_to_period(full, table, period)?;
        debug!(%table, path = %path.display(), total, kept = ds.len(), "loaded table");
        Ok(ds)
    }
}

/// Read a whole CSV file; headers become column names.
pub fn read_csv(path: &Path) -> Result<TabularDataset> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?;
    let mut ds = TabularDataset::new(rdr.headers()?.iter());
    let mut skipped = 0usize;
    for result in rdr.records() {
        match result {
            Ok(record) => ds.push_row(record.iter().map(|c| Some(c.to_string()))),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped unreadable CSV records");
    }
    Ok(ds)
}

/// Tables held in memory, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    tables: HashMap<TableName, TabularDataset>,
}

impl MemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableName, dataset: TabularDataset) -> Self {
        self.tables.insert(table, dataset);
        self
    }
}

impl TableSource for MemoryTableSource {
    fn load(&self, table: TableName, period: Option<&Period>) -> Result<TabularDataset> {
        let ds = self.tables.get(&table).cloned().unwrap_or_default();
        restrict_to_period(ds, table, period)
    }
}
