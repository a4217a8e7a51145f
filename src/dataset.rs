use crate::util::{parse_date_safe, parse_f64_safe};
use chrono::NaiveDate;

/// An in-memory table snapshot: named columns over rows of optional text
/// cells.
///
/// Column presence is never guaranteed, so every accessor that takes a column
/// name returns `None` when the column is absent. Cells are coerced lazily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl TabularDataset {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|c| c.into().trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a dataset from string literals; blank cells become missing.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut ds = Self::new(columns.iter().copied());
        for row in rows {
            ds.push_row(row.iter().map(|c| Some(c.to_string())));
        }
        ds
    }

    /// Append a row. Short rows are padded with missing cells, long rows are
    /// cut to the column count, blank cells are stored as missing.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut row: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| c.filter(|s| !s.trim().is_empty()))
            .take(self.columns.len())
            .collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Names from `required` that this dataset does not carry.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// Raw cell text for one column, row by row.
    pub fn text(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }

    /// Numeric view of one column; unparseable cells are `None`.
    pub fn numbers(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|r| parse_f64_safe(r[idx].as_deref()))
                .collect(),
        )
    }

    /// Date view of one column; unparseable cells are `None`.
    pub fn dates(&self, column: &str) -> Option<Vec<Option<NaiveDate>>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|r| parse_date_safe(r[idx].as_deref()))
                .collect(),
        )
    }

    /// Sum of a numeric column, unparseable cells counting as zero. `None`
    /// when the column is absent.
    pub fn sum(&self, column: &str) -> Option<f64> {
        self.numbers(column)
            .map(|vals| vals.into_iter().map(|v| v.unwrap_or(0.0)).sum())
    }

    /// Parseable values of a numeric column, for means and counts.
    pub fn present_numbers(&self, column: &str) -> Option<Vec<f64>> {
        self.numbers(column)
            .map(|vals| vals.into_iter().flatten().collect())
    }

    /// Keep the rows whose index satisfies `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, r)| r.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TabularDataset {
        TabularDataset::from_rows(
            &["product", "quantity", "date"],
            &[
                &["Apple", "5", "2024-01-01"],
                &["Pear", "n/a", "not a date"],
                &["Plum", "", "2024-01-03"],
            ],
        )
    }

    #[test]
    fn absent_columns_yield_none() {
        let ds = sample();
        assert!(ds.numbers("price").is_none());
        assert!(ds.sum("price").is_none());
        assert_eq!(ds.missing_columns(&["product", "price"]), vec!["price"]);
    }

    #[test]
    fn sums_treat_unparseable_as_zero_and_means_skip_them() {
        let ds = sample();
        assert_eq!(ds.sum("quantity"), Some(5.0));
        assert_eq!(ds.present_numbers("quantity"), Some(vec![5.0]));
    }

    #[test]
    fn blank_cells_are_missing() {
        let ds = sample();
        assert_eq!(ds.text("quantity").unwrap()[2], None);
    }

    #[test]
    fn ragged_rows_are_normalised() {
        let mut ds = TabularDataset::new(["a", "b"]);
        ds.push_row(vec![Some("1".to_string())]);
        ds.push_row(vec![Some("1".into()), Some("2".into()), Some("3".into())]);
        assert_eq!(ds.text("b").unwrap(), vec![None, Some("2")]);
    }

    #[test]
    fn filter_keeps_selected_rows() {
        let ds = sample();
        let dates = ds.dates("date").unwrap();
        let dated = ds.filter_rows(|i| dates[i].is_some());
        assert_eq!(dated.len(), 2);
        assert_eq!(dated.columns(), ds.columns());
    }
}
