//! Per-domain summary calculators.
//!
//! Every domain follows the same shape: `aggregate` turns one dataset into
//! base metrics (or reports why it could not), and `compute_summary` compares
//! the current window against the previous one and attaches percent changes.
//! None of the calculators fail; degenerate input degrades to zero counts and
//! absent means.

pub mod customers;
pub mod finance;
pub mod hr;
pub mod inventory;
pub mod suppliers;

use crate::dataset::TabularDataset;
use serde::Serialize;
use std::fmt;

pub use customers::{CustomerMetrics, CustomerSummary};
pub use finance::{FinanceLabels, FinanceMetrics, FinanceSummary};
pub use hr::{HrMetrics, HrSummary};
pub use inventory::{InventoryMetrics, InventorySummary};
pub use suppliers::{SupplierMetrics, SupplierSummary};

/// Relative change from `previous` to `current`.
///
/// `None` when either side is missing or NaN, or when `previous` is zero.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current.filter(|v| !v.is_nan())?;
    let previous = previous.filter(|v| !v.is_nan() && *v != 0.0)?;
    Some((current - previous) / previous).filter(|v| v.is_finite())
}

/// Why a dataset could not be aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "columns", rename_all = "snake_case")]
pub enum InsufficientData {
    NoRows,
    MissingColumns(Vec<String>),
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => f.write_str("no rows"),
            Self::MissingColumns(cols) => write!(f, "missing columns: {}", cols.join(", ")),
        }
    }
}

/// Outcome of aggregating one dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate<T> {
    Computed(T),
    InsufficientData(InsufficientData),
}

impl<T: Default> Aggregate<T> {
    /// The computed metrics, or the domain's zero defaults.
    pub fn or_default(self) -> T {
        match self {
            Self::Computed(m) => m,
            Self::InsufficientData(_) => T::default(),
        }
    }
}

impl<T> Aggregate<T> {
    pub fn insufficiency(&self) -> Option<&InsufficientData> {
        match self {
            Self::Computed(_) => None,
            Self::InsufficientData(why) => Some(why),
        }
    }
}

/// Check the required-column contract once, ahead of any arithmetic.
pub(crate) fn check_dataset<'a>(
    dataset: Option<&'a TabularDataset>,
    required: &[&str],
) -> Result<&'a TabularDataset, InsufficientData> {
    let ds = match dataset {
        Some(ds) if !ds.is_empty() => ds,
        _ => return Err(InsufficientData::NoRows),
    };
    let missing = ds.missing_columns(required);
    if !missing.is_empty() {
        return Err(InsufficientData::MissingColumns(missing));
    }
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fifty_percent_increase() {
        assert_eq!(percent_change(Some(150.0), Some(100.0)), Some(0.5));
    }

    #[test]
    fn zero_previous_is_undefined() {
        assert_eq!(percent_change(Some(50.0), Some(0.0)), None);
    }

    #[test]
    fn missing_sides_are_undefined() {
        assert_eq!(percent_change(Some(1.0), None), None);
        assert_eq!(percent_change(Some(1.0), Some(f64::NAN)), None);
        assert_eq!(percent_change(None, Some(4.0)), None);
        assert_eq!(percent_change(Some(f64::NAN), Some(4.0)), None);
    }

    #[test]
    fn decrease_is_negative() {
        assert_eq!(percent_change(Some(75.0), Some(100.0)), Some(-0.25));
        assert_eq!(percent_change(Some(-50.0), Some(-100.0)), Some(-0.5));
    }

    #[test]
    fn contract_check_reports_reason() {
        assert_eq!(check_dataset(None, &[]).unwrap_err(), InsufficientData::NoRows);
        let ds = TabularDataset::from_rows(&["a"], &[&["1"]]);
        assert_eq!(
            check_dataset(Some(&ds), &["a", "b"]).unwrap_err(),
            InsufficientData::MissingColumns(vec!["b".into()])
        );
        assert!(check_dataset(Some(&ds), &["a"]).is_ok());
    }

    proptest! {
        #[test]
        fn change_matches_formula_for_nonzero_previous(
            current in -1.0e9f64..1.0e9,
            previous in prop_oneof![-1.0e9f64..-1.0e-6, 1.0e-6f64..1.0e9],
        ) {
            prop_assert_eq!(
                percent_change(Some(current), Some(previous)),
                Some((current - previous) / previous)
            );
        }

        #[test]
        fn change_is_undefined_for_zero_previous(current in proptest::num::f64::ANY) {
            prop_assert_eq!(percent_change(Some(current), Some(0.0)), None);
            prop_assert_eq!(percent_change(Some(current), None), None);
            prop_assert_eq!(percent_change(Some(current), Some(f64::NAN)), None);
        }
    }
}
