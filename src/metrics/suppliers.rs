use super::{check_dataset, percent_change, Aggregate};
use crate::dataset::TabularDataset;
use crate::util::mean;
use serde::Serialize;

pub const SUPPLIER_COLUMN: &str = "supplier";
pub const RATING_COLUMN: &str = "rating";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SupplierMetrics {
    pub total_suppliers: usize,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub total_suppliers: usize,
    pub avg_rating: Option<f64>,
    pub total_suppliers_change: Option<f64>,
    pub avg_rating_change: Option<f64>,
}

impl SupplierSummary {
    pub fn compare(current: &SupplierMetrics, previous: &SupplierMetrics) -> Self {
        Self {
            total_suppliers: current.total_suppliers,
            avg_rating: current.avg_rating,
            total_suppliers_change: percent_change(
                Some(current.total_suppliers as f64),
                Some(previous.total_suppliers as f64),
            ),
            avg_rating_change: percent_change(current.avg_rating, previous.avg_rating),
        }
    }
}

pub fn aggregate(dataset: Option<&TabularDataset>) -> Aggregate<SupplierMetrics> {
    match check_dataset(dataset, &[]) {
        Ok(ds) => Aggregate::Computed(SupplierMetrics {
            total_suppliers: ds.len(),
            avg_rating: ds.present_numbers(RATING_COLUMN).and_then(|v| mean(&v)),
        }),
        Err(why) => Aggregate::InsufficientData(why),
    }
}

pub fn compute_summary(
    current: Option<&TabularDataset>,
    previous: Option<&TabularDataset>,
) -> SupplierSummary {
    let now = aggregate(current).or_default();
    let before = aggregate(previous).or_default();
    SupplierSummary::compare(&now, &before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_parseable_ratings() {
        let now = TabularDataset::from_rows(
            &["supplier", "rating"],
            &[&["Acme", "4"], &["Bolt", "unrated"], &["Core", "5"]],
        );
        let before =
            TabularDataset::from_rows(&["supplier", "rating"], &[&["Acme", "3"], &["Bolt", "3"]]);
        let s = compute_summary(Some(&now), Some(&before));
        assert_eq!(s.total_suppliers, 3);
        assert_eq!(s.avg_rating, Some(4.5));
        assert_eq!(s.total_suppliers_change, Some(0.5));
        assert_eq!(s.avg_rating_change, Some(0.5));
    }

    #[test]
    fn empty_input_has_no_rating() {
        let s = compute_summary(None, None);
        assert_eq!(s, SupplierSummary::default());
    }
}
