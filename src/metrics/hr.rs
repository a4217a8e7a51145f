use super::{check_dataset, percent_change, Aggregate};
use crate::dataset::TabularDataset;
use serde::Serialize;

pub const SALARY_COLUMN: &str = "salary";
pub const DEPARTMENT_COLUMN: &str = "department";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HrMetrics {
    pub total_employees: usize,
    pub total_monthly_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HrSummary {
    pub total_employees: usize,
    pub total_monthly_cost: f64,
    pub total_employees_change: Option<f64>,
    pub total_monthly_cost_change: Option<f64>,
}

impl HrSummary {
    pub fn compare(current: &HrMetrics, previous: &HrMetrics) -> Self {
        Self {
            total_employees: current.total_employees,
            total_monthly_cost: current.total_monthly_cost,
            total_employees_change: percent_change(
                Some(current.total_employees as f64),
                Some(previous.total_employees as f64),
            ),
            total_monthly_cost_change: percent_change(
                Some(current.total_monthly_cost),
                Some(previous.total_monthly_cost),
            ),
        }
    }
}

pub fn aggregate(dataset: Option<&TabularDataset>) -> Aggregate<HrMetrics> {
    match check_dataset(dataset, &[]) {
        Ok(ds) => Aggregate::Computed(HrMetrics {
            total_employees: ds.len(),
            total_monthly_cost: ds.sum(SALARY_COLUMN).unwrap_or(0.0),
        }),
        Err(why) => Aggregate::InsufficientData(why),
    }
}

pub fn compute_summary(
    current: Option<&TabularDataset>,
    previous: Option<&TabularDataset>,
) -> HrSummary {
    let now = aggregate(current).or_default();
    let before = aggregate(previous).or_default();
    HrSummary::compare(&now, &before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_salaries_skipping_garbage() {
        let ds = TabularDataset::from_rows(
            &["name", "department", "salary"],
            &[&["A", "Ops", "3,000"], &["B", "Ops", "pending"], &["C", "Sales", "2000"]],
        );
        let s = compute_summary(Some(&ds), None);
        assert_eq!(s.total_employees, 3);
        assert_eq!(s.total_monthly_cost, 5000.0);
        assert_eq!(s.total_employees_change, None);
    }

    #[test]
    fn headcount_change() {
        let now = TabularDataset::from_rows(&["salary"], &[&["1"], &["1"], &["1"]]);
        let before = TabularDataset::from_rows(&["salary"], &[&["1"], &["1"]]);
        let s = compute_summary(Some(&now), Some(&before));
        assert_eq!(s.total_employees_change, Some(0.5));
        assert_eq!(s.total_monthly_cost_change, Some(0.5));
    }
}
