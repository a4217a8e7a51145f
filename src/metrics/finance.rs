use super::{check_dataset, percent_change, Aggregate};
use crate::dataset::TabularDataset;
use serde::{Deserialize, Serialize};

pub const TYPE_COLUMN: &str = "type";
pub const AMOUNT_COLUMN: &str = "amount";
pub const CATEGORY_COLUMN: &str = "category";

const REQUIRED: &[&str] = &[TYPE_COLUMN, AMOUNT_COLUMN];

/// Labels matched (case-insensitive substring) against the `type` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceLabels {
    pub revenue: String,
    pub expense: String,
}

impl Default for FinanceLabels {
    fn default() -> Self {
        Self {
            revenue: "revenue".to_string(),
            expense: "expense".to_string(),
        }
    }
}

impl FinanceLabels {
    pub fn is_revenue(&self, kind: &str) -> bool {
        contains_ignore_case(kind, &self.revenue)
    }

    pub fn is_expense(&self, kind: &str) -> bool {
        contains_ignore_case(kind, &self.expense)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceMetrics {
    pub revenue: f64,
    pub expense: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub revenue: f64,
    pub expense: f64,
    pub profit: f64,
    pub revenue_change: Option<f64>,
    pub expense_change: Option<f64>,
    pub profit_change: Option<f64>,
}

impl FinanceSummary {
    pub fn compare(current: &FinanceMetrics, previous: &FinanceMetrics) -> Self {
        Self {
            revenue: current.revenue,
            expense: current.expense,
            profit: current.profit,
            revenue_change: percent_change(Some(current.revenue), Some(previous.revenue)),
            expense_change: percent_change(Some(current.expense), Some(previous.expense)),
            profit_change: percent_change(Some(current.profit), Some(previous.profit)),
        }
    }
}

pub fn aggregate(
    dataset: Option<&TabularDataset>,
    labels: &FinanceLabels,
) -> Aggregate<FinanceMetrics> {
    let ds = match check_dataset(dataset, REQUIRED) {
        Ok(ds) => ds,
        Err(why) => return Aggregate::InsufficientData(why),
    };
    let (Some(kinds), Some(amounts)) = (ds.text(TYPE_COLUMN), ds.numbers(AMOUNT_COLUMN)) else {
        return Aggregate::InsufficientData(super::InsufficientData::MissingColumns(
            ds.missing_columns(REQUIRED),
        ));
    };

    let mut revenue = 0.0;
    let mut expense = 0.0;
    for (kind, amount) in kinds.into_iter().zip(amounts) {
        let Some(kind) = kind else { continue };
        let amount = amount.unwrap_or(0.0);
        if labels.is_revenue(kind) {
            revenue += amount;
        }
        if labels.is_expense(kind) {
            expense += amount;
        }
    }
    Aggregate::Computed(FinanceMetrics {
        revenue,
        expense,
        profit: revenue - expense,
    })
}

pub fn compute_summary(
    current: Option<&TabularDataset>,
    previous: Option<&TabularDataset>,
    labels: &FinanceLabels,
) -> FinanceSummary {
    let now = aggregate(current, labels).or_default();
    let before = aggregate(previous, labels).or_default();
    FinanceSummary::compare(&now, &before)
}
