use super::{check_dataset, percent_change, Aggregate};
use crate::dataset::TabularDataset;
use serde::Serialize;
use std::collections::HashSet;

pub const PRODUCT_ID_COLUMN: &str = "product_id";
pub const PRODUCT_COLUMN: &str = "product";
pub const CATEGORY_COLUMN: &str = "category";
pub const QUANTITY_COLUMN: &str = "quantity";
pub const UNIT_COST_COLUMN: &str = "unit_cost";
pub const MINIMUM_LEVEL_COLUMN: &str = "minimum_level";
pub const QUANTITY_SOLD_COLUMN: &str = "quantity_sold";
pub const UNIT_PRICE_COLUMN: &str = "unit_price";
pub const DATE_COLUMN: &str = "date";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InventoryMetrics {
    pub unique_product_count: usize,
    pub total_value: f64,
    pub low_stock_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub unique_product_count: usize,
    pub total_value: f64,
    pub low_stock_count: usize,
    pub unique_product_count_change: Option<f64>,
    pub total_value_change: Option<f64>,
    pub low_stock_count_change: Option<f64>,
}

impl InventorySummary {
    pub fn compare(current: &InventoryMetrics, previous: &InventoryMetrics) -> Self {
        Self {
            unique_product_count: current.unique_product_count,
            total_value: current.total_value,
            low_stock_count: current.low_stock_count,
            unique_product_count_change: percent_change(
                Some(current.unique_product_count as f64),
                Some(previous.unique_product_count as f64),
            ),
            total_value_change: percent_change(
                Some(current.total_value),
                Some(previous.total_value),
            ),
            low_stock_count_change: percent_change(
                Some(current.low_stock_count as f64),
                Some(previous.low_stock_count as f64),
            ),
        }
    }
}

/// Inventory has no hard column requirement: each metric degrades on its own.
pub fn aggregate(dataset: Option<&TabularDataset>) -> Aggregate<InventoryMetrics> {
    let ds = match check_dataset(dataset, &[]) {
        Ok(ds) => ds,
        Err(why) => return Aggregate::InsufficientData(why),
    };

    let unique_product_count = match ds.text(PRODUCT_ID_COLUMN) {
        Some(ids) => ids.into_iter().flatten().map(str::trim).collect::<HashSet<_>>().len(),
        None => ds.len(),
    };

    let total_value = match (ds.numbers(QUANTITY_COLUMN), ds.numbers(UNIT_COST_COLUMN)) {
        (Some(qty), Some(cost)) => qty
            .into_iter()
            .zip(cost)
            .map(|(q, c)| q.unwrap_or(0.0) * c.unwrap_or(0.0))
            .sum(),
        _ => 0.0,
    };

    let low_stock_count = match (ds.numbers(QUANTITY_COLUMN), ds.numbers(MINIMUM_LEVEL_COLUMN)) {
        (Some(qty), Some(min)) => qty
            .into_iter()
            .zip(min)
            .filter(|(q, m)| matches!((q, m), (Some(q), Some(m)) if q <= m))
            .count(),
        _ => 0,
    };

    Aggregate::Computed(InventoryMetrics {
        unique_product_count,
        total_value,
        low_stock_count,
    })
}

pub fn compute_summary(
    current: Option<&TabularDataset>,
    previous: Option<&TabularDataset>,
) -> InventorySummary {
    let now = aggregate(current).or_default();
    let before = aggregate(previous).or_default();
    InventorySummary::compare(&now, &before)
}
