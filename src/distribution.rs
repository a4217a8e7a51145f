// Grouping and ranking helpers behind the dashboard charts and alerts.
//
// All series keep first-appearance order for their keys before sorting, and
// sorting is stable, so ties come out in original row order.
use crate::dataset::TabularDataset;
use crate::metrics::finance::{self, FinanceLabels};
use crate::metrics::{customers, hr, inventory, suppliers};
use crate::types::{DistributionSeries, LowStockItem, SeriesEntry, SupplierRanking};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Sums (or counts) keyed by category in first-appearance order.
#[derive(Default)]
struct GroupAcc {
    index: HashMap<String, usize>,
    entries: Vec<SeriesEntry>,
}

impl GroupAcc {
    fn add(&mut self, key: &str, value: f64) {
        let key = key.trim();
        match self.index.get(key) {
            Some(&i) => self.entries[i].value += value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(SeriesEntry {
                    key: key.to_string(),
                    value,
                });
            }
        }
    }

    fn into_series(self, ascending: bool, top_n: Option<usize>) -> DistributionSeries {
        DistributionSeries::sorted(self.entries, ascending, top_n)
    }
}

/// Group `dataset` by `group_by`, summing `value_column` when given or
/// counting rows otherwise, then sort and truncate.
///
/// Rows with a missing group key are skipped; unparseable values add zero.
/// An empty dataset or absent column gives an empty series.
pub fn distribution(
    dataset: &TabularDataset,
    group_by: &str,
    value_column: Option<&str>,
    top_n: Option<usize>,
    ascending: bool,
) -> DistributionSeries {
    let Some(keys) = dataset.text(group_by) else {
        return DistributionSeries::default();
    };
    let values: Vec<f64> = match value_column {
        Some(col) => match dataset.numbers(col) {
            Some(vals) => vals.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
            None => return DistributionSeries::default(),
        },
        None => vec![1.0; keys.len()],
    };

    let mut acc = GroupAcc::default();
    for (key, value) in keys.into_iter().zip(values) {
        if let Some(key) = key {
            acc.add(key, value);
        }
    }
    acc.into_series(ascending, top_n)
}

/// Products whose most recent snapshot is below the minimum level, largest
/// shortfall first.
pub fn low_stock_items(stock: &TabularDataset, top_n: Option<usize>) -> Vec<LowStockItem> {
    let latest = latest_snapshot_rows(stock);
    let (Some(qty), Some(min)) = (
        stock.numbers(inventory::QUANTITY_COLUMN),
        stock.numbers(inventory::MINIMUM_LEVEL_COLUMN),
    ) else {
        return Vec::new();
    };
    let ids = product_keys(stock);
    let names = stock.text(inventory::PRODUCT_COLUMN);

    let mut items: Vec<LowStockItem> = latest
        .into_iter()
        .filter_map(|row| {
            let (quantity, minimum_level) = (qty[row]?, min[row]?);
            let gap = minimum_level - quantity;
            if gap <= 0.0 {
                return None;
            }
            let product_id = ids[row].clone().unwrap_or_default();
            let product = names
                .as_ref()
                .and_then(|n| n[row])
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| product_id.clone());
            Some(LowStockItem {
                product_id,
                product,
                quantity,
                minimum_level,
                gap,
            })
        })
        .collect();

    items.sort_by(|a, b| b.gap.total_cmp(&a.gap));
    if let Some(n) = top_n {
        items.truncate(n);
    }
    items
}

/// Product identity for snapshot dedup: `product_id`, else `product`.
fn product_keys(stock: &TabularDataset) -> Vec<Option<String>> {
    stock
        .text(inventory::PRODUCT_ID_COLUMN)
        .or_else(|| stock.text(inventory::PRODUCT_COLUMN))
        .map(|keys| keys.into_iter().map(|k| k.map(|s| s.trim().to_string())).collect())
        .unwrap_or_else(|| vec![None; stock.len()])
}

/// Row index of the latest snapshot per product, in first-appearance order of
/// the product.
///
/// Rows with an unparseable date are dropped. On equal dates the later row
/// wins. Without a date column the last row per product wins.
fn latest_snapshot_rows(stock: &TabularDataset) -> Vec<usize> {
    let keys = product_keys(stock);
    let dates = stock.dates(inventory::DATE_COLUMN);

    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, (Option<NaiveDate>, usize)> = HashMap::new();
    for (row, key) in keys.into_iter().enumerate() {
        let Some(key) = key else { continue };
        let date = match &dates {
            Some(dates) => match dates[row] {
                Some(d) => Some(d),
                None => continue,
            },
            None => None,
        };
        match best.get_mut(&key) {
            Some(slot) => {
                if date >= slot.0 {
                    *slot = (date, row);
                }
            }
            None => {
                order.push(key.clone());
                best.insert(key, (date, row));
            }
        }
    }
    order.iter().filter_map(|k| best.get(k).map(|(_, row)| *row)).collect()
}

/// Per-product revenue (`quantity_sold * unit_price`) in first-appearance
/// order.
fn sales_by_product(sales: &TabularDataset) -> GroupAcc {
    let mut acc = GroupAcc::default();
    let (Some(products), Some(sold), Some(price)) = (
        sales.text(inventory::PRODUCT_COLUMN),
        sales.numbers(inventory::QUANTITY_SOLD_COLUMN),
        sales.numbers(inventory::UNIT_PRICE_COLUMN),
    ) else {
        return acc;
    };
    for ((product, sold), price) in products.into_iter().zip(sold).zip(price) {
        if let Some(product) = product {
            acc.add(product, sold.unwrap_or(0.0) * price.unwrap_or(0.0));
        }
    }
    acc
}

/// Best-selling products by revenue, highest first.
pub fn top_selling(sales: &TabularDataset, top_n: Option<usize>) -> DistributionSeries {
    sales_by_product(sales).into_series(false, top_n)
}

/// Worst-selling products by revenue, lowest first.
///
/// Every distinct product in `products` takes part, so products with no
/// sales in `sales` show up with zero revenue.
pub fn least_selling(
    products: &TabularDataset,
    sales: &TabularDataset,
    top_n: Option<usize>,
) -> DistributionSeries {
    let sold = sales_by_product(sales);
    let mut acc = GroupAcc::default();
    if let Some(names) = products.text(inventory::PRODUCT_COLUMN) {
        for name in names.into_iter().flatten() {
            if !acc.index.contains_key(name.trim()) {
                let revenue = sold
                    .index
                    .get(name.trim())
                    .map(|&i| sold.entries[i].value)
                    .unwrap_or(0.0);
                acc.add(name, revenue);
            }
        }
    }
    acc.into_series(true, top_n)
}

/// Top and bottom suppliers by rating as two separate series.
///
/// Suppliers without a parseable rating are left out of both.
pub fn supplier_ranking(suppliers_ds: &TabularDataset, top_n: usize) -> SupplierRanking {
    let (Some(names), Some(ratings)) = (
        suppliers_ds.text(suppliers::SUPPLIER_COLUMN),
        suppliers_ds.numbers(suppliers::RATING_COLUMN),
    ) else {
        return SupplierRanking::default();
    };
    let rated: Vec<SeriesEntry> = names
        .into_iter()
        .zip(ratings)
        .filter_map(|(name, rating)| {
            Some(SeriesEntry {
                key: name?.trim().to_string(),
                value: rating?,
            })
        })
        .collect();
    SupplierRanking {
        top: DistributionSeries::sorted(rated.clone(), false, Some(top_n)),
        bottom: DistributionSeries::sorted(rated, true, Some(top_n)),
    }
}

/// Finance rows of one kind (revenue or expense), summed by category.
fn finance_by_category(
    ledger: &TabularDataset,
    top_n: Option<usize>,
    mut keep: impl FnMut(&str) -> bool,
) -> DistributionSeries {
    let Some(kinds) = ledger.text(finance::TYPE_COLUMN) else {
        return DistributionSeries::default();
    };
    let matching = ledger.filter_rows(|i| kinds[i].is_some_and(&mut keep));
    distribution(&matching, finance::CATEGORY_COLUMN, Some(finance::AMOUNT_COLUMN), top_n, false)
}

pub fn expenses_by_category(
    ledger: &TabularDataset,
    labels: &FinanceLabels,
    top_n: Option<usize>,
) -> DistributionSeries {
    finance_by_category(ledger, top_n, |kind| labels.is_expense(kind))
}

pub fn revenue_by_category(
    ledger: &TabularDataset,
    labels: &FinanceLabels,
    top_n: Option<usize>,
) -> DistributionSeries {
    finance_by_category(ledger, top_n, |kind| labels.is_revenue(kind))
}

pub fn inventory_value_by_category(
    inventory_ds: &TabularDataset,
    top_n: Option<usize>,
) -> DistributionSeries {
    let (Some(categories), Some(qty), Some(cost)) = (
        inventory_ds.text(inventory::CATEGORY_COLUMN),
        inventory_ds.numbers(inventory::QUANTITY_COLUMN),
        inventory_ds.numbers(inventory::UNIT_COST_COLUMN),
    ) else {
        return DistributionSeries::default();
    };
    let mut acc = GroupAcc::default();
    for ((category, q), c) in categories.into_iter().zip(qty).zip(cost) {
        if let Some(category) = category {
            acc.add(category, q.unwrap_or(0.0) * c.unwrap_or(0.0));
        }
    }
    acc.into_series(false, top_n)
}

pub fn customers_by_city(
    customers_ds: &TabularDataset,
    top_n: Option<usize>,
) -> DistributionSeries {
    distribution(customers_ds, customers::CITY_COLUMN, None, top_n, false)
}

pub fn employees_by_department(hr_ds: &TabularDataset) -> DistributionSeries {
    distribution(hr_ds, hr::DEPARTMENT_COLUMN, None, None, false)
}

pub fn payroll_by_department(hr_ds: &TabularDataset) -> DistributionSeries {
    distribution(hr_ds, hr::DEPARTMENT_COLUMN, Some(hr::SALARY_COLUMN), None, false)
}
