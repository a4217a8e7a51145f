// Fixed-threshold alert rules over computed summaries.
use crate::metrics::{FinanceSummary, InventorySummary};
use crate::types::{AlertKind, AlertRecord, Dashboard, LowStockItem, Severity};
use crate::util::{format_number, safe_div};
use std::collections::BTreeMap;
use tracing::debug;

/// Default for how many low-stock products raise an alert.
pub const LOW_STOCK_ALERT_LIMIT: usize = 10;
/// Expense/revenue ratio above which expenses are flagged.
pub const HIGH_EXPENSE_RATIO: f64 = 0.8;
/// Revenue must exceed expense by this factor to avoid a low-revenue alert.
pub const LOW_REVENUE_MARGIN: f64 = 1.1;

/// Evaluate every rule. Inventory alerts come first, then financial ones.
///
/// A `None` summary means that category's data was unavailable; it yields no
/// alerts and leaves the other category untouched. At most `low_stock_limit`
/// low-stock products raise an alert.
pub fn evaluate_alerts(
    inventory: Option<&InventorySummary>,
    low_stock: &[LowStockItem],
    finance: Option<&FinanceSummary>,
    low_stock_limit: usize,
) -> Vec<AlertRecord> {
    let mut alerts = match inventory {
        Some(_) => inventory_alerts(low_stock, low_stock_limit),
        None => {
            debug!("inventory summary unavailable, skipping stock alerts");
            Vec::new()
        }
    };
    match finance {
        Some(summary) => alerts.extend(finance_alerts(summary)),
        None => debug!("finance summary unavailable, skipping financial alerts"),
    }
    alerts
}

pub fn inventory_alerts(low_stock: &[LowStockItem], limit: usize) -> Vec<AlertRecord> {
    low_stock
        .iter()
        .take(limit)
        .map(|item| AlertRecord {
            kind: AlertKind::LowStock,
            severity: Severity::Warning,
            title: format!("Low stock: {}", item.product),
            message: format!(
                "{} has {} units on hand, below the minimum of {}",
                item.product,
                format_number(item.quantity, 0),
                format_number(item.minimum_level, 0)
            ),
            payload: BTreeMap::from([
                ("quantity", item.quantity),
                ("minimum_level", item.minimum_level),
                ("gap", item.gap),
            ]),
            dashboard: Dashboard::Inventory,
        })
        .collect()
}

/// Negative profit, high expense ratio and low revenue, in that order. The
/// rules are independent; several may fire together.
pub fn finance_alerts(summary: &FinanceSummary) -> Vec<AlertRecord> {
    let mut alerts = Vec::new();
    let FinanceSummary {
        revenue,
        expense,
        profit,
        ..
    } = *summary;

    if profit < 0.0 {
        alerts.push(AlertRecord {
            kind: AlertKind::NegativeProfit,
            severity: Severity::Danger,
            title: "Negative profit".to_string(),
            message: format!("Profit for the period is {}", format_number(profit, 2)),
            payload: BTreeMap::from([("profit", profit)]),
            dashboard: Dashboard::Finance,
        });
    }

    if revenue > 0.0 {
        if let Some(ratio) = safe_div(expense, revenue).filter(|r| *r > HIGH_EXPENSE_RATIO) {
            alerts.push(AlertRecord {
                kind: AlertKind::HighExpenses,
                severity: Severity::Warning,
                title: "High expenses".to_string(),
                message: format!(
                    "Expenses are {}% of revenue",
                    format_number(ratio * 100.0, 1)
                ),
                payload: BTreeMap::from([("expense_ratio", ratio)]),
                dashboard: Dashboard::Finance,
            });
        }
    }

    if revenue > 0.0 && expense > 0.0 && revenue < expense * LOW_REVENUE_MARGIN {
        alerts.push(AlertRecord {
            kind: AlertKind::LowRevenue,
            severity: Severity::Warning,
            title: "Low revenue".to_string(),
            message: format!(
                "Revenue of {} barely covers expenses of {}",
                format_number(revenue, 2),
                format_number(expense, 2)
            ),
            payload: BTreeMap::from([("revenue", revenue), ("expense", expense)]),
            dashboard: Dashboard::Finance,
        });
    }

    alerts
}
