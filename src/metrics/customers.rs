use super::{check_dataset, percent_change, Aggregate};
use crate::dataset::TabularDataset;
use crate::util::mean;
use serde::Serialize;

pub const AGE_COLUMN: &str = "age";
pub const GENDER_COLUMN: &str = "gender";
pub const CITY_COLUMN: &str = "city";
/// Spend columns, most specific first.
pub const SPEND_COLUMNS: [&str; 2] = ["average_spend", "spend"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CustomerMetrics {
    pub total_clients: usize,
    pub avg_age: Option<f64>,
    pub avg_spend: Option<f64>,
    pub pct_female: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub total_clients: usize,
    pub avg_age: Option<f64>,
    pub avg_spend: Option<f64>,
    pub pct_female: Option<f64>,
    pub total_clients_change: Option<f64>,
    pub avg_age_change: Option<f64>,
    pub avg_spend_change: Option<f64>,
    pub pct_female_change: Option<f64>,
}

impl CustomerSummary {
    pub fn compare(current: &CustomerMetrics, previous: &CustomerMetrics) -> Self {
        Self {
            total_clients: current.total_clients,
            avg_age: current.avg_age,
            avg_spend: current.avg_spend,
            pct_female: current.pct_female,
            total_clients_change: percent_change(
                Some(current.total_clients as f64),
                Some(previous.total_clients as f64),
            ),
            avg_age_change: percent_change(current.avg_age, previous.avg_age),
            avg_spend_change: percent_change(current.avg_spend, previous.avg_spend),
            pct_female_change: percent_change(current.pct_female, previous.pct_female),
        }
    }
}

pub fn aggregate(dataset: Option<&TabularDataset>) -> Aggregate<CustomerMetrics> {
    let ds = match check_dataset(dataset, &[]) {
        Ok(ds) => ds,
        Err(why) => return Aggregate::InsufficientData(why),
    };
    let total_clients = ds.len();

    let avg_age = ds.present_numbers(AGE_COLUMN).and_then(|v| mean(&v));
    let avg_spend = SPEND_COLUMNS
        .iter()
        .find_map(|c| ds.present_numbers(c))
        .and_then(|v| mean(&v));

    let pct_female = ds.text(GENDER_COLUMN).map(|genders| {
        let female = genders
            .into_iter()
            .flatten()
            .filter(|g| g.trim().eq_ignore_ascii_case("female"))
            .count();
        100.0 * female as f64 / total_clients as f64
    });

    Aggregate::Computed(CustomerMetrics {
        total_clients,
        avg_age,
        avg_spend,
        pct_female,
    })
}

pub fn compute_summary(
    current: Option<&TabularDataset>,
    previous: Option<&TabularDataset>,
) -> CustomerSummary {
    let now = aggregate(current).or_default();
    let before = aggregate(previous).or_default();
    CustomerSummary::compare(&now, &before)
}
