use time::{Date, Duration};

use crate::{domain::DailyCost, numeric::round2};

pub const PROJECTION_DAYS: i64 = 30;

/// Spread a bill total evenly over the 30 days ending on `reference_date`.
///
/// Daily telemetry is not consulted; every entry carries the same cost.
pub fn project_daily_costs(total_amount: f64, reference_date: Date) -> Vec<DailyCost> {
    let cost = round2(total_amount / PROJECTION_DAYS as f64);

    (0..PROJECTION_DAYS)
        .rev()
        .filter_map(|days_back| reference_date.checked_sub(Duration::days(days_back)))
        .map(|date| DailyCost { date, cost })
        .collect()
}
