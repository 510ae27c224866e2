use crate::{
    domain::{Insight, Severity},
    numeric::percent_change,
};

pub const BUDGET_VARIANCE_PERCENT: f64 = 20.0;
const BUDGET_MONTH_DAYS: f64 = 30.0;

/// Compare month-to-date spend with a linear share of the monthly budget.
pub fn check_budget_status(current_cost: f64, monthly_budget: f64, day_of_month: u32) -> Option<Insight> {
    let expected = monthly_budget / BUDGET_MONTH_DAYS * f64::from(day_of_month);
    let variance = percent_change(current_cost, expected)?;

    if variance > BUDGET_VARIANCE_PERCENT {
        Some(Insight::new(
            Severity::Warning,
            "budget",
            format!(
                "Spending is {:.0}% ahead of budget for day {} ({:.2} vs {:.2} expected).",
                variance, day_of_month, current_cost, expected
            ),
        ))
    } else if variance < -BUDGET_VARIANCE_PERCENT {
        Some(Insight::new(
            Severity::Info,
            "budget",
            format!(
                "Spending is {:.0}% under budget for day {}.",
                variance.abs(),
                day_of_month
            ),
        ))
    } else {
        None
    }
}
