//! Tariff billing engine.
//!
//! Turns a total-energy figure plus a connection category into a [`Bill`]
//! under a fixed rate table. Pure: the reference date for the daily-cost
//! projection is passed in by the caller.

mod projection;
mod tariff;

pub use projection::{project_daily_costs, PROJECTION_DAYS};

use time::Date;

use crate::{
    domain::{Bill, BillRequest, ConnectionCategory, SlabBreakdownEntry},
    numeric::round2,
};

pub const DEFAULT_POWER_FACTOR: f64 = 0.90;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid connection category: {0}")]
    InvalidCategory(String),
}

/// Compute the bill for `request`.
///
/// Rules:
/// - the category must be domestic, general-purpose or industrial.
/// - total energy must be finite and non-negative.
/// - max demand, when given, must be finite and non-negative (default 0).
/// - power factor, when given, must lie in [0, 1] (default 0.90).
pub fn calculate_bill(request: &BillRequest, reference_date: Date) -> Result<Bill, BillingError> {
    let category: ConnectionCategory = request.connection_category.parse()?;

    let energy = request.total_energy;
    if !energy.is_finite() || energy < 0.0 {
        return Err(BillingError::InvalidInput(format!(
            "totalEnergy must be a non-negative number, got {energy}"
        )));
    }

    let max_demand = request.max_demand.unwrap_or(0.0);
    if !max_demand.is_finite() || max_demand < 0.0 {
        return Err(BillingError::InvalidInput(format!(
            "maxDemand must be a non-negative number, got {max_demand}"
        )));
    }

    let power_factor = request.average_power_factor.unwrap_or(DEFAULT_POWER_FACTOR);
    if !(0.0..=1.0).contains(&power_factor) {
        return Err(BillingError::InvalidInput(format!(
            "averagePowerFactor must be within [0, 1], got {power_factor}"
        )));
    }

    let charges = tariff::charges_for(category, energy, max_demand, power_factor);

    let slab_breakdown: Vec<SlabBreakdownEntry> = charges
        .slabs
        .into_iter()
        .map(|entry| SlabBreakdownEntry {
            amount: round2(entry.amount),
            ..entry
        })
        .collect();
    let fixed_charge = round2(charges.fixed_charge);
    let demand_charge = round2(charges.demand_charge);
    let power_factor_adjustment = round2(charges.power_factor_adjustment);

    let energy_charge: f64 = slab_breakdown.iter().map(|e| e.amount).sum();
    let total_amount = round2(energy_charge + fixed_charge + demand_charge + power_factor_adjustment);

    // Huge but finite inputs can still overflow once multiplied by a rate.
    let amounts_finite = slab_breakdown.iter().all(|e| e.amount.is_finite())
        && [fixed_charge, demand_charge, power_factor_adjustment, total_amount]
            .iter()
            .all(|v| v.is_finite());
    if !amounts_finite {
        return Err(BillingError::InvalidInput(format!(
            "amount out of range for totalEnergy {energy} and maxDemand {max_demand}"
        )));
    }

    tracing::debug!(
        %category,
        total_energy = energy,
        total_amount,
        slabs = slab_breakdown.len(),
        "bill calculated"
    );

    Ok(Bill {
        total_amount,
        category,
        slab_breakdown,
        fixed_charge,
        demand_charge,
        power_factor_adjustment,
        max_demand: charges.max_demand,
        power_factor,
        daily_costs: project_daily_costs(total_amount, reference_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 30);

    fn assert_total_matches_components(bill: &Bill) {
        let expected = round2(
            bill.energy_charge() + bill.fixed_charge + bill.demand_charge + bill.power_factor_adjustment,
        );
        assert_eq!(bill.total_amount, expected);
    }

    #[test]
    fn domestic_bill_for_150_kwh() {
        let bill = calculate_bill(&BillRequest::new(150.0, ConnectionCategory::Domestic), TODAY).unwrap();

        // 30*7.85 + 30*15 + 30*20 + 30*30 + 30*42
        assert_eq!(bill.slab_breakdown.len(), 5);
        assert_eq!(bill.energy_charge(), 235.5 + 450.0 + 600.0 + 900.0 + 1260.0);
        assert_eq!(bill.fixed_charge, 750.00);
        assert_eq!(bill.total_amount, 4195.50);
        assert_eq!(bill.category, ConnectionCategory::Domestic);
        assert_total_matches_components(&bill);
    }

    #[test]
    fn domestic_echoes_zero_demand() {
        let req = BillRequest::new(40.0, ConnectionCategory::Domestic)
            .with_max_demand(7.5)
            .with_power_factor(0.6);
        let bill = calculate_bill(&req, TODAY).unwrap();

        assert_eq!(bill.max_demand, 0.0);
        assert_eq!(bill.demand_charge, 0.0);
        assert_eq!(bill.power_factor_adjustment, 0.0);
        assert_eq!(bill.power_factor, 0.6);
    }

    #[test]
    fn general_purpose_bill_with_low_power_factor() {
        let req = BillRequest::new(100.0, ConnectionCategory::GeneralPurpose)
            .with_max_demand(5.0)
            .with_power_factor(0.80);
        let bill = calculate_bill(&req, TODAY).unwrap();

        // energy 2850 + demand 2250 = 5100, deficit 0.05
        assert_eq!(bill.slab_breakdown.len(), 1);
        assert_eq!(bill.demand_charge, 2250.00);
        assert_eq!(bill.power_factor_adjustment, 255.00);
        assert_eq!(bill.fixed_charge, 500.00);
        assert_eq!(bill.total_amount, 5855.00);
        assert_eq!(bill.max_demand, 5.0);
        assert_total_matches_components(&bill);
    }

    #[test]
    fn general_purpose_defaults_to_unpenalised_power_factor() {
        let bill = calculate_bill(&BillRequest::new(10.0, ConnectionCategory::GeneralPurpose), TODAY).unwrap();
        assert_eq!(bill.power_factor, DEFAULT_POWER_FACTOR);
        assert_eq!(bill.power_factor_adjustment, 0.0);
        assert_eq!(bill.total_amount, 785.00);
    }

    #[test]
    fn industrial_bill_with_incentive() {
        let req = BillRequest::new(200.0, ConnectionCategory::Industrial)
            .with_max_demand(10.0)
            .with_power_factor(0.98);
        let bill = calculate_bill(&req, TODAY).unwrap();

        // energy 4900 + demand 5500 = 10400; incentive 10400 * 0.08 * 0.5
        assert_eq!(bill.power_factor_adjustment, -416.00);
        assert_eq!(bill.total_amount, 4900.0 + 5500.0 + 1500.0 - 416.0);
        assert_total_matches_components(&bill);
    }

    #[test]
    fn total_equals_rounded_component_sum_across_categories() {
        let categories = [
            ConnectionCategory::Domestic,
            ConnectionCategory::GeneralPurpose,
            ConnectionCategory::Industrial,
        ];
        for category in categories {
            for energy in [0.0, 0.333, 29.999, 61.17, 133.337, 999.999] {
                for pf in [0.5, 0.83, 0.85, 0.9, 0.93, 1.0] {
                    let req = BillRequest::new(energy, category)
                        .with_max_demand(3.217)
                        .with_power_factor(pf);
                    let bill = calculate_bill(&req, TODAY).unwrap();
                    assert_total_matches_components(&bill);
                }
            }
        }
    }

    #[test]
    fn daily_costs_spread_total_over_thirty_days() {
        let bill = calculate_bill(&BillRequest::new(75.0, ConnectionCategory::Domestic), TODAY).unwrap();

        assert_eq!(bill.daily_costs.len(), 30);
        assert_eq!(bill.daily_costs.last().unwrap().date, TODAY);
        assert!(bill.daily_costs.windows(2).all(|w| w[0].date < w[1].date));
        let first = bill.daily_costs[0].cost;
        assert!(bill.daily_costs.iter().all(|d| d.cost == first));
        assert_eq!(first, round2(bill.total_amount / 30.0));
    }

    #[test]
    fn rejects_unknown_category() {
        let req = BillRequest {
            total_energy: 10.0,
            connection_category: "agricultural".to_string(),
            max_demand: None,
            average_power_factor: None,
        };
        assert_eq!(
            calculate_bill(&req, TODAY),
            Err(BillingError::InvalidCategory("agricultural".to_string()))
        );
    }

    #[test]
    fn rejects_negative_or_non_finite_energy() {
        for energy in [-0.01, f64::NAN, f64::INFINITY] {
            let req = BillRequest::new(energy, ConnectionCategory::Domestic);
            assert!(matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(_))));
        }
    }

    #[test]
    fn rejects_energy_or_demand_that_overflows_amounts() {
        let categories = [
            ConnectionCategory::Domestic,
            ConnectionCategory::GeneralPurpose,
            ConnectionCategory::Industrial,
        ];
        for category in categories {
            let req = BillRequest::new(1e307, category).with_power_factor(0.95);
            assert!(
                matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(ref m)) if m.contains("out of range")),
                "{category}"
            );
        }

        let req = BillRequest::new(10.0, ConnectionCategory::Industrial).with_max_demand(1e306);
        assert!(matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(_))));
    }

    #[test]
    fn large_but_representable_bill_stays_finite() {
        let bill = calculate_bill(&BillRequest::new(1e9, ConnectionCategory::Domestic), TODAY).unwrap();
        assert!(bill.total_amount.is_finite());
        assert!(bill.daily_costs.iter().all(|d| d.cost.is_finite()));
        let json = serde_json::to_value(&bill).unwrap();
        assert!(json["totalAmount"].is_number());
        assert!(json["dailyCosts"][0]["cost"].is_number());
    }

    #[test]
    fn rejects_out_of_range_demand_and_power_factor() {
        let req = BillRequest::new(10.0, ConnectionCategory::Industrial).with_max_demand(-1.0);
        assert!(matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(_))));

        let req = BillRequest::new(10.0, ConnectionCategory::Industrial).with_power_factor(1.2);
        assert!(matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(_))));

        let req = BillRequest::new(10.0, ConnectionCategory::Industrial).with_power_factor(f64::NAN);
        assert!(matches!(calculate_bill(&req, TODAY), Err(BillingError::InvalidInput(_))));
    }

    #[test]
    fn serializes_with_rest_field_names() {
        let bill = calculate_bill(&BillRequest::new(10.0, ConnectionCategory::GeneralPurpose), TODAY).unwrap();
        let json = serde_json::to_value(&bill).unwrap();

        assert_eq!(json["category"], "general-purpose");
        assert_eq!(json["fixedCharges"], 500.0);
        assert_eq!(json["maxDemandKVA"], 0.0);
        assert!(json["breakdown"].is_array());
        assert_eq!(json["dailyCosts"][29]["date"], "2024-06-30");
    }
}
