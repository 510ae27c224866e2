//! Rate tables and the per-category charge strategies.
//!
//! All amounts here are unrounded; rounding happens once, when the bill is
//! assembled.

use crate::domain::{ConnectionCategory, SlabBreakdownEntry};

struct Slab {
    label: &'static str,
    width_kwh: f64,
    rate: f64,
}

const DOMESTIC_SLABS: [Slab; 6] = [
    Slab { label: "0-30 kWh", width_kwh: 30.0, rate: 7.85 },
    Slab { label: "31-60 kWh", width_kwh: 30.0, rate: 15.00 },
    Slab { label: "61-90 kWh", width_kwh: 30.0, rate: 20.00 },
    Slab { label: "91-120 kWh", width_kwh: 30.0, rate: 30.00 },
    Slab { label: "121-180 kWh", width_kwh: 60.0, rate: 42.00 },
    Slab { label: "Above 180 kWh", width_kwh: f64::INFINITY, rate: 50.00 },
];

/// Upper bound (inclusive) of monthly energy and the fixed charge for it.
const DOMESTIC_FIXED_STEPS: [(f64, f64); 4] = [(60.0, 150.00), (90.0, 350.00), (120.0, 600.00), (180.0, 750.00)];
const DOMESTIC_FIXED_ABOVE: f64 = 1000.00;

struct FlatTariff {
    label: &'static str,
    rate: f64,
    fixed_charge: f64,
    demand_rate_per_kva: f64,
}

const GENERAL_PURPOSE: FlatTariff = FlatTariff {
    label: "General purpose flat rate",
    rate: 28.50,
    fixed_charge: 500.00,
    demand_rate_per_kva: 450.00,
};

const INDUSTRIAL: FlatTariff = FlatTariff {
    label: "Industrial flat rate",
    rate: 24.50,
    fixed_charge: 1500.00,
    demand_rate_per_kva: 550.00,
};

const PF_PENALTY_BELOW: f64 = 0.85;
const INDUSTRIAL_PF_PENALTY_FACTOR: f64 = 1.5;
const INDUSTRIAL_PF_INCENTIVE_ABOVE: f64 = 0.90;
const INDUSTRIAL_PF_INCENTIVE_FACTOR: f64 = 0.5;

/// Unrounded charge components for one bill.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Charges {
    pub slabs: Vec<SlabBreakdownEntry>,
    pub fixed_charge: f64,
    pub demand_charge: f64,
    pub power_factor_adjustment: f64,
    pub max_demand: f64,
}

pub(crate) fn charges_for(
    category: ConnectionCategory,
    total_energy: f64,
    max_demand: f64,
    power_factor: f64,
) -> Charges {
    match category {
        ConnectionCategory::Domestic => Charges {
            slabs: domestic_slabs(total_energy),
            fixed_charge: domestic_fixed_charge(total_energy),
            demand_charge: 0.0,
            power_factor_adjustment: 0.0,
            max_demand: 0.0,
        },
        ConnectionCategory::GeneralPurpose => {
            flat_charges(&GENERAL_PURPOSE, total_energy, max_demand, |subtotal| {
                general_purpose_pf_adjustment(subtotal, power_factor)
            })
        }
        ConnectionCategory::Industrial => flat_charges(&INDUSTRIAL, total_energy, max_demand, |subtotal| {
            industrial_pf_adjustment(subtotal, power_factor)
        }),
    }
}

fn domestic_slabs(total_energy: f64) -> Vec<SlabBreakdownEntry> {
    let mut remaining = total_energy;
    let mut entries = Vec::new();

    for slab in &DOMESTIC_SLABS {
        if remaining <= 0.0 {
            break;
        }
        let units = remaining.min(slab.width_kwh);
        entries.push(SlabBreakdownEntry {
            label: slab.label.to_string(),
            units_billed: units,
            rate: slab.rate,
            amount: units * slab.rate,
        });
        remaining -= units;
    }

    entries
}

fn domestic_fixed_charge(total_energy: f64) -> f64 {
    DOMESTIC_FIXED_STEPS
        .iter()
        .find(|(upper, _)| total_energy <= *upper)
        .map(|(_, charge)| *charge)
        .unwrap_or(DOMESTIC_FIXED_ABOVE)
}

fn flat_charges(
    tariff: &FlatTariff,
    total_energy: f64,
    max_demand: f64,
    pf_adjustment: impl Fn(f64) -> f64,
) -> Charges {
    let energy_charge = total_energy * tariff.rate;
    let demand_charge = max_demand * tariff.demand_rate_per_kva;

    let slabs = if total_energy > 0.0 {
        vec![SlabBreakdownEntry {
            label: tariff.label.to_string(),
            units_billed: total_energy,
            rate: tariff.rate,
            amount: energy_charge,
        }]
    } else {
        Vec::new()
    };

    Charges {
        slabs,
        fixed_charge: tariff.fixed_charge,
        demand_charge,
        power_factor_adjustment: pf_adjustment(energy_charge + demand_charge),
        max_demand,
    }
}

/// Penalty only: 1% of the energy+demand subtotal per 0.01 below 0.85.
fn general_purpose_pf_adjustment(subtotal: f64, power_factor: f64) -> f64 {
    if power_factor < PF_PENALTY_BELOW {
        subtotal * (PF_PENALTY_BELOW - power_factor)
    } else {
        0.0
    }
}

/// Penalty below 0.85 at 1.5x, incentive (negative) above 0.90 at 0.5x.
fn industrial_pf_adjustment(subtotal: f64, power_factor: f64) -> f64 {
    if power_factor < PF_PENALTY_BELOW {
        subtotal * (PF_PENALTY_BELOW - power_factor) * INDUSTRIAL_PF_PENALTY_FACTOR
    } else if power_factor > INDUSTRIAL_PF_INCENTIVE_ABOVE {
        -subtotal * (power_factor - INDUSTRIAL_PF_INCENTIVE_ABOVE) * INDUSTRIAL_PF_INCENTIVE_FACTOR
    } else {
        0.0
    }
}
