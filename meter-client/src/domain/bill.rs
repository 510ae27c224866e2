use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::billing::BillingError;

/// Tariff category of a supply connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionCategory {
    Domestic,
    GeneralPurpose,
    Industrial,
}

impl ConnectionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::GeneralPurpose => "general-purpose",
            Self::Industrial => "industrial",
        }
    }
}

impl fmt::Display for ConnectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionCategory {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "domestic" => Ok(Self::Domestic),
            "general-purpose" => Ok(Self::GeneralPurpose),
            "industrial" => Ok(Self::Industrial),
            _ => Err(BillingError::InvalidCategory(s.to_string())),
        }
    }
}

/// Inbound bill request as received at the service boundary.
///
/// The category is kept as text so that an unknown value surfaces as
/// [`BillingError::InvalidCategory`] from the engine rather than as a
/// deserialization failure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRequest {
    pub total_energy: f64,
    pub connection_category: String,
    #[serde(default, rename = "maxDemandKVA", alias = "maxDemand")]
    pub max_demand: Option<f64>,
    #[serde(default, alias = "powerFactor")]
    pub average_power_factor: Option<f64>,
}

impl BillRequest {
    pub fn new(total_energy: f64, category: ConnectionCategory) -> Self {
        Self {
            total_energy,
            connection_category: category.as_str().to_string(),
            max_demand: None,
            average_power_factor: None,
        }
    }

    pub fn with_max_demand(mut self, kva: f64) -> Self {
        self.max_demand = Some(kva);
        self
    }

    pub fn with_power_factor(mut self, pf: f64) -> Self {
        self.average_power_factor = Some(pf);
        self
    }
}

/// One billed slab, in ascending slab order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabBreakdownEntry {
    pub label: String,
    /// Unrounded, so the entries sum back to the billed energy. Only
    /// `amount` is rounded to cents; a slab filled by a remainder such as
    /// 30.01 - 30 can carry float noise (0.010000000000001563).
    pub units_billed: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: Date,
    pub cost: f64,
}

/// Outbound bill. Field names follow the REST contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub total_amount: f64,
    pub category: ConnectionCategory,
    #[serde(rename = "breakdown")]
    pub slab_breakdown: Vec<SlabBreakdownEntry>,
    #[serde(rename = "fixedCharges")]
    pub fixed_charge: f64,
    #[serde(rename = "demandCharges")]
    pub demand_charge: f64,
    pub power_factor_adjustment: f64,
    #[serde(rename = "maxDemandKVA")]
    pub max_demand: f64,
    pub power_factor: f64,
    pub daily_costs: Vec<DailyCost>,
}

impl Bill {
    /// Sum of the energy slab amounts.
    pub fn energy_charge(&self) -> f64 {
        self.slab_breakdown.iter().map(|s| s.amount).sum()
    }
}
