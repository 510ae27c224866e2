use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// A single human-readable alert produced by the insights engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub message: String,
    pub severity: Severity,
    pub icon: String,
}

impl Insight {
    pub fn new(severity: Severity, icon: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            icon: icon.to_string(),
        }
    }
}

/// Aggregated statistics for one meter over one reporting window.
///
/// Voltages are in volts, loads in kW / W as named.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStats {
    #[serde(rename = "currentEnergyKWh")]
    pub current_energy_kwh: f64,
    #[serde(rename = "priorEnergyKWh")]
    pub prior_energy_kwh: f64,
    pub average_voltage: f64,
    pub min_voltage: f64,
    pub max_voltage: f64,
    #[serde(rename = "nightLoadKW")]
    pub night_load_kw: f64,
    #[serde(rename = "peakPowerW")]
    pub peak_power_w: f64,
    pub power_factor: f64,
}

/// Share of the metered load carried by one phase of a three-phase supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseContribution {
    pub phase_id: u8,
    pub contribution_percent: f64,
    #[serde(default)]
    pub voltage: f64,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub power: f64,
}
