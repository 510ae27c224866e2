//! Rule-based usage insights.
//!
//! Rules, evaluated in this order and independently of each other:
//! 1. energy trend beyond +/-15% of the prior period
//! 2. night base load above 1.5 kW
//! 3. minimum voltage below 207 V (90% of 230 V)
//! 4. maximum voltage above 253 V (110% of 230 V)
//! 5. power factor below 0.85, or above 0.95
//! 6. peak demand above 5 kW
//! 7. voltage swing wider than 15 V
//!
//! When nothing fires a single "all normal" insight is returned.

mod budget;
mod phase;

pub use budget::check_budget_status;
pub use phase::{detect_phase_imbalance, phase_imbalance_from};

use crate::{
    domain::{Insight, Severity, UsageStats},
    numeric::percent_change,
};

/// Thresholds used by the insight rules. These are separate from the
/// billing power-factor thresholds.
pub mod thresholds {
    pub const TREND_PERCENT: f64 = 15.0;
    pub const NIGHT_LOAD_KW: f64 = 1.5;
    /// 90% of the 230 V nominal.
    pub const MIN_SAFE_VOLTAGE: f64 = 207.0;
    /// 110% of the 230 V nominal.
    pub const MAX_SAFE_VOLTAGE: f64 = 253.0;
    pub const LOW_POWER_FACTOR: f64 = 0.85;
    pub const EXCELLENT_POWER_FACTOR: f64 = 0.95;
    pub const PEAK_POWER_W: f64 = 5000.0;
    pub const VOLTAGE_SWING_V: f64 = 15.0;
}

use thresholds::*;

fn has_reading(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

pub fn generate_insights(stats: &UsageStats) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(diff) = percent_change(stats.current_energy_kwh, stats.prior_energy_kwh) {
        if diff > TREND_PERCENT {
            insights.push(Insight::new(
                Severity::Warning,
                "trending-up",
                format!("Energy use is up {:.0}% compared to the previous period.", diff),
            ));
        } else if diff < -TREND_PERCENT {
            insights.push(Insight::new(
                Severity::Info,
                "trending-down",
                format!("Energy use is down {:.0}% compared to the previous period.", diff.abs()),
            ));
        }
    }

    if stats.night_load_kw.is_finite() && stats.night_load_kw > NIGHT_LOAD_KW {
        insights.push(Insight::new(
            Severity::Info,
            "moon",
            format!(
                "Night-time base load averages {:.2} kW. Check for appliances left running overnight.",
                stats.night_load_kw
            ),
        ));
    }

    if has_reading(stats.min_voltage) && stats.min_voltage < MIN_SAFE_VOLTAGE {
        insights.push(Insight::new(
            Severity::Critical,
            "voltage-low",
            format!(
                "Voltage dropped to {:.1} V, below the {:.0} V safety limit.",
                stats.min_voltage, MIN_SAFE_VOLTAGE
            ),
        ));
    }

    if has_reading(stats.max_voltage) && stats.max_voltage > MAX_SAFE_VOLTAGE {
        insights.push(Insight::new(
            Severity::Critical,
            "voltage-high",
            format!(
                "Voltage rose to {:.1} V, above the {:.0} V safety limit.",
                stats.max_voltage, MAX_SAFE_VOLTAGE
            ),
        ));
    }

    if has_reading(stats.power_factor) {
        if stats.power_factor < LOW_POWER_FACTOR {
            insights.push(Insight::new(
                Severity::Warning,
                "power-factor",
                format!(
                    "Power factor is {:.2}. Reactive loads are wasting capacity and may be penalised.",
                    stats.power_factor
                ),
            ));
        } else if stats.power_factor > EXCELLENT_POWER_FACTOR {
            insights.push(Insight::new(
                Severity::Info,
                "power-factor",
                format!("Power factor is excellent at {:.2}.", stats.power_factor),
            ));
        }
    }

    if stats.peak_power_w.is_finite() && stats.peak_power_w > PEAK_POWER_W {
        insights.push(Insight::new(
            Severity::Warning,
            "peak",
            format!(
                "Peak demand reached {:.2} kW. Staggering heavy appliances lowers demand charges.",
                stats.peak_power_w / 1000.0
            ),
        ));
    }

    if has_reading(stats.min_voltage) && has_reading(stats.max_voltage) {
        let swing = stats.max_voltage - stats.min_voltage;
        if swing > VOLTAGE_SWING_V {
            insights.push(Insight::new(
                Severity::Warning,
                "voltage-swing",
                format!(
                    "Voltage is unstable: {:.1} V \u{b1}{:.1} V.",
                    stats.average_voltage,
                    swing / 2.0
                ),
            ));
        }
    }

    if insights.is_empty() {
        insights.push(Insight::new(
            Severity::Info,
            "check",
            "All readings are within normal ranges.",
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_stats() -> UsageStats {
        UsageStats {
            current_energy_kwh: 100.0,
            prior_energy_kwh: 98.0,
            average_voltage: 231.0,
            min_voltage: 226.0,
            max_voltage: 236.0,
            night_load_kw: 0.4,
            peak_power_w: 3200.0,
            power_factor: 0.92,
        }
    }

    fn icons(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.icon.as_str()).collect()
    }

    #[test]
    fn stable_stats_yield_single_normal_insight() {
        let insights = generate_insights(&normal_stats());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Info);
        assert_eq!(insights[0].icon, "check");
    }

    #[test]
    fn energy_increase_is_a_warning() {
        let stats = UsageStats {
            current_energy_kwh: 100.0,
            prior_energy_kwh: 80.0,
            ..normal_stats()
        };
        let insights = generate_insights(&stats);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Warning);
        assert!(insights[0].message.contains("25%"));
    }

    #[test]
    fn energy_decrease_is_info() {
        let stats = UsageStats {
            current_energy_kwh: 80.0,
            prior_energy_kwh: 100.0,
            ..normal_stats()
        };
        let insights = generate_insights(&stats);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Info);
        assert_eq!(insights[0].icon, "trending-down");
        assert!(insights[0].message.contains("20%"));
    }

    #[test]
    fn zero_prior_energy_skips_trend() {
        let stats = UsageStats {
            prior_energy_kwh: 0.0,
            ..normal_stats()
        };
        assert_eq!(icons(&generate_insights(&stats)), vec!["check"]);
    }

    #[test]
    fn voltage_excursions_raise_both_criticals_and_swing() {
        let stats = UsageStats {
            min_voltage: 200.0,
            max_voltage: 260.0,
            ..normal_stats()
        };
        let insights = generate_insights(&stats);
        assert_eq!(icons(&insights), vec!["voltage-low", "voltage-high", "voltage-swing"]);
        assert_eq!(insights[0].severity, Severity::Critical);
        assert_eq!(insights[1].severity, Severity::Critical);
        assert_eq!(insights[2].severity, Severity::Warning);
        assert!(insights[2].message.contains("\u{b1}30.0 V"));
    }

    #[test]
    fn power_factor_rules() {
        let low = UsageStats {
            power_factor: 0.80,
            ..normal_stats()
        };
        let insights = generate_insights(&low);
        assert_eq!(insights[0].severity, Severity::Warning);
        assert_eq!(insights[0].icon, "power-factor");

        let high = UsageStats {
            power_factor: 0.97,
            ..normal_stats()
        };
        let insights = generate_insights(&high);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Info);
        assert_eq!(insights[0].icon, "power-factor");
    }

    #[test]
    fn rules_fire_in_fixed_order() {
        let stats = UsageStats {
            current_energy_kwh: 150.0,
            prior_energy_kwh: 100.0,
            average_voltage: 230.0,
            min_voltage: 205.0,
            max_voltage: 255.0,
            night_load_kw: 2.0,
            peak_power_w: 7200.0,
            power_factor: 0.7,
        };
        assert_eq!(
            icons(&generate_insights(&stats)),
            vec!["trending-up", "moon", "voltage-low", "voltage-high", "power-factor", "peak", "voltage-swing"]
        );
    }

    #[test]
    fn zeroed_stats_degrade_to_normal() {
        let insights = generate_insights(&UsageStats::default());
        assert_eq!(icons(&insights), vec!["check"]);
    }

    #[test]
    fn non_finite_stats_never_trigger() {
        let stats = UsageStats {
            current_energy_kwh: f64::NAN,
            prior_energy_kwh: 100.0,
            average_voltage: f64::NAN,
            min_voltage: f64::NAN,
            max_voltage: f64::INFINITY,
            night_load_kw: f64::NAN,
            peak_power_w: f64::INFINITY,
            power_factor: f64::NAN,
        };
        assert_eq!(icons(&generate_insights(&stats)), vec!["check"]);
    }
}
