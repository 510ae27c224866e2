use crate::{
    domain::{Insight, PhaseContribution, Severity},
    numeric::percent_of,
};

/// Largest allowed deviation of a single phase from the per-phase average.
pub const PHASE_IMBALANCE_PERCENT: f64 = 15.0;

/// Check three per-phase contribution percentages for imbalance.
///
/// Returns a warning when the most deviating phase is more than 15% away
/// from the average contribution. A zero or non-finite average yields `None`.
pub fn detect_phase_imbalance(p1: f64, p2: f64, p3: f64) -> Option<Insight> {
    imbalance([(1, p1), (2, p2), (3, p3)])
}

/// Same as [`detect_phase_imbalance`], labelling phases by their `phase_id`.
pub fn phase_imbalance_from(phases: &[PhaseContribution; 3]) -> Option<Insight> {
    imbalance((*phases).map(|p| (p.phase_id, p.contribution_percent)))
}

fn imbalance(phases: [(u8, f64); 3]) -> Option<Insight> {
    let average = phases.iter().map(|(_, pct)| pct).sum::<f64>() / 3.0;

    let (worst_phase, max_deviation) = phases
        .iter()
        .map(|(id, pct)| (*id, (pct - average).abs()))
        .fold((0u8, 0.0f64), |worst, cur| if cur.1 > worst.1 { cur } else { worst });

    let deviation_percent = percent_of(max_deviation, average)?;
    if deviation_percent <= PHASE_IMBALANCE_PERCENT {
        return None;
    }

    Some(Insight::new(
        Severity::Warning,
        "phase-imbalance",
        format!(
            "Phase load is unbalanced: phase {} deviates {:.1}% from the average. \
             Consider moving single-phase loads to another phase.",
            worst_phase, deviation_percent
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skewed_phases_raise_warning() {
        let insight = detect_phase_imbalance(40.0, 30.0, 30.0).expect("imbalance expected");
        assert_eq!(insight.severity, Severity::Warning);
        assert!(insight.message.contains("phase 1"));
        assert!(insight.message.contains("20.0%"));
    }

    #[test]
    fn near_even_phases_are_fine() {
        assert!(detect_phase_imbalance(34.0, 33.0, 33.0).is_none());
        assert!(detect_phase_imbalance(33.34, 33.33, 33.33).is_none());
    }

    #[test]
    fn deviation_of_exactly_fifteen_percent_is_tolerated() {
        // average 20, phase 1 off by 3
        assert!(detect_phase_imbalance(23.0, 18.5, 18.5).is_none());
        assert!(detect_phase_imbalance(23.1, 18.45, 18.45).is_some());
    }

    #[test]
    fn zero_or_non_finite_contributions_yield_nothing() {
        assert!(detect_phase_imbalance(0.0, 0.0, 0.0).is_none());
        assert!(detect_phase_imbalance(f64::NAN, 30.0, 30.0).is_none());
    }

    #[test]
    fn labels_phase_by_id() {
        let phases = [
            PhaseContribution { phase_id: 1, contribution_percent: 25.0, voltage: 230.0, current: 4.0, power: 900.0 },
            PhaseContribution { phase_id: 2, contribution_percent: 25.0, voltage: 229.0, current: 4.0, power: 900.0 },
            PhaseContribution { phase_id: 3, contribution_percent: 50.0, voltage: 228.0, current: 8.0, power: 1800.0 },
        ];
        let insight = phase_imbalance_from(&phases).unwrap();
        assert!(insight.message.contains("phase 3"));
    }
}
