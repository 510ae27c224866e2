//! Rounding and ratio helpers shared by the billing and insights engines.

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change from `prior` to `current`.
///
/// Returns `None` when `prior` is not a positive finite number, so callers
/// never see `NaN` or infinities.
pub fn percent_change(current: f64, prior: f64) -> Option<f64> {
    if !current.is_finite() {
        return None;
    }
    percent_of(current - prior, prior)
}

/// `part` expressed as a percentage of `whole`, guarded like [`percent_change`].
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if !part.is_finite() || !whole.is_finite() || whole <= 0.0 {
        return None;
    }
    Some(part / whole * 100.0)
}
