//! Power unit conversions and numeric rounding.
//!
//! Contains helpers for:
//! - dBm ⇄ watts (the model computes in watts, reports in dBm)
//! - dBm ⇄ dBW
//! - dB ⇄ linear ratios (antenna gains, losses)
//! - Rounding to a precision, half away from zero
//!
//! All functions are stateless. Conversions whose logarithm would be
//! undefined return [`PropagationError::Domain`] instead of NaN or -∞.

use super::error::PropagationError;

/// Convert power from dBm (decibels relative to 1 milliwatt) to watts.
///
/// # Formula
///
/// ```text
/// P(W) = 10^(P(dBm) / 10) / 1000
/// ```
///
/// # Examples
///
/// ```text
/// 30 dBm  → 1 W
/// 0 dBm   → 0.001 W
/// -30 dBm → 1 µW
/// ```
///
/// Total for every finite input. The result is positive down to roughly
/// -3200 dBm; below that it underflows to `0.0`.
pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0) / 1000.0
}

/// Convert power from watts to dBm.
///
/// # Formula
///
/// ```text
/// P(dBm) = 10 × log₁₀(P(W) × 1000)
/// ```
///
/// # Errors
///
/// [`PropagationError::Domain`] when `watts <= 0` or is NaN, since the
/// logarithm is undefined there.
pub fn watts_to_dbm(watts: f64) -> Result<f64, PropagationError> {
    if watts.is_nan() || watts <= 0.0 {
        return Err(PropagationError::domain(format!("cannot express {} W in dBm: power must be positive", watts)));
    }
    Ok(10.0 * (watts * 1000.0).log10())
}

/// dBm → dBW (1 W = 30 dBm).
pub fn dbm_to_dbw(dbm: f64) -> f64 {
    dbm - 30.0
}

/// dBW → dBm.
pub fn dbw_to_dbm(dbw: f64) -> f64 {
    dbw + 30.0
}

/// Convert a decibel ratio (gain or loss) to its linear factor.
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Convert a linear power ratio to decibels.
///
/// Fails with [`PropagationError::Domain`] for non-positive ratios.
pub fn linear_to_db(ratio: f64) -> Result<f64, PropagationError> {
    if ratio.is_nan() || ratio <= 0.0 {
        return Err(PropagationError::domain(format!("cannot express ratio {} in dB: ratio must be positive", ratio)));
    }
    Ok(10.0 * ratio.log10())
}

/// Round `value` to the nearest multiple of `precision`.
///
/// Halves are rounded away from zero, so negative values round
/// symmetrically with positive ones: `-0.257` at `0.1` becomes `-0.3`,
/// not `-0.2`.
///
/// ```text
/// round_to_precision(0.234, 0.1)  → 0.2
/// round_to_precision(0.257, 0.1)  → 0.3
/// round_to_precision(-0.257, 0.1) → -0.3
/// ```
///
/// # Errors
///
/// [`PropagationError::Domain`] when `precision` is zero or not finite.
pub fn round_to_precision(value: f64, precision: f64) -> Result<f64, PropagationError> {
    if precision == 0.0 || !precision.is_finite() {
        return Err(PropagationError::domain(format!("rounding precision must be finite and non-zero, got {}", precision)));
    }
    // f64::round already rounds half away from zero.
    Ok((value / precision).round() * precision)
}
