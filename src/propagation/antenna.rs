//! Scalar antenna gain models.
//!
//! Gains are resolved once per configuration into the linear factors stored
//! in [`ModelParameters`](super::types::ModelParameters). No radiation
//! pattern is modelled: every antenna is a single boresight gain figure.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::error::PropagationError;
use super::units;

/// Aperture efficiency assumed when a dish does not specify one.
pub const DEFAULT_DISH_EFFICIENCY: f64 = 0.6;

/// Antenna description as written in configuration files.
///
/// Tagged by `type`:
///
/// ```toml
/// [transmitter-antenna]
/// type = "parabolic"
/// diameter-m = 3.0
/// efficiency = 0.6
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AntennaSpec {
    /// 0 dBi.
    #[default]
    Isotropic,
    /// Explicit gain in dBi.
    Fixed {
        #[serde(rename = "gain-db")]
        gain_db: f64,
    },
    /// Parabolic reflector, gain `η × (π × D / λ)²`.
    Parabolic {
        #[serde(rename = "diameter-m")]
        diameter_m: f64,
        #[serde(default = "default_efficiency")]
        efficiency: f64,
    },
}

fn default_efficiency() -> f64 {
    DEFAULT_DISH_EFFICIENCY
}

impl AntennaSpec {
    /// Linear gain of this antenna at the given wavelength.
    ///
    /// # Errors
    ///
    /// [`PropagationError::Configuration`] for a dish whose diameter is not
    /// positive or whose efficiency is outside `(0, 1]`, or a non-finite
    /// fixed gain. [`PropagationError::Domain`] for a non-positive wavelength.
    pub fn linear_gain(&self, wavelength: f64) -> Result<f64, PropagationError> {
        match *self {
            AntennaSpec::Isotropic => Ok(1.0),
            AntennaSpec::Fixed { gain_db } => {
                if !gain_db.is_finite() {
                    return Err(PropagationError::configuration(format!("antenna gain must be finite, got {} dBi", gain_db)));
                }
                Ok(units::db_to_linear(gain_db))
            }
            AntennaSpec::Parabolic { diameter_m, efficiency } => parabolic_gain(diameter_m, efficiency, wavelength),
        }
    }

    /// Gain in dBi at the given wavelength.
    pub fn gain_db(&self, wavelength: f64) -> Result<f64, PropagationError> {
        units::linear_to_db(self.linear_gain(wavelength)?)
    }
}

/// Linear gain of a parabolic dish.
///
/// # Formula
///
/// ```text
/// G = η × (π × D / λ)²
/// ```
///
/// A 3 m dish at 60 % efficiency and 900 MHz gives roughly 26.8 dBi.
pub fn parabolic_gain(diameter_m: f64, efficiency: f64, wavelength: f64) -> Result<f64, PropagationError> {
    if !diameter_m.is_finite() || diameter_m <= 0.0 {
        return Err(PropagationError::configuration(format!("dish diameter must be positive, got {} m", diameter_m)));
    }
    if !(efficiency > 0.0 && efficiency <= 1.0) {
        return Err(PropagationError::configuration(format!("dish efficiency must be in (0, 1], got {}", efficiency)));
    }
    if !wavelength.is_finite() || wavelength <= 0.0 {
        return Err(PropagationError::domain(format!("wavelength must be positive, got {} m", wavelength)));
    }
    let aperture = PI * diameter_m / wavelength;
    Ok(efficiency * aperture * aperture)
}
