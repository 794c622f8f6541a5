//! Type definitions for the propagation core.
//!
//! Contains the value types flowing through a query:
//! - [`Position`] and [`Scenario`], supplied fresh per evaluation
//! - [`ModelParameters`], validated once and shared read-only
//! - [`Algorithm`] selecting the propagation formula
//! - [`PropagationResult`], the value returned per query

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PropagationError;
use super::units;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Rounded speed of light used by older link-budget worksheets.
pub const LEGACY_SPEED_OF_LIGHT: f64 = 3.0e8;

/// Point in 3-D space, meters. `z` is the antenna height above ground.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One query: where the two antennas are and what is transmitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub transmitter_position: Position,
    pub receiver_position: Position,
    /// Transmit power at the antenna port, dBm.
    pub transmit_power_dbm: f64,
    /// Carrier frequency, Hz.
    pub frequency_hz: f64,
}

/// Which value of `c` converts frequency to wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedOfLight {
    /// 299 792 458 m/s.
    #[default]
    Precise,
    /// 3×10⁸ m/s, for reproducing results computed with the rounded value.
    Legacy,
}

impl SpeedOfLight {
    pub fn meters_per_second(self) -> f64 {
        match self {
            SpeedOfLight::Precise => SPEED_OF_LIGHT,
            SpeedOfLight::Legacy => LEGACY_SPEED_OF_LIGHT,
        }
    }
}

/// Propagation model configuration, validated at construction.
///
/// Gains are linear (dimensionless) factors. Use
/// [`ModelParameters::from_db_gains`] when the gains are known in dBi.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    system_loss: f64,
    min_distance: f64,
    antenna_gain_tx: f64,
    antenna_gain_rx: f64,
    speed_of_light: SpeedOfLight,
}

impl ModelParameters {
    /// Build and validate model parameters.
    ///
    /// # Errors
    ///
    /// - [`PropagationError::Domain`] if `min_distance` is not a positive finite number
    /// - [`PropagationError::Configuration`] if `system_loss < 1` or either
    ///   linear gain is not a positive finite number
    pub fn new(system_loss: f64, min_distance: f64, antenna_gain_tx: f64, antenna_gain_rx: f64) -> Result<Self, PropagationError> {
        if !min_distance.is_finite() || min_distance <= 0.0 {
            return Err(PropagationError::domain(format!("minimum distance must be positive, got {} m", min_distance)));
        }
        if !system_loss.is_finite() || system_loss < 1.0 {
            return Err(PropagationError::configuration(format!("system loss must be a linear factor >= 1, got {}", system_loss)));
        }
        for (name, gain) in [("transmitter", antenna_gain_tx), ("receiver", antenna_gain_rx)] {
            if !gain.is_finite() || gain <= 0.0 {
                return Err(PropagationError::configuration(format!("{} antenna gain must be a positive linear factor, got {}", name, gain)));
            }
        }
        Ok(Self {
            system_loss,
            min_distance,
            antenna_gain_tx,
            antenna_gain_rx,
            speed_of_light: SpeedOfLight::Precise,
        })
    }

    /// Same as [`ModelParameters::new`] with the antenna gains given in dBi.
    pub fn from_db_gains(system_loss: f64, min_distance: f64, antenna_gain_tx_db: f64, antenna_gain_rx_db: f64) -> Result<Self, PropagationError> {
        Self::new(system_loss, min_distance, units::db_to_linear(antenna_gain_tx_db), units::db_to_linear(antenna_gain_rx_db))
    }

    pub fn with_speed_of_light(mut self, speed_of_light: SpeedOfLight) -> Self {
        self.speed_of_light = speed_of_light;
        self
    }

    pub fn system_loss(&self) -> f64 {
        self.system_loss
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn antenna_gain_tx(&self) -> f64 {
        self.antenna_gain_tx
    }

    pub fn antenna_gain_rx(&self) -> f64 {
        self.antenna_gain_rx
    }

    pub fn speed_of_light(&self) -> SpeedOfLight {
        self.speed_of_light
    }
}

impl Default for ModelParameters {
    /// Unity gains, no system loss, 1 m minimum distance.
    fn default() -> Self {
        Self {
            system_loss: 1.0,
            min_distance: 1.0,
            antenna_gain_tx: 1.0,
            antenna_gain_rx: 1.0,
            speed_of_light: SpeedOfLight::Precise,
        }
    }
}

/// Propagation algorithm selected per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Friis free-space, 3-D distance, inverse-square law.
    #[default]
    FreeSpace,
    /// Free-space up to the crossover distance, two-ray ground reflection
    /// (inverse-fourth-power law) beyond it. Uses ground-plane distance.
    TwoRayGround,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::FreeSpace => write!(f, "free-space"),
            Algorithm::TwoRayGround => write!(f, "two-ray-ground"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free-space" | "freespace" | "friis" => Ok(Algorithm::FreeSpace),
            "two-ray-ground" | "tworayground" | "two-ray" => Ok(Algorithm::TwoRayGround),
            other => Err(format!("unknown algorithm '{}', expected 'free-space' or 'two-ray-ground'", other)),
        }
    }
}

/// Formula that actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    FreeSpace,
    TwoRayGround,
}

/// Outcome of a single propagation query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropagationResult {
    pub received_power_dbm: f64,
    pub received_power_w: f64,
    /// Distance used by the formula, after clamping to the minimum distance.
    pub distance_m: f64,
    pub regime: Regime,
}
