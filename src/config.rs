//! Configuration loading and validation.
//!
//! A configuration file describes one link (frequency, power, antennas,
//! heights, losses), the algorithm to use, and the sweeps to run over it.
//! TOML is the primary format; a `.json` extension selects JSON instead.
//! Every key is optional and defaults to the reference 900 MHz / 50 W link.
//!
//! ```toml
//! frequency-hz = 900e6
//! transmit-power-dbm = 46.99
//! algorithm = "two-ray-ground"
//! transmitter-height-m = 50.0
//! receiver-height-m = 2.0
//!
//! [sweep]
//! start = 200.0
//! end = 2000.0
//! step = 200.0
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::propagation::clearance::ClearanceLink;
use crate::propagation::{Algorithm, AntennaSpec, ModelParameters, Position, PropagationError, PropagationResult, Scenario, SpeedOfLight, received_power, units, wavelength};
use crate::sweep::{HeightGrid, LinkSetup, SweepRange};

/// Carrier-sense threshold drawn alongside sweep results, dBm.
pub const DEFAULT_CS_THRESHOLD_DBM: f64 = -94.0;

/// Below this many wavelengths the far-field Friis formula is unreliable.
const NEAR_FIELD_WAVELENGTHS: f64 = 3.0;

/// Error type for configuration loading failures.
#[derive(Debug)]
pub enum ConfigLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(PropagationError),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::FileReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigLoadError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigLoadError::ValidationError(err) => write!(f, "Invalid configuration: {}", err),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::ValidationError(err) => Some(err),
            _ => None,
        }
    }
}

/// Full estimator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Carrier frequency, Hz.
    pub frequency_hz: f64,
    /// Transmit power at the antenna port, dBm.
    pub transmit_power_dbm: f64,
    /// Linear system loss factor (≥ 1).
    pub system_loss: f64,
    /// Transmitter antenna gain, dBi. Ignored when `transmitter-antenna` is set.
    pub antenna_gain_tx_db: f64,
    /// Receiver antenna gain, dBi. Ignored when `receiver-antenna` is set.
    pub antenna_gain_rx_db: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmitter_antenna: Option<AntennaSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_antenna: Option<AntennaSpec>,
    pub transmitter_height_m: f64,
    pub receiver_height_m: f64,
    /// Distances below this are clamped, meters.
    pub min_distance_m: f64,
    pub algorithm: Algorithm,
    pub speed_of_light: SpeedOfLight,
    /// Reference line for reports; `None` disables it.
    pub cs_threshold_dbm: Option<f64>,
    pub sweep: SweepRange,
    pub height_grid: HeightGrid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearance: Option<ClearanceLink>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 900e6,
            // 50 W
            transmit_power_dbm: 10.0 * 50_000f64.log10(),
            system_loss: 1.0,
            antenna_gain_tx_db: 0.0,
            antenna_gain_rx_db: 0.0,
            transmitter_antenna: None,
            receiver_antenna: None,
            transmitter_height_m: 50.0,
            receiver_height_m: 2.0,
            min_distance_m: 1.0,
            algorithm: Algorithm::FreeSpace,
            speed_of_light: SpeedOfLight::Precise,
            cs_threshold_dbm: Some(DEFAULT_CS_THRESHOLD_DBM),
            sweep: SweepRange::default(),
            height_grid: HeightGrid::default(),
            clearance: None,
        }
    }
}

impl EstimatorConfig {
    /// Load and validate a configuration file.
    ///
    /// # Parameters
    ///
    /// * `path` - Path to a `.toml` or `.json` file
    ///
    /// # Returns
    ///
    /// The parsed configuration, already validated with
    /// [`EstimatorConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigLoadError::FileReadError(format!("{}: {}", path.display(), e)))?;

        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json { Self::from_json_str(&content)? } else { Self::from_toml_str(&content)? };

        config.validate().map_err(ConfigLoadError::ValidationError)?;
        info!("Loaded configuration from {} ({} at {} Hz)", path.display(), config.algorithm, config.frequency_hz);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        toml::from_str(content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigLoadError> {
        serde_json::from_str(content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))
    }

    /// Check everything a sweep over this configuration needs, once.
    ///
    /// Builds the model parameters, checks frequency and power, and for the
    /// two-ray algorithm requires both antennas above ground. The sweep
    /// range is validated here too so a bad range fails before any output.
    pub fn validate(&self) -> Result<(), PropagationError> {
        let lambda = wavelength(self.frequency_hz, self.speed_of_light)?;
        if !self.transmit_power_dbm.is_finite() {
            return Err(PropagationError::domain(format!("transmit power must be finite, got {} dBm", self.transmit_power_dbm)));
        }
        self.model_parameters()?;
        if self.algorithm == Algorithm::TwoRayGround && !(self.transmitter_height_m > 0.0 && self.receiver_height_m > 0.0) {
            return Err(PropagationError::domain(format!(
                "two-ray ground model requires antennas above ground, got h_t = {} m, h_r = {} m",
                self.transmitter_height_m, self.receiver_height_m
            )));
        }
        self.sweep.validate("distance")?;
        if self.cs_threshold_dbm.is_some_and(|threshold| !threshold.is_finite()) {
            return Err(PropagationError::configuration("carrier-sense threshold must be finite"));
        }

        if self.algorithm == Algorithm::FreeSpace && self.sweep.start < NEAR_FIELD_WAVELENGTHS * lambda {
            warn!(
                "Sweep starts at {} m, inside the near field ({:.3} m) where the free-space model is not accurate",
                self.sweep.start,
                NEAR_FIELD_WAVELENGTHS * lambda
            );
        }
        Ok(())
    }

    /// Resolve antenna gains at the configured frequency and build the
    /// read-only model parameters.
    pub fn model_parameters(&self) -> Result<ModelParameters, PropagationError> {
        let lambda = wavelength(self.frequency_hz, self.speed_of_light)?;
        let gain_tx = resolve_gain(self.transmitter_antenna, self.antenna_gain_tx_db, lambda)?;
        let gain_rx = resolve_gain(self.receiver_antenna, self.antenna_gain_rx_db, lambda)?;
        Ok(ModelParameters::new(self.system_loss, self.min_distance_m, gain_tx, gain_rx)?.with_speed_of_light(self.speed_of_light))
    }

    /// Received power between two explicit positions.
    ///
    /// Only the link parameters are checked; the configured heights and
    /// sweep ranges play no part, and the positions are judged by the model.
    pub fn received_power_between(&self, transmitter: Position, receiver: Position) -> Result<PropagationResult, PropagationError> {
        let params = self.model_parameters()?;
        let scenario = Scenario {
            transmitter_position: transmitter,
            receiver_position: receiver,
            transmit_power_dbm: self.transmit_power_dbm,
            frequency_hz: self.frequency_hz,
        };
        received_power(&scenario, &params, self.algorithm)
    }

    pub fn link_setup(&self) -> LinkSetup {
        LinkSetup {
            transmit_power_dbm: self.transmit_power_dbm,
            frequency_hz: self.frequency_hz,
            transmitter_height_m: self.transmitter_height_m,
            receiver_height_m: self.receiver_height_m,
        }
    }
}

fn resolve_gain(antenna: Option<AntennaSpec>, gain_db: f64, wavelength: f64) -> Result<f64, PropagationError> {
    match antenna {
        Some(spec) => spec.linear_gain(wavelength),
        None => {
            if !gain_db.is_finite() {
                return Err(PropagationError::configuration(format!("antenna gain must be finite, got {} dBi", gain_db)));
            }
            Ok(units::db_to_linear(gain_db))
        }
    }
}
