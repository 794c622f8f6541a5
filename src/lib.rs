//! Radio propagation-loss estimator.
//!
//! Computes the power received over a radio link from transmit power,
//! carrier frequency, antenna gains, heights, and separation, using either
//! the Friis free-space model or the two-ray ground-reflection model with a
//! crossover-distance switch.
//!
//! ## Module Organization
//!
//! - `propagation`: the pure computational core
//! - `sweep`: distance and antenna-height sweeps over the core
//! - `config`: TOML/JSON configuration loading and validation
//! - `report`: text and JSON rendering of sweep results

pub mod config;
pub mod propagation;
pub mod report;
pub mod sweep;

pub use config::{ConfigLoadError, EstimatorConfig};
pub use propagation::{Algorithm, ModelParameters, Position, PropagationError, PropagationResult, Scenario, received_power};
