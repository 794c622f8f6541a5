//! Radio propagation core.
//!
//! Pure computation with no I/O and no shared mutable state:
//! - `units`: dBm/dBW/watt conversions and rounding
//! - `model`: Friis free-space and two-ray ground received power
//! - `geometry`: slant and ground-plane distances
//! - `antenna`: scalar antenna gain models
//! - `clearance`: Fresnel-zone antenna height planning
//! - `types`: scenario, parameters, and result types
//! - `error`: the [`PropagationError`] type
//!
//! Every function here is deterministic and safe to call concurrently;
//! [`ModelParameters`] is immutable once built.

pub mod antenna;
pub mod clearance;
pub mod error;
pub mod geometry;
pub mod model;
pub mod types;
pub mod units;

pub use antenna::AntennaSpec;
pub use error::PropagationError;
pub use model::{crossover_distance, received_power, wavelength};
pub use types::{Algorithm, ModelParameters, Position, PropagationResult, Regime, Scenario, SpeedOfLight};
