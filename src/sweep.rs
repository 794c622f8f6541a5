//! Sweep drivers feeding scenarios to the propagation model.
//!
//! A sweep is an ordered sequence of independent queries. Configuration is
//! validated once up front; the first failing point aborts the whole sweep,
//! since a bad configuration affects every point identically.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::propagation::{Algorithm, ModelParameters, Position, PropagationError, Regime, Scenario, received_power};

/// Tolerance (relative to the step) for including the end of a range.
const RANGE_END_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of values one range may expand to.
pub const MAX_RANGE_POINTS: usize = 10_000_000;

/// Inclusive arithmetic range `start, start + step, ..., ≤ end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub const fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Check the range is a positive, non-empty, forward range of at most
    /// [`MAX_RANGE_POINTS`] values.
    pub fn validate(&self, what: &str) -> Result<(), PropagationError> {
        if !self.start.is_finite() || !self.end.is_finite() || !self.step.is_finite() {
            return Err(PropagationError::configuration(format!("{} range must be finite", what)));
        }
        if self.start <= 0.0 {
            return Err(PropagationError::configuration(format!("{} range must start above zero, got {}", what, self.start)));
        }
        if self.end < self.start {
            return Err(PropagationError::configuration(format!("{} range ends ({}) before it starts ({})", what, self.end, self.start)));
        }
        if self.step <= 0.0 {
            return Err(PropagationError::configuration(format!("{} range step must be positive, got {}", what, self.step)));
        }
        let span = (self.end - self.start) / self.step;
        if !span.is_finite() || span >= MAX_RANGE_POINTS as f64 {
            return Err(PropagationError::configuration(format!(
                "{} range {}..{} in steps of {} exceeds {} points",
                what, self.start, self.end, self.step, MAX_RANGE_POINTS
            )));
        }
        Ok(())
    }

    /// Values of the range in ascending order.
    ///
    /// Each value is computed as `start + i × step` so rounding error does
    /// not accumulate along the range. A range that fails
    /// [`SweepRange::validate`] yields at most [`MAX_RANGE_POINTS`] values,
    /// or none when it runs backwards or is not finite.
    pub fn values(&self) -> Vec<f64> {
        let steps = ((self.end - self.start) / self.step + RANGE_END_TOLERANCE).floor();
        if !(steps >= 0.0) {
            return Vec::new();
        }
        let count = if steps < MAX_RANGE_POINTS as f64 { steps as usize + 1 } else { MAX_RANGE_POINTS };
        (0..count).map(|i| self.start + i as f64 * self.step).collect()
    }

    /// True when `end` is not reached exactly by whole steps.
    pub fn is_ragged(&self) -> bool {
        let span = (self.end - self.start) / self.step;
        (span - span.round()).abs() > RANGE_END_TOLERANCE
    }
}

impl Default for SweepRange {
    /// 200 m to 2000 m in 200 m steps.
    fn default() -> Self {
        Self::new(200.0, 2000.0, 200.0)
    }
}

/// Transmit-side settings shared by every point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSetup {
    pub transmit_power_dbm: f64,
    pub frequency_hz: f64,
    pub transmitter_height_m: f64,
    pub receiver_height_m: f64,
}

impl LinkSetup {
    /// Transmitter at the origin, receiver `distance` meters along x.
    pub fn scenario_at(&self, distance: f64) -> Scenario {
        self.scenario_with_heights(distance, self.transmitter_height_m, self.receiver_height_m)
    }

    fn scenario_with_heights(&self, distance: f64, tx_height: f64, rx_height: f64) -> Scenario {
        Scenario {
            transmitter_position: Position::new(0.0, 0.0, tx_height),
            receiver_position: Position::new(distance, 0.0, rx_height),
            transmit_power_dbm: self.transmit_power_dbm,
            frequency_hz: self.frequency_hz,
        }
    }
}

/// One evaluated sweep point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub distance_m: f64,
    pub received_power_dbm: f64,
    pub regime: Regime,
}

/// Evaluate `(distance, scenario)` pairs, reporting in ascending distance.
///
/// The distance label is the caller's; it is what gets reported, while the
/// model measures the scenario's own geometry.
pub fn evaluate<I>(pairs: I, params: &ModelParameters, algorithm: Algorithm) -> Result<Vec<SweepPoint>, PropagationError>
where
    I: IntoIterator<Item = (f64, Scenario)>,
{
    let mut points = pairs
        .into_iter()
        .map(|(distance_m, scenario)| {
            let result = received_power(&scenario, params, algorithm)?;
            Ok(SweepPoint {
                distance_m,
                received_power_dbm: result.received_power_dbm,
                regime: result.regime,
            })
        })
        .collect::<Result<Vec<_>, PropagationError>>()?;
    points.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    Ok(points)
}

/// Run a distance sweep for a fixed link setup.
pub fn distance_sweep(range: &SweepRange, link: &LinkSetup, params: &ModelParameters, algorithm: Algorithm) -> Result<Vec<SweepPoint>, PropagationError> {
    range.validate("distance")?;
    let distances = range.values();
    if range.is_ragged() {
        let last = distances.last().copied().unwrap_or(range.start);
        warn!("Distance step {} m does not divide {}..{} m, sweep stops at {} m", range.step, range.start, range.end, last);
    }
    debug!("Sweeping {} distances from {} m to {} m with {}", distances.len(), range.start, range.end, algorithm);
    evaluate(distances.into_iter().map(|d| (d, link.scenario_at(d))), params, algorithm)
}

/// Antenna-height grid evaluated at one separation distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HeightGrid {
    pub distance_m: f64,
    pub transmitter_heights: SweepRange,
    pub receiver_heights: SweepRange,
}

impl Default for HeightGrid {
    /// 1 km link, h_t 10..50 m by 10, h_r 1..5 m by 1.
    fn default() -> Self {
        Self {
            distance_m: 1000.0,
            transmitter_heights: SweepRange::new(10.0, 50.0, 10.0),
            receiver_heights: SweepRange::new(1.0, 5.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeightGridPoint {
    pub transmitter_height_m: f64,
    pub receiver_height_m: f64,
    pub received_power_dbm: f64,
    pub regime: Regime,
}

/// Evaluate the two-ray ground model over every `(h_t, h_r)` pair.
///
/// Rows are ordered by transmitter height, then receiver height, both
/// ascending. The heights in `link` are ignored.
pub fn height_grid(grid: &HeightGrid, link: &LinkSetup, params: &ModelParameters) -> Result<Vec<HeightGridPoint>, PropagationError> {
    grid.transmitter_heights.validate("transmitter height")?;
    grid.receiver_heights.validate("receiver height")?;
    if !(grid.distance_m > 0.0) {
        return Err(PropagationError::configuration(format!("height grid distance must be positive, got {} m", grid.distance_m)));
    }

    let rx_heights = grid.receiver_heights.values();
    let mut points = Vec::new();
    for ht in grid.transmitter_heights.values() {
        for &hr in &rx_heights {
            let scenario = link.scenario_with_heights(grid.distance_m, ht, hr);
            let result = received_power(&scenario, params, Algorithm::TwoRayGround)?;
            points.push(HeightGridPoint {
                transmitter_height_m: ht,
                receiver_height_m: hr,
                received_power_dbm: result.received_power_dbm,
                regime: result.regime,
            });
        }
    }
    debug!("Evaluated {} height pairs at {} m", points.len(), grid.distance_m);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::units;
    use approx::assert_relative_eq;

    fn legacy_link() -> LinkSetup {
        LinkSetup {
            transmit_power_dbm: units::watts_to_dbm(50.0).unwrap(),
            frequency_hz: 900e6,
            transmitter_height_m: 50.0,
            receiver_height_m: 2.0,
        }
    }

    #[test]
    fn range_values_include_end() {
        let values = SweepRange::default().values();
        assert_eq!(values.len(), 10);
        assert_eq!(values[0], 200.0);
        assert_eq!(values[9], 2000.0);
        assert!(!SweepRange::default().is_ragged());

        let tenths = SweepRange::new(0.1, 1.0, 0.1).values();
        assert_eq!(tenths.len(), 10);
        assert_relative_eq!(*tenths.last().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ragged_range_stops_before_end() {
        let range = SweepRange::new(100.0, 1000.0, 200.0);
        assert!(range.is_ragged());
        assert_eq!(range.values(), vec![100.0, 300.0, 500.0, 700.0, 900.0]);
        assert_eq!(SweepRange::new(5.0, 5.0, 1.0).values(), vec![5.0]);
    }

    #[test]
    fn invalid_ranges_are_configuration_errors() {
        assert!(SweepRange::new(0.0, 10.0, 1.0).validate("distance").unwrap_err().is_configuration());
        assert!(SweepRange::new(10.0, 5.0, 1.0).validate("distance").unwrap_err().is_configuration());
        assert!(SweepRange::new(1.0, 5.0, 0.0).validate("distance").unwrap_err().is_configuration());
        assert!(SweepRange::new(1.0, f64::INFINITY, 1.0).validate("distance").unwrap_err().is_configuration());
    }

    #[test]
    fn oversized_ranges_are_rejected_before_expansion() {
        assert!(SweepRange::new(200.0, 2000.0, 1e-300).validate("distance").unwrap_err().is_configuration());
        assert!(SweepRange::new(200.0, 2000.0, 1e-6).validate("distance").unwrap_err().is_configuration());
        assert!(SweepRange::new(1.0, 2.0, 1e-8).validate("transmitter height").is_err());
        assert!(SweepRange::new(1.0, 1000.0, 1e-3).validate("distance").is_ok());

        let err = distance_sweep(&SweepRange::new(200.0, 2000.0, 1e-300), &legacy_link(), &ModelParameters::default(), Algorithm::FreeSpace).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn backwards_range_has_no_values() {
        assert!(SweepRange::new(10.0, 5.0, 1.0).values().is_empty());
        assert!(SweepRange::new(1.0, f64::NAN, 1.0).values().is_empty());
    }

    #[test]
    fn free_space_sweep_end_to_end() {
        let link = legacy_link();
        let points = distance_sweep(&SweepRange::default(), &link, &ModelParameters::default(), Algorithm::FreeSpace).unwrap();
        assert_eq!(points.len(), 10);
        for pair in points.windows(2) {
            assert!(pair[1].distance_m > pair[0].distance_m);
            assert!(pair[1].received_power_dbm < pair[0].received_power_dbm);
        }
        for p in &points {
            assert!(p.received_power_dbm.is_finite());
            assert!(p.received_power_dbm < link.transmit_power_dbm);
        }
    }

    #[test]
    fn two_ray_sweep_crosses_regimes() {
        let points = distance_sweep(&SweepRange::new(1000.0, 10000.0, 1000.0), &legacy_link(), &ModelParameters::default(), Algorithm::TwoRayGround).unwrap();
        assert_eq!(points.first().unwrap().regime, Regime::FreeSpace);
        assert_eq!(points.last().unwrap().regime, Regime::TwoRayGround);
    }

    #[test]
    fn evaluate_sorts_by_distance_and_aborts_on_error() {
        let link = legacy_link();
        let params = ModelParameters::default();
        let pairs = [900.0, 100.0, 500.0].map(|d| (d, link.scenario_at(d)));
        let points = evaluate(pairs, &params, Algorithm::FreeSpace).unwrap();
        let order: Vec<f64> = points.iter().map(|p| p.distance_m).collect();
        assert_eq!(order, vec![100.0, 500.0, 900.0]);

        let mut bad = link;
        bad.frequency_hz = 0.0;
        let pairs = vec![(100.0, link.scenario_at(100.0)), (200.0, bad.scenario_at(200.0))];
        assert!(evaluate(pairs, &params, Algorithm::FreeSpace).unwrap_err().is_domain());
    }

    #[test]
    fn height_grid_is_row_major_and_grows_with_height() {
        let grid = HeightGrid::default();
        let points = height_grid(&grid, &legacy_link(), &ModelParameters::default()).unwrap();
        assert_eq!(points.len(), 25);
        assert_eq!((points[0].transmitter_height_m, points[0].receiver_height_m), (10.0, 1.0));
        assert_eq!((points[1].transmitter_height_m, points[1].receiver_height_m), (10.0, 2.0));
        assert_eq!((points[5].transmitter_height_m, points[5].receiver_height_m), (20.0, 1.0));
        // Beyond crossover, raising either antenna raises received power.
        let far: Vec<_> = points.iter().filter(|p| p.regime == Regime::TwoRayGround).collect();
        assert!(!far.is_empty());
        assert!(points[24].received_power_dbm > points[0].received_power_dbm);
    }

    #[test]
    fn height_grid_rejects_ground_level_antennas() {
        let mut grid = HeightGrid::default();
        grid.receiver_heights = SweepRange::new(0.0, 5.0, 1.0);
        assert!(height_grid(&grid, &legacy_link(), &ModelParameters::default()).unwrap_err().is_configuration());
    }
}
