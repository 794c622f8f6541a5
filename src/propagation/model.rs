//! Received-power calculation for the free-space and two-ray ground models.
//!
//! Both algorithms are pure functions of `(Scenario, ModelParameters)`,
//! selected by [`Algorithm`]. Power is computed in linear watts and
//! converted to dBm at the end.
//!
//! Units:
//! - Power: dBm at the API boundary, watts inside the formulas
//! - Distance, height, wavelength: meters
//! - Frequency: Hz

use std::f64::consts::PI;

use super::error::PropagationError;
use super::geometry;
use super::types::{Algorithm, ModelParameters, PropagationResult, Regime, Scenario, SpeedOfLight};
use super::units;

/// Carrier wavelength `λ = c / f` in meters.
///
/// # Errors
///
/// [`PropagationError::Domain`] when `frequency_hz` is not a positive finite number.
pub fn wavelength(frequency_hz: f64, speed_of_light: SpeedOfLight) -> Result<f64, PropagationError> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(PropagationError::domain(format!("frequency must be positive, got {} Hz", frequency_hz)));
    }
    Ok(speed_of_light.meters_per_second() / frequency_hz)
}

/// Distance beyond which ground reflection dominates free-space spreading.
///
/// # Formula
///
/// ```text
/// d_cross = 4π × h_t × h_r / λ
/// ```
///
/// At this distance the Friis and two-ray formulas give the same received
/// power, so switching between them is continuous.
pub fn crossover_distance(tx_height: f64, rx_height: f64, wavelength: f64) -> f64 {
    4.0 * PI * tx_height * rx_height / wavelength
}

/// Friis free-space received power in watts.
///
/// # Formula
///
/// ```text
/// P_r = P_t × G_t × G_r × λ² / ((4π × d)² × L)
/// ```
///
/// Where:
/// - `P_t`: transmit power (W)
/// - `G_t`, `G_r`: linear antenna gains
/// - `λ`: wavelength (m)
/// - `d`: distance (m); the caller is responsible for clamping
/// - `L`: linear system loss (≥ 1)
pub fn friis_received_power_w(tx_power_w: f64, gain_tx: f64, gain_rx: f64, wavelength: f64, distance: f64, system_loss: f64) -> f64 {
    let spreading = 4.0 * PI * distance;
    tx_power_w * gain_tx * gain_rx * wavelength * wavelength / (spreading * spreading * system_loss)
}

/// Two-ray ground-reflection received power in watts (far-field form).
///
/// # Formula
///
/// ```text
/// P_r = P_t × G_t × G_r × h_t² × h_r² / (d⁴ × L)
/// ```
///
/// Independent of wavelength; only valid beyond the crossover distance.
pub fn two_ray_received_power_w(tx_power_w: f64, gain_tx: f64, gain_rx: f64, tx_height: f64, rx_height: f64, distance: f64, system_loss: f64) -> f64 {
    let heights = tx_height * tx_height * rx_height * rx_height;
    tx_power_w * gain_tx * gain_rx * heights / (distance.powi(4) * system_loss)
}

/// Calculate the received power for one scenario.
///
/// # Distance
///
/// - [`Algorithm::FreeSpace`] uses the 3-D distance between the antennas.
/// - [`Algorithm::TwoRayGround`] uses the ground-plane distance and takes the
///   transmitter and receiver heights from the `z` components.
///
/// Distances below `params.min_distance()` are clamped to it. The clamped
/// distance is reported in [`PropagationResult::distance_m`].
///
/// # Errors
///
/// [`PropagationError::Domain`] when:
/// - the frequency is not positive
/// - the transmit power or a position is not finite
/// - the nodes are colocated (zero distance)
/// - an antenna height is not positive under [`Algorithm::TwoRayGround`]
/// - the received power underflows to zero and has no dBm representation
pub fn received_power(scenario: &Scenario, params: &ModelParameters, algorithm: Algorithm) -> Result<PropagationResult, PropagationError> {
    if !scenario.transmit_power_dbm.is_finite() {
        return Err(PropagationError::domain(format!("transmit power must be finite, got {} dBm", scenario.transmit_power_dbm)));
    }
    let lambda = wavelength(scenario.frequency_hz, params.speed_of_light())?;
    let tx_power_w = units::dbm_to_watts(scenario.transmit_power_dbm);

    let tx = &scenario.transmitter_position;
    let rx = &scenario.receiver_position;
    let (received_power_w, distance_m, regime) = match algorithm {
        Algorithm::FreeSpace => {
            let d = effective_distance(geometry::distance(tx, rx), params)?;
            let pr = friis_received_power_w(tx_power_w, params.antenna_gain_tx(), params.antenna_gain_rx(), lambda, d, params.system_loss());
            (pr, d, Regime::FreeSpace)
        }
        Algorithm::TwoRayGround => {
            let (ht, hr) = (tx.z, rx.z);
            if !(ht > 0.0) || !(hr > 0.0) {
                return Err(PropagationError::domain(format!(
                    "two-ray ground model requires antennas above ground, got h_t = {} m, h_r = {} m",
                    ht, hr
                )));
            }
            let d = effective_distance(geometry::horizontal_distance(tx, rx), params)?;
            if d <= crossover_distance(ht, hr, lambda) {
                let pr = friis_received_power_w(tx_power_w, params.antenna_gain_tx(), params.antenna_gain_rx(), lambda, d, params.system_loss());
                (pr, d, Regime::FreeSpace)
            } else {
                let pr = two_ray_received_power_w(tx_power_w, params.antenna_gain_tx(), params.antenna_gain_rx(), ht, hr, d, params.system_loss());
                (pr, d, Regime::TwoRayGround)
            }
        }
    };

    Ok(PropagationResult {
        received_power_dbm: units::watts_to_dbm(received_power_w)?,
        received_power_w,
        distance_m,
        regime,
    })
}

/// Reject colocated or non-finite separations and clamp short ones.
fn effective_distance(distance: f64, params: &ModelParameters) -> Result<f64, PropagationError> {
    if !distance.is_finite() {
        return Err(PropagationError::domain(format!("distance must be finite, got {}", distance)));
    }
    if distance <= 0.0 {
        return Err(PropagationError::domain("transmitter and receiver are colocated"));
    }
    Ok(distance.max(params.min_distance()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::types::Position;
    use approx::assert_relative_eq;

    const FREQ_900_MHZ: f64 = 900e6;
    const SPEED: f64 = crate::propagation::types::SPEED_OF_LIGHT;

    fn scenario_at(distance: f64, ht: f64, hr: f64, tx_power_dbm: f64) -> Scenario {
        Scenario {
            transmitter_position: Position::new(0.0, 0.0, ht),
            receiver_position: Position::new(distance, 0.0, hr),
            transmit_power_dbm: tx_power_dbm,
            frequency_hz: FREQ_900_MHZ,
        }
    }

    fn rx_w(distance: f64, algorithm: Algorithm) -> f64 {
        let params = ModelParameters::default();
        received_power(&scenario_at(distance, 50.0, 2.0, 30.0), &params, algorithm).unwrap().received_power_w
    }

    #[test]
    fn friis_matches_hand_calculation() {
        // 1 W, unity gains, 900 MHz, 1 km, same height: FSPL ≈ 91.53 dB
        let params = ModelParameters::default();
        let result = received_power(&scenario_at(1000.0, 10.0, 10.0, 30.0), &params, Algorithm::FreeSpace).unwrap();
        let lambda = SPEED / FREQ_900_MHZ;
        let expected = lambda * lambda / (4.0 * PI * 1000.0).powi(2);
        assert_relative_eq!(result.received_power_w, expected, max_relative = 1e-12);
        assert_relative_eq!(result.received_power_dbm, 30.0 - 91.5326, epsilon = 1e-3);
        assert_eq!(result.regime, Regime::FreeSpace);
    }

    #[test]
    fn free_space_uses_slant_distance() {
        let params = ModelParameters::default();
        let s = Scenario {
            transmitter_position: Position::new(0.0, 0.0, 0.0),
            receiver_position: Position::new(300.0, 0.0, 400.0),
            transmit_power_dbm: 30.0,
            frequency_hz: FREQ_900_MHZ,
        };
        let result = received_power(&s, &params, Algorithm::FreeSpace).unwrap();
        assert_relative_eq!(result.distance_m, 500.0);
    }

    #[test]
    fn free_space_inverse_square_law() {
        for d in [10.0, 250.0, 1000.0, 7000.0] {
            let ratio = rx_w(2.0 * d, Algorithm::FreeSpace) / rx_w(d, Algorithm::FreeSpace);
            // Height difference makes slant distance differ slightly from d.
            let s1 = (d * d + 48.0f64 * 48.0).sqrt();
            let s2 = (4.0 * d * d + 48.0f64 * 48.0).sqrt();
            assert_relative_eq!(ratio, (s1 / s2).powi(2), max_relative = 1e-12);
        }
        let params = ModelParameters::default();
        let p1 = received_power(&scenario_at(1000.0, 5.0, 5.0, 30.0), &params, Algorithm::FreeSpace).unwrap();
        let p2 = received_power(&scenario_at(2000.0, 5.0, 5.0, 30.0), &params, Algorithm::FreeSpace).unwrap();
        assert_relative_eq!(p2.received_power_w / p1.received_power_w, 0.25, max_relative = 1e-12);
    }

    #[test]
    fn two_ray_inverse_fourth_power_beyond_crossover() {
        let lambda = SPEED / FREQ_900_MHZ;
        let d_cross = crossover_distance(50.0, 2.0, lambda);
        for d in [d_cross * 1.01, 5000.0, 20000.0] {
            let ratio = rx_w(2.0 * d, Algorithm::TwoRayGround) / rx_w(d, Algorithm::TwoRayGround);
            assert_relative_eq!(ratio, 1.0 / 16.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn two_ray_switches_regime_at_crossover() {
        let params = ModelParameters::default();
        let lambda = SPEED / FREQ_900_MHZ;
        let d_cross = crossover_distance(50.0, 2.0, lambda);
        assert_relative_eq!(d_cross, 3772.52, epsilon = 0.01);

        let near = received_power(&scenario_at(d_cross * 0.5, 50.0, 2.0, 30.0), &params, Algorithm::TwoRayGround).unwrap();
        assert_eq!(near.regime, Regime::FreeSpace);
        // Near field uses the ground-plane distance, not the slant distance.
        assert_relative_eq!(near.distance_m, d_cross * 0.5, max_relative = 1e-12);

        let at = received_power(&scenario_at(d_cross, 50.0, 2.0, 30.0), &params, Algorithm::TwoRayGround).unwrap();
        assert_eq!(at.regime, Regime::FreeSpace);

        let far = received_power(&scenario_at(d_cross * 2.0, 50.0, 2.0, 30.0), &params, Algorithm::TwoRayGround).unwrap();
        assert_eq!(far.regime, Regime::TwoRayGround);
    }

    #[test]
    fn crossover_is_continuous() {
        for (ht, hr, freq) in [(50.0, 2.0, 900e6), (1.5, 1.5, 2.4e9), (30.0, 10.0, 150e6), (0.3, 200.0, 5.8e9)] {
            let lambda = SPEED / freq;
            let d = crossover_distance(ht, hr, lambda);
            let friis = friis_received_power_w(1.0, 1.0, 1.0, lambda, d, 1.0);
            let two_ray = two_ray_received_power_w(1.0, 1.0, 1.0, ht, hr, d, 1.0);
            assert_relative_eq!(friis, two_ray, max_relative = 1e-9);
        }
    }

    #[test]
    fn received_power_decreases_with_distance() {
        for algorithm in [Algorithm::FreeSpace, Algorithm::TwoRayGround] {
            let mut last = f64::INFINITY;
            let mut d = 5.0;
            while d < 50_000.0 {
                let p = rx_w(d, algorithm);
                assert!(p < last, "{} not decreasing at {} m", algorithm, d);
                last = p;
                d *= 1.3;
            }
        }
    }

    #[test]
    fn short_distances_are_clamped() {
        let params = ModelParameters::new(1.0, 10.0, 1.0, 1.0).unwrap();
        let clamped = received_power(&scenario_at(0.5, 1.0, 1.0, 20.0), &params, Algorithm::FreeSpace).unwrap();
        let at_min = received_power(&scenario_at(10.0, 1.0, 1.0, 20.0), &params, Algorithm::FreeSpace).unwrap();
        assert_eq!(clamped.distance_m, 10.0);
        assert_eq!(clamped.received_power_dbm, at_min.received_power_dbm);
    }

    #[test]
    fn two_ray_clamps_short_ground_distance() {
        let params = ModelParameters::new(1.0, 10.0, 1.0, 1.0).unwrap();
        let clamped = received_power(&scenario_at(0.5, 50.0, 2.0, 20.0), &params, Algorithm::TwoRayGround).unwrap();
        let at_min = received_power(&scenario_at(10.0, 50.0, 2.0, 20.0), &params, Algorithm::TwoRayGround).unwrap();
        assert_eq!(clamped.distance_m, 10.0);
        assert_eq!(clamped.regime, Regime::FreeSpace);
        assert_eq!(clamped.received_power_dbm, at_min.received_power_dbm);
    }

    #[test]
    fn colocated_nodes_are_rejected() {
        let params = ModelParameters::default();
        let err = received_power(&scenario_at(0.0, 5.0, 5.0, 20.0), &params, Algorithm::FreeSpace).unwrap_err();
        assert!(err.is_domain());
        let err = received_power(&scenario_at(0.0, 50.0, 2.0, 20.0), &params, Algorithm::TwoRayGround).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn invalid_inputs_are_domain_errors() {
        let params = ModelParameters::default();
        let mut s = scenario_at(100.0, 50.0, 2.0, 30.0);
        s.frequency_hz = 0.0;
        assert!(received_power(&s, &params, Algorithm::FreeSpace).unwrap_err().is_domain());
        s.frequency_hz = -900e6;
        assert!(received_power(&s, &params, Algorithm::TwoRayGround).unwrap_err().is_domain());

        let s = scenario_at(100.0, 0.0, 2.0, 30.0);
        assert!(received_power(&s, &params, Algorithm::TwoRayGround).unwrap_err().is_domain());
        let s = scenario_at(100.0, 50.0, -1.0, 30.0);
        assert!(received_power(&s, &params, Algorithm::TwoRayGround).unwrap_err().is_domain());
        // Ground-level antennas are fine for free space.
        let s = scenario_at(100.0, 0.0, 0.0, 30.0);
        assert!(received_power(&s, &params, Algorithm::FreeSpace).is_ok());

        let s = scenario_at(100.0, 50.0, 2.0, f64::INFINITY);
        assert!(received_power(&s, &params, Algorithm::FreeSpace).unwrap_err().is_domain());
    }

    #[test]
    fn gains_and_losses_scale_linearly() {
        let base = ModelParameters::default();
        let tuned = ModelParameters::new(2.0, 1.0, 4.0, 3.0).unwrap();
        let s = scenario_at(800.0, 20.0, 20.0, 30.0);
        let a = received_power(&s, &base, Algorithm::FreeSpace).unwrap();
        let b = received_power(&s, &tuned, Algorithm::FreeSpace).unwrap();
        assert_relative_eq!(b.received_power_w / a.received_power_w, 6.0, max_relative = 1e-12);
    }

    #[test]
    fn legacy_speed_of_light_changes_wavelength() {
        let precise = wavelength(900e6, SpeedOfLight::Precise).unwrap();
        let legacy = wavelength(900e6, SpeedOfLight::Legacy).unwrap();
        assert_relative_eq!(legacy, 1.0 / 3.0, max_relative = 1e-12);
        assert!(precise < legacy);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let params = ModelParameters::from_db_gains(1.5, 1.0, 3.0, 2.0).unwrap();
        let s = scenario_at(4321.0, 50.0, 2.0, 46.9897);
        for algorithm in [Algorithm::FreeSpace, Algorithm::TwoRayGround] {
            let a = received_power(&s, &params, algorithm).unwrap();
            let b = received_power(&s, &params, algorithm).unwrap();
            assert_eq!(a.received_power_dbm.to_bits(), b.received_power_dbm.to_bits());
        }
    }
}
