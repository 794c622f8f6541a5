//! First-Fresnel-zone clearance planning for a point-to-point link.
//!
//! Given the ground elevation at two sites and the obstacles standing
//! between them, finds the antenna heights needed so that every obstacle
//! stays out of a fraction of the first Fresnel zone:
//! - 60 % clearance for line of sight (LOS)
//! - 40 % clearance for near line of sight
//!
//! Earth curvature is not taken into account.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::error::PropagationError;
use super::model::wavelength;
use super::types::SpeedOfLight;

/// Fraction of the first Fresnel zone that must be clear for LOS.
pub const LOS_CLEARANCE_FACTOR: f64 = 0.6;
/// Fraction of the first Fresnel zone that must be clear for near-LOS.
pub const NEAR_LOS_CLEARANCE_FACTOR: f64 = 0.4;

/// An obstacle between the two sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClearanceObstacle {
    /// Distance from site A along the link, meters.
    pub distance_from_a_m: f64,
    /// Obstacle top, same vertical reference as the site elevations.
    pub height_m: f64,
}

/// Link to plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClearanceLink {
    pub site_a_elevation_m: f64,
    pub site_b_elevation_m: f64,
    pub link_length_m: f64,
    pub frequency_hz: f64,
    #[serde(default)]
    pub obstacles: Vec<ClearanceObstacle>,
}

/// Antenna heights for one clearance criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntennaHeights {
    /// Mast height required at site A.
    pub site_a_m: f64,
    /// Mast height required at site B so the line stays level with A's top.
    pub site_b_m: f64,
    /// Per-obstacle slack: obstacle requirement minus the governing one (≤ 0).
    pub gaps_m: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearancePlan {
    pub line_of_sight: AntennaHeights,
    pub near_line_of_sight: AntennaHeights,
    /// Free-space path loss over the whole link, dB.
    pub free_space_loss_db: f64,
}

/// Radius of the first Fresnel zone at a point `d1` from one end and `d2`
/// from the other.
///
/// ```text
/// r = sqrt(λ × d1 × d2 / (d1 + d2))
/// ```
pub fn fresnel_radius(wavelength: f64, d1: f64, d2: f64) -> f64 {
    (wavelength * d1 * d2 / (d1 + d2)).sqrt()
}

/// Free-space path loss in dB, `20 × log10(4π × d / λ)`.
pub fn free_space_loss_db(distance: f64, wavelength: f64) -> f64 {
    20.0 * (4.0 * PI * distance / wavelength).log10()
}

/// Plan antenna heights for a link.
///
/// # Errors
///
/// [`PropagationError::Domain`] for a non-positive frequency or link length,
/// or an obstacle not strictly between the two sites.
pub fn plan(link: &ClearanceLink, speed_of_light: SpeedOfLight) -> Result<ClearancePlan, PropagationError> {
    let lambda = wavelength(link.frequency_hz, speed_of_light)?;
    if !link.link_length_m.is_finite() || link.link_length_m <= 0.0 {
        return Err(PropagationError::domain(format!("link length must be positive, got {} m", link.link_length_m)));
    }

    let mut radii = Vec::with_capacity(link.obstacles.len());
    for obstacle in &link.obstacles {
        let d1 = obstacle.distance_from_a_m;
        let d2 = link.link_length_m - d1;
        if !(d1 > 0.0 && d2 > 0.0) {
            return Err(PropagationError::domain(format!(
                "obstacle at {} m is not between the sites (link length {} m)",
                d1, link.link_length_m
            )));
        }
        radii.push(fresnel_radius(lambda, d1, d2));
    }

    Ok(ClearancePlan {
        line_of_sight: heights_for(link, &radii, LOS_CLEARANCE_FACTOR),
        near_line_of_sight: heights_for(link, &radii, NEAR_LOS_CLEARANCE_FACTOR),
        free_space_loss_db: free_space_loss_db(link.link_length_m, lambda),
    })
}

fn heights_for(link: &ClearanceLink, radii: &[f64], factor: f64) -> AntennaHeights {
    let requirements: Vec<f64> = link
        .obstacles
        .iter()
        .zip(radii)
        .map(|(obstacle, r)| obstacle.height_m - link.site_a_elevation_m + factor * r)
        .collect();
    let site_a_m = requirements.iter().copied().fold(0.0_f64, f64::max);
    AntennaHeights {
        site_a_m,
        site_b_m: link.site_a_elevation_m - link.site_b_elevation_m + site_a_m,
        gaps_m: requirements.iter().map(|r| r - site_a_m).collect(),
    }
}
