//! Rendering of sweep results as plain text or JSON.
//!
//! The text form is one whitespace-separated row per point followed by a
//! blank line, ready for gnuplot-style consumers. Lines starting with `#`
//! carry the title and the carrier-sense reference line.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EstimatorConfig;
use crate::propagation::clearance::{AntennaHeights, ClearancePlan};
use crate::propagation::{Algorithm, PropagationError, Regime, units};
use crate::sweep::{HeightGridPoint, SweepPoint};

#[derive(Debug, Clone, Serialize)]
pub struct ReportPoint {
    pub distance_m: f64,
    pub received_power_dbm: f64,
    pub regime: Regime,
    /// Whether the point clears the carrier-sense threshold, when one is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above_threshold: Option<bool>,
}

/// Distance sweep output.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub generated_at: DateTime<Utc>,
    pub algorithm: Algorithm,
    pub frequency_hz: f64,
    pub transmit_power_dbm: f64,
    pub cs_threshold_dbm: Option<f64>,
    pub points: Vec<ReportPoint>,
}

impl SweepReport {
    pub fn new(points: &[SweepPoint], config: &EstimatorConfig) -> Self {
        let threshold = config.cs_threshold_dbm;
        Self {
            generated_at: Utc::now(),
            algorithm: config.algorithm,
            frequency_hz: config.frequency_hz,
            transmit_power_dbm: config.transmit_power_dbm,
            cs_threshold_dbm: threshold,
            points: points
                .iter()
                .map(|p| ReportPoint {
                    distance_m: p.distance_m,
                    received_power_dbm: p.received_power_dbm,
                    regime: p.regime,
                    above_threshold: threshold.map(|t| p.received_power_dbm >= t),
                })
                .collect(),
        }
    }

    /// `distance rx_dbm` rows, values optionally rounded to `precision`.
    pub fn to_text(&self, precision: Option<f64>) -> Result<String, PropagationError> {
        let mut out = format!("# {} txPower {:.2} dBm at {} Hz\n", self.algorithm, self.transmit_power_dbm, self.frequency_hz);
        if let Some(threshold) = self.cs_threshold_dbm {
            out.push_str(&format!("# {} dBm CSThreshold\n", threshold));
        }
        for p in &self.points {
            out.push_str(&format!("{} {}\n", p.distance_m, rounded(p.received_power_dbm, precision)?));
        }
        out.push('\n');
        Ok(out)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Antenna-height grid output.
#[derive(Debug, Clone, Serialize)]
pub struct HeightGridReport {
    pub generated_at: DateTime<Utc>,
    pub distance_m: f64,
    pub frequency_hz: f64,
    pub transmit_power_dbm: f64,
    pub points: Vec<HeightGridPoint>,
}

impl HeightGridReport {
    pub fn new(points: Vec<HeightGridPoint>, config: &EstimatorConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            distance_m: config.height_grid.distance_m,
            frequency_hz: config.frequency_hz,
            transmit_power_dbm: config.transmit_power_dbm,
            points,
        }
    }

    /// `ht hr rx_dbm` rows.
    pub fn to_text(&self, precision: Option<f64>) -> Result<String, PropagationError> {
        let mut out = format!("# two-ray-ground at {} m, txPower {:.2} dBm\n", self.distance_m, self.transmit_power_dbm);
        for p in &self.points {
            out.push_str(&format!("{} {} {}\n", p.transmitter_height_m, p.receiver_height_m, rounded(p.received_power_dbm, precision)?));
        }
        out.push('\n');
        Ok(out)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Human readable clearance plan.
pub fn clearance_text(plan: &ClearancePlan) -> String {
    format!(
        "{}{}Free-space attenuation = {:.4} dB\n",
        heights_text("LOS", &plan.line_of_sight),
        heights_text("near LOS", &plan.near_line_of_sight),
        plan.free_space_loss_db
    )
}

fn heights_text(label: &str, heights: &AntennaHeights) -> String {
    let gaps: Vec<String> = heights.gaps_m.iter().map(|g| format!("{:.4}", g)).collect();
    format!(
        "Antenna A height for {label} = {:.4} m\nAntenna B height for {label} = {:.4} m\nGap per obstacle: {}\n",
        heights.site_a_m,
        heights.site_b_m,
        gaps.join(" ")
    )
}

fn rounded(value: f64, precision: Option<f64>) -> Result<f64, PropagationError> {
    match precision {
        Some(p) => units::round_to_precision(value, p),
        None => Ok(value),
    }
}
