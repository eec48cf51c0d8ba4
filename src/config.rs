//! Tuning parameters for the dynamics core.
//!
//! The mixer exponent, rate gain and thrust gain are calibration values
//! rather than physical constants, so they are loaded here instead of
//! being baked into the models.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlightError, Result};
use crate::models::SPIN_DIRECTIONS;
use crate::physical_types::*;

/// Motors `[a, b, c, d]` on one axis: force follows `(m[a] + m[b]) - (m[c] + m[d])`
pub type AxisPairing = [usize; 4];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixerTopology {
    pub roll: AxisPairing,
    pub pitch: AxisPairing,
    pub yaw: AxisPairing,
}

impl Default for MixerTopology {
    fn default() -> Self {
        MixerTopology {
            roll: [2, 3, 0, 1],
            pitch: [1, 3, 0, 2],
            yaw: [1, 2, 0, 3],
        }
    }
}

impl MixerTopology {
    pub fn axes(&self) -> [AxisPairing; 3] {
        [self.roll, self.pitch, self.yaw]
    }
}

/// Sensor noise passed through to `sensulator`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub abs_err: f32,
    pub rel_err: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub topology: MixerTopology,

    /// Exponent applied to the per-axis thrust imbalance
    pub mix_exponent: f32,

    /// Degrees of rotation increment per unit mixer force per second
    pub rate_gain: AngularDegreesSpeedUnits,

    /// Force per unit motor command
    pub thrust_gain: ForceUnits,

    /// Share of total thrust directed along body forward, 0..1
    pub forward_thrust_fraction: f32,

    /// Propeller handedness, +1 / -1 per motor
    pub spin_directions: [f32; NUM_MOTORS],

    /// Propeller animation rate per unit command
    pub prop_spin_gain: f32,

    /// Renormalize orientation after every integration step
    pub renormalize: bool,

    /// When false, the firmware sees zero Euler angles and must self-estimate
    pub report_attitude: bool,

    /// None reports ideal gyro rates
    pub gyro_noise: Option<NoiseConfig>,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        DynamicsConfig {
            topology: MixerTopology::default(),
            mix_exponent: 3.0,
            rate_gain: DEGREES_PER_RADIAN,
            thrust_gain: 5000.0,
            forward_thrust_fraction: 0.0,
            spin_directions: SPIN_DIRECTIONS,
            prop_spin_gain: 100.0,
            renormalize: true,
            report_attitude: true,
            gyro_noise: None,
        }
    }
}

impl DynamicsConfig {

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DynamicsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::info!("loaded dynamics config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let names = ["roll", "pitch", "yaw"];
        for (name, pairing) in names.iter().zip(self.topology.axes().iter()) {
            for (i, &idx) in pairing.iter().enumerate() {
                if idx >= NUM_MOTORS {
                    return Err(FlightError::InvalidConfig(format!(
                        "{} pairing references motor {}", name, idx)));
                }
                if pairing[..i].contains(&idx) {
                    return Err(FlightError::InvalidConfig(format!(
                        "{} pairing repeats motor {}", name, idx)));
                }
            }
        }

        if !(self.mix_exponent.is_finite() && self.mix_exponent > 0.0) {
            return Err(FlightError::InvalidConfig(format!(
                "mix_exponent must be positive, got {}", self.mix_exponent)));
        }
        if !self.rate_gain.is_finite() || !self.thrust_gain.is_finite() {
            return Err(FlightError::InvalidConfig("gains must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.forward_thrust_fraction) {
            return Err(FlightError::InvalidConfig(format!(
                "forward_thrust_fraction must be within 0..1, got {}",
                self.forward_thrust_fraction)));
        }
        if self.spin_directions.iter().any(|d| d.abs() != 1.0) {
            return Err(FlightError::InvalidConfig(
                "spin_directions must be +1 or -1".to_string()));
        }
        if let Some(noise) = &self.gyro_noise {
            if noise.abs_err < 0.0 || noise.rel_err < 0.0 {
                return Err(FlightError::InvalidConfig(
                    "gyro noise must be non-negative".to_string()));
            }
        }
        Ok(())
    }
}
