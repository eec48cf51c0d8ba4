
use crate::config::{AxisPairing, MixerTopology};
use crate::error::{FlightError, Result};
use crate::physical_types::*;

use nalgebra::Vector3;


/// Motor commands as written by the firmware, nominally 0..1.
/// Range enforcement is left to the firmware.
pub type ActuatorControls = [MotorCommand; NUM_MOTORS];

/// (roll, pitch, yaw) force produced by the mixer for one tick
pub type AngularForces = Vector3<ForceUnits>;

/// Propeller handedness for the reference frame layout
pub const SPIN_DIRECTIONS: [f32; NUM_MOTORS] = [-1.0, 1.0, 1.0, -1.0];


/// The four motor channels of a single vehicle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorState {
    values: ActuatorControls,
}

impl MotorState {
    pub fn new(values: ActuatorControls) -> Self {
        MotorState { values }
    }

    /// Set one channel. An index outside 0..4 is a firmware bug and fails.
    pub fn write(&mut self, index: usize, value: MotorCommand) -> Result<()> {
        let slot = self.values.get_mut(index)
            .ok_or(FlightError::MotorIndexOutOfRange { index })?;
        *slot = value;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<MotorCommand> {
        self.values.get(index).copied()
            .ok_or(FlightError::MotorIndexOutOfRange { index })
    }

    pub fn values(&self) -> &ActuatorControls {
        &self.values
    }

    /// Reject NaN / infinite commands before they reach the integrator
    pub fn check_finite(&self) -> Result<()> {
        match self.values.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(FlightError::NonFiniteActuator { index, value: self.values[index] }),
            None => Ok(()),
        }
    }

    /// ThrustScalar: plain sum of the four commands
    pub fn total(&self) -> MotorCommand {
        self.values.iter().sum()
    }
}


/// Signed power of the thrust imbalance on one axis.
/// Small imbalances yield disproportionately small forces.
pub fn mix_axis(motors: &ActuatorControls, pairing: &AxisPairing, exponent: f32) -> ForceUnits {
    let [a, b, c, d] = *pairing;
    let diff = (motors[a] + motors[b]) - (motors[c] + motors[d]);
    diff.signum() * diff.abs().powf(exponent)
}

/// Convert the motor commands into per-axis angular forces.
/// Output is unclamped and scales with `(2 * max_motor)^exponent`.
pub fn mix_motors(motors: &MotorState, topology: &MixerTopology, exponent: f32)
    -> Result<AngularForces>
{
    motors.check_finite()?;
    let vals = motors.values();
    Ok(Vector3::new(
        mix_axis(vals, &topology.roll, exponent),
        mix_axis(vals, &topology.pitch, exponent),
        mix_axis(vals, &topology.yaw, exponent),
    ))
}


/// Net thrust for one tick, in the vehicle's body frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrustOutput {
    /// Sum of motor commands, also fed to audio collaborators
    pub scalar: MotorCommand,
    /// x forward, z up
    pub body_force: Vector3<ForceUnits>,
}

/// Sum and scale the motor commands. No integration happens here:
/// the host physics body owns translation.
pub fn aggregate_thrust(motors: &MotorState, gain: ForceUnits, forward_fraction: f32) -> ThrustOutput {
    let scalar = motors.total();
    let magnitude = gain * scalar;
    ThrustOutput {
        scalar,
        body_force: Vector3::new(
            magnitude * forward_fraction,
            0.0,
            magnitude * (1.0 - forward_fraction),
        ),
    }
}

/// Signed propeller rotation rates for animating the prop meshes
pub fn propeller_spin_rates(motors: &MotorState, directions: &[f32; NUM_MOTORS], gain: f32)
    -> [f32; NUM_MOTORS]
{
    let vals = motors.values();
    let mut rates = [0.0; NUM_MOTORS];
    for i in 0..NUM_MOTORS {
        rates[i] = directions[i] * vals[i] * gain;
    }
    rates
}
