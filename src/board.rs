//! The sensor/actuator contract between a flight-control firmware and
//! the simulated vehicle, and the dynamics core that fulfills it.

use nalgebra::{UnitQuaternion, Vector3};

use crate::attitude::{self, EulerAttitude};
use crate::config::DynamicsConfig;
use crate::error::{FlightError, Result};
use crate::models::{self, AngularForces, ThrustOutput};
use crate::physical_types::*;
use crate::{SensedPhysicalState, VirtualVehicleState};


/// Capabilities the firmware expects from the hardware it runs on
pub trait Board {
    /// Free-running microsecond counter
    fn get_microseconds(&self) -> TimeBaseUnits;

    /// Body-frame angular rates, rad/s
    fn get_gyro_rates(&self) -> [GyroUnits; 3];

    /// Roll, pitch, yaw in radians
    fn get_euler_angles(&self) -> [AngularPosUnits; 3];

    /// Set one motor channel; index must be within 0..4
    fn write_motor(&mut self, index: usize, value: MotorCommand) -> Result<()>;

    /// Debug text from the firmware
    fn debug_message(&mut self, msg: &str);
}

/// Flight-control firmware driven in lock-step with the simulation
pub trait Firmware {
    fn init(&mut self, _board: &mut dyn Board) -> Result<()> {
        Ok(())
    }

    /// Read sensors and write motors for one tick
    fn update(&mut self, board: &mut dyn Board) -> Result<()>;
}


/// Everything the host needs from one tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutput {
    /// Mixer output (roll, pitch, yaw)
    pub angular_forces: AngularForces,
    pub body_rates: Vector3<AngularSpeedUnits>,
    pub thrust: ThrustOutput,
    /// Body thrust rotated into the world frame, for the host rigid body
    pub world_force: Vector3<ForceUnits>,
    /// Signed per-motor propeller rates for animation
    pub prop_spin: [f32; NUM_MOTORS],
    pub orientation: UnitQuaternion<f32>,
    /// Diagnostics, present when enabled on the flight loop
    pub attitude: Option<EulerAttitude>,
    pub down: Option<Vector3<f32>>,
    pub microseconds: TimeBaseUnits,
}


/// Vehicle state plus the sensor readings the firmware last saw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreSnapshot {
    pub vehicle_state: VirtualVehicleState,
    pub gyro: [GyroUnits; 3],
    pub attitude: [AngularPosUnits; 3],
}


/**
Per-vehicle dynamics state implementing the Board capability set.
Owned by a single flight loop; nothing here is shared between vehicles.
*/
pub struct DynamicsCore {
    config: DynamicsConfig,
    vehicle_state: VirtualVehicleState,
    sensed_state: SensedPhysicalState,
    write_fault: Option<FlightError>,
    last_message: Option<String>,
}

impl DynamicsCore {

    pub fn new(config: DynamicsConfig) -> Result<Self> {
        config.validate()?;
        let vehicle_state = VirtualVehicleState::new();
        let mut sensed_state = SensedPhysicalState::new(&config)?;
        sensed_state.update_from_virtual(&vehicle_state);
        Ok(DynamicsCore {
            config,
            vehicle_state,
            sensed_state,
            write_fault: None,
            last_message: None,
        })
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    pub fn vehicle_state(&self) -> &VirtualVehicleState {
        &self.vehicle_state
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            vehicle_state: self.vehicle_state,
            gyro: self.sensed_state.gyro.get_val(),
            attitude: self.sensed_state.attitude.get_val(),
        }
    }

    /// Undo a failed tick. Sensor readings are put back as they were,
    /// not remeasured, and any pending write fault is dropped.
    pub fn restore(&mut self, snapshot: &CoreSnapshot) {
        self.vehicle_state = snapshot.vehicle_state;
        self.sensed_state.gyro.hold(snapshot.gyro);
        self.sensed_state.attitude.hold(snapshot.attitude);
        self.write_fault = None;
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.vehicle_state.orientation = orientation;
        self.refresh_sensors();
    }

    pub fn reset_clock(&mut self) {
        self.vehicle_state.clock.reset();
    }

    /// First out-of-range motor write since the last call, if any.
    /// Firmware that swallows a write error still fails the tick.
    pub fn take_write_fault(&mut self) -> Result<()> {
        match self.write_fault.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Forget any fault left over from an earlier firmware call
    pub fn clear_write_fault(&mut self) {
        self.write_fault = None;
    }

    fn refresh_sensors(&mut self) {
        self.sensed_state.update_from_virtual(&self.vehicle_state);
    }

    /**
    Advance the vehicle by one tick using the current motor commands:
    mix, integrate attitude, aggregate thrust, then advance the clock.
    On error the vehicle state may be partially updated; callers restore.
    */
    pub fn step(&mut self, interval: TimeIntervalUnits, diagnostics: bool) -> Result<TickOutput> {
        let cfg = &self.config;
        let motors = self.vehicle_state.motors;

        let angular_forces = models::mix_motors(&motors, &cfg.topology, cfg.mix_exponent)?;
        log::trace!("motors: {:?} forces: {:?}", motors.values(), angular_forces);

        let body_rates = attitude::body_rates(&angular_forces, cfg.rate_gain);
        attitude::integrate_attitude(&mut self.vehicle_state.orientation,
                                     &angular_forces, interval, cfg.rate_gain, cfg.renormalize);
        self.vehicle_state.body_angular_velocity = body_rates;
        let orientation = self.vehicle_state.orientation;

        let (attitude, down) = if diagnostics {
            let euler = EulerAttitude::from_orientation(&orientation);
            (Some(euler), Some(euler.down_vector()))
        } else {
            (None, None)
        };

        let thrust = models::aggregate_thrust(&motors, cfg.thrust_gain, cfg.forward_thrust_fraction);
        let world_force = orientation * thrust.body_force;
        let prop_spin = models::propeller_spin_rates(&motors, &cfg.spin_directions, cfg.prop_spin_gain);

        self.vehicle_state.clock.advance(interval)?;
        self.refresh_sensors();

        Ok(TickOutput {
            angular_forces,
            body_rates,
            thrust,
            world_force,
            prop_spin,
            orientation,
            attitude,
            down,
            microseconds: self.vehicle_state.clock.microseconds(),
        })
    }
}

impl Board for DynamicsCore {
    fn get_microseconds(&self) -> TimeBaseUnits {
        self.vehicle_state.clock.microseconds()
    }

    fn get_gyro_rates(&self) -> [GyroUnits; 3] {
        self.sensed_state.gyro.get_val()
    }

    fn get_euler_angles(&self) -> [AngularPosUnits; 3] {
        self.sensed_state.attitude.get_val()
    }

    fn write_motor(&mut self, index: usize, value: MotorCommand) -> Result<()> {
        let res = self.vehicle_state.motors.write(index, value);
        if res.is_err() && self.write_fault.is_none() {
            self.write_fault = Some(FlightError::MotorIndexOutOfRange { index });
        }
        res
    }

    fn debug_message(&mut self, msg: &str) {
        log::info!(target: "firmware", "{}", msg);
        self.last_message = Some(msg.to_string());
    }
}
