/**
Copyright (c) 2019 Todd Stellanova
LICENSE: See LICENSE file
*/


use nalgebra::{UnitQuaternion, Vector3};


pub mod physical_types;
pub mod error;
pub mod config;
pub mod clock;
pub mod models;
pub mod attitude;
pub mod board;
pub mod simulato;

use physical_types::*;
use clock::VirtualClock;
use models::MotorState;

pub use error::{FlightError, Result};


/**
Tracks the "ideal" state of the vehicle, without sensor uncertainty
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualVehicleState {

    /// Simulated time as measured at the vehicle
    pub clock: VirtualClock,

    /// Latest commands written by the firmware
    pub motors: MotorState,

    /// Attitude in world space, always unit length
    pub orientation: UnitQuaternion<f32>,

    /// Angular velocity in body frame, from the most recent tick
    pub body_angular_velocity: Vector3<AngularSpeedUnits>,

}

impl VirtualVehicleState {

    pub fn new() -> Self {
        VirtualVehicleState {
            clock: VirtualClock::new(),
            motors: MotorState::default(),
            orientation: UnitQuaternion::identity(),
            body_angular_velocity: Vector3::zeros(),
        }
    }

}

impl Default for VirtualVehicleState {
    fn default() -> Self {
        Self::new()
    }
}


pub mod sensors;
use sensors::SensorLike;
use config::DynamicsConfig;

/**
Simulated sensed state, as read by the firmware
*/
pub struct SensedPhysicalState {

    /// Gyro
    pub gyro: sensors::GyroSensor,

    /// Attitude fed back to the firmware
    pub attitude: sensors::AttitudeSensor,
}

impl SensedPhysicalState {
    pub fn new(config: &DynamicsConfig) -> Result<Self> {
        Ok(SensedPhysicalState {
            gyro: sensors::GyroSensor::with_noise(config.gyro_noise.as_ref())?,
            attitude: sensors::AttitudeSensor::enabled(config.report_attitude),
        })
    }

    pub fn update_from_virtual(&mut self, virt: &VirtualVehicleState) {
        self.gyro.update(virt);
        self.attitude.update(virt);
    }
}
