
use num::NumCast;

use sensulator::Sensulator;
use sensulator::MeasureVal;

use crate::VirtualVehicleState;
use crate::attitude::EulerAttitude;
use crate::config::NoiseConfig;
use crate::error::{FlightError, Result};
use crate::physical_types::*;
use std::marker::PhantomData;


pub trait SensorLike {
    fn new() -> Self;
    /// pull updated data from input state
    fn update(&mut self, state: &VirtualVehicleState) -> &mut Self;
    /// generate a new set of simulated measurements
    fn remeasure(&mut self);
}


pub struct Sensor3d<T: NumCast> {
    inner: [Sensulator; 3],
    raw_val: [MeasureVal; 3],
    phantom: PhantomData<T>,
}

impl<T: NumCast> Sensor3d<T> {

    fn new(absolute_err: T, relative_err: T) -> Result<Self> {
        let abs_err = Self::cast_err(absolute_err, "absolute")?;
        let rel_err = Self::cast_err(relative_err, "relative")?;
        Ok(Sensor3d {
            inner: [
                Sensulator::new(0.0, abs_err, rel_err),
                Sensulator::new(0.0, abs_err, rel_err),
                Sensulator::new(0.0, abs_err, rel_err),
            ],
            raw_val: [0.0, 0.0, 0.0],
            phantom: PhantomData,
        })
    }

    fn cast_err(err: T, kind: &str) -> Result<f32> {
        match num::cast::<T, f32>(err) {
            Some(val) if val.is_finite() => Ok(val),
            _ => Err(FlightError::InvalidConfig(format!(
                "{} sensor error does not fit in f32", kind))),
        }
    }

    fn set_center(&mut self, center: &[MeasureVal; 3]) {
        for (sensor, val) in self.inner.iter_mut().zip(center.iter()) {
            sensor.set_center_value(*val);
        }
    }

    fn set_val_from_inner(&mut self) {
        self.raw_val = [
            self.inner[0].measure(),
            self.inner[1].measure(),
            self.inner[2].measure(),
        ];
    }

    pub fn get_val(&self) -> [MeasureVal; 3] {
        self.raw_val
    }
}


/**
Body-frame angular rates as reported to the firmware.
Without a noise model the gyro reports the ideal rates exactly.
*/
pub struct GyroSensor {
    senso: Option<Sensor3d<GyroUnits>>,
    ideal: [GyroUnits; 3],
    raw_val: [GyroUnits; 3],
}

impl GyroSensor {
    pub fn with_noise(noise: Option<&NoiseConfig>) -> Result<Self> {
        let senso = noise.map(|n| Sensor3d::new(n.abs_err, n.rel_err)).transpose()?;
        Ok(GyroSensor {
            senso,
            ideal: [0.0; 3],
            raw_val: [0.0; 3],
        })
    }

    pub fn get_val(&self) -> [GyroUnits; 3] {
        self.raw_val
    }

    /// Report `val` until the next update, without drawing new noise
    pub fn hold(&mut self, val: [GyroUnits; 3]) {
        self.raw_val = val;
    }
}

impl SensorLike for GyroSensor {
    fn new() -> Self {
        GyroSensor { senso: None, ideal: [0.0; 3], raw_val: [0.0; 3] }
    }

    fn update(&mut self, state: &VirtualVehicleState) -> &mut Self {
        let rates = state.body_angular_velocity;
        self.ideal = [rates[0], rates[1], rates[2]];
        if let Some(senso) = self.senso.as_mut() {
            senso.set_center(&self.ideal);
        }
        self.remeasure();
        self
    }

    fn remeasure(&mut self) {
        self.raw_val = match self.senso.as_mut() {
            Some(senso) => {
                senso.set_val_from_inner();
                senso.get_val()
            }
            None => self.ideal,
        };
    }
}


/// Euler attitude fed back to the firmware, or zeros when it self-estimates
pub struct AttitudeSensor {
    enabled: bool,
    raw_val: [AngularPosUnits; 3],
}

impl AttitudeSensor {
    pub fn enabled(enabled: bool) -> Self {
        AttitudeSensor { enabled, raw_val: [0.0; 3] }
    }

    pub fn get_val(&self) -> [AngularPosUnits; 3] {
        self.raw_val
    }

    pub fn hold(&mut self, val: [AngularPosUnits; 3]) {
        self.raw_val = val;
    }
}

impl SensorLike for AttitudeSensor {
    fn new() -> Self {
        Self::enabled(true)
    }

    fn update(&mut self, state: &VirtualVehicleState) -> &mut Self {
        self.raw_val = if self.enabled {
            EulerAttitude::from_orientation(&state.orientation).as_array()
        } else {
            [0.0; 3]
        };
        self
    }

    fn remeasure(&mut self) {}
}
