
use nalgebra::{UnitQuaternion, Vector3};

use crate::board::{DynamicsCore, Firmware, TickOutput};
use crate::clock;
use crate::config::DynamicsConfig;
use crate::error::{FlightError, Result};
use crate::physical_types::*;
use crate::VirtualVehicleState;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightPhase {
    Uninitialized,
    Armed,
    Running,
}

/// Fraction of the way toward the surface orientation per collision
pub const DEFAULT_DEFLECTION_ALPHA: f32 = 0.025;

/**
Flight loop driver for a single vehicle.
Owns its firmware and dynamics core outright, so any number of
vehicles can be simulated side by side.
*/
pub struct Simulato<F: Firmware> {
    core: DynamicsCore,
    firmware: F,
    phase: FlightPhase,
    diagnostics: bool,
}


impl<F: Firmware> Simulato<F> {
    pub fn new(firmware: F, config: DynamicsConfig) -> Result<Self> {
        Ok(Simulato {
            core: DynamicsCore::new(config)?,
            firmware,
            phase: FlightPhase::Uninitialized,
            diagnostics: true,
        })
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn core(&self) -> &DynamicsCore {
        &self.core
    }

    pub fn firmware(&self) -> &F {
        &self.firmware
    }

    pub fn vehicle_state(&self) -> &VirtualVehicleState {
        self.core.vehicle_state()
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.vehicle_state().orientation
    }

    /// Include Euler angles and the down vector in each tick's output
    pub fn set_diagnostics(&mut self, enabled: bool) {
        self.diagnostics = enabled;
    }

    /// Hand the board to the firmware for its one-time setup
    pub fn arm(&mut self) -> Result<()> {
        if self.phase != FlightPhase::Uninitialized {
            return Err(FlightError::AlreadyArmed);
        }
        self.core.clear_write_fault();
        if let Err(err) = self.firmware.init(&mut self.core) {
            self.core.clear_write_fault();
            return Err(err);
        }
        self.core.take_write_fault()?;
        self.phase = FlightPhase::Armed;
        log::info!("flight loop armed");
        Ok(())
    }

    /**
    Heart of the update loop:
    - Let the firmware read sensors and write motor commands.
    - Use the dynamics core to mix, rotate, and produce thrust.
    - Then advance the simulated clock.
    A failed tick is skipped: the vehicle state is rolled back and the
    error handed to the host.
    */
    pub fn tick(&mut self, interval: TimeIntervalUnits) -> Result<TickOutput> {
        if self.phase == FlightPhase::Uninitialized {
            return Err(FlightError::NotArmed);
        }
        clock::validate_interval(interval)?;

        let snapshot = self.core.snapshot();
        match self.run_tick(interval) {
            Ok(output) => {
                if self.phase == FlightPhase::Armed {
                    log::debug!("flight loop running");
                    self.phase = FlightPhase::Running;
                }
                Ok(output)
            }
            Err(err) => {
                log::warn!("skipping tick at {} us: {}", snapshot.vehicle_state.clock.microseconds(), err);
                self.core.restore(&snapshot);
                Err(err)
            }
        }
    }

    fn run_tick(&mut self, interval: TimeIntervalUnits) -> Result<TickOutput> {
        self.core.clear_write_fault();
        self.firmware.update(&mut self.core)?;
        self.core.take_write_fault()?;
        self.core.step(interval, self.diagnostics)
    }

    /**
    Collision response: ease the vehicle toward the orientation whose
    up axis matches the surface normal.
    */
    pub fn deflect(&mut self, surface_normal: &Vector3<f32>, alpha: f32) -> Result<()> {
        let norm = surface_normal.norm();
        if !(norm.is_finite() && norm > 0.0) || !(0.0..=1.0).contains(&alpha) {
            return Err(FlightError::InvalidDeflection(format!(
                "normal {:?} / alpha {}", surface_normal, alpha)));
        }

        let normal = surface_normal / norm;
        let target = UnitQuaternion::rotation_between(&Vector3::z(), &normal)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f32::consts::PI));
        let current = self.orientation();
        if let Some(deflected) = current.try_slerp(&target, alpha, 1.0E-6) {
            self.core.set_orientation(deflected);
        }
        Ok(())
    }

    /// Host-side reset of the attitude, eg after a crash
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.core.set_orientation(orientation);
    }

    /// Restart the firmware's clock before the microsecond counter wraps
    pub fn reset_clock(&mut self) {
        self.core.reset_clock();
    }
}
