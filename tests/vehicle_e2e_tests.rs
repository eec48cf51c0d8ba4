extern crate hoverbridge;

use hoverbridge::board::{Board, Firmware};
use hoverbridge::config::DynamicsConfig;
use hoverbridge::physical_types::*;
use hoverbridge::simulato::*;
use hoverbridge::{FlightError, Result};

use assert_approx_eq::assert_approx_eq;
use nalgebra::{UnitQuaternion, Vector3};


/// Writes the same motor commands every tick
struct ConstantFirmware {
    motors: [MotorCommand; NUM_MOTORS],
}

impl Firmware for ConstantFirmware {
    fn update(&mut self, board: &mut dyn Board) -> Result<()> {
        for (i, val) in self.motors.iter().enumerate() {
            board.write_motor(i, *val)?;
        }
        Ok(())
    }
}

/// Proportional roll leveller driven by the reported attitude
struct LevellingFirmware {
    hover: MotorCommand,
    gain: f32,
    clock_log: Vec<TimeBaseUnits>,
}

impl Firmware for LevellingFirmware {
    fn init(&mut self, board: &mut dyn Board) -> Result<()> {
        board.debug_message("levelling firmware ready");
        Ok(())
    }

    fn update(&mut self, board: &mut dyn Board) -> Result<()> {
        self.clock_log.push(board.get_microseconds());
        let roll = board.get_euler_angles()[0];
        let demand = -self.gain * roll / 4.0;
        board.write_motor(0, self.hover - demand)?;
        board.write_motor(1, self.hover - demand)?;
        board.write_motor(2, self.hover + demand)?;
        board.write_motor(3, self.hover + demand)?;
        Ok(())
    }
}

/// Ignores the error from a bad motor index
struct SloppyFirmware;

impl Firmware for SloppyFirmware {
    fn update(&mut self, board: &mut dyn Board) -> Result<()> {
        board.write_motor(0, 1.0)?;
        let _ = board.write_motor(4, 1.0);
        Ok(())
    }
}

/// Propagates a bad motor index on its first update only
struct FaultOnceFirmware {
    updates: u32,
}

impl Firmware for FaultOnceFirmware {
    fn update(&mut self, board: &mut dyn Board) -> Result<()> {
        self.updates += 1;
        if self.updates == 1 {
            board.write_motor(7, 1.0)?;
        }
        for i in 0..NUM_MOTORS {
            board.write_motor(i, 0.5)?;
        }
        Ok(())
    }
}

/// Commands NaN on its first update, then a steady hover
struct NanOnceFirmware {
    updates: u32,
}

impl Firmware for NanOnceFirmware {
    fn update(&mut self, board: &mut dyn Board) -> Result<()> {
        self.updates += 1;
        let level = if self.updates == 1 { std::f32::NAN } else { 0.5 };
        for i in 0..NUM_MOTORS {
            board.write_motor(i, level)?;
        }
        Ok(())
    }
}

fn armed<F: Firmware>(firmware: F) -> Simulato<F> {
    let mut sim = Simulato::new(firmware, DynamicsConfig::default()).unwrap();
    sim.arm().unwrap();
    sim
}

#[test]
pub fn test_idle_tick_is_identity() {
    let mut sim = armed(ConstantFirmware { motors: [0.0; 4] });
    let out = sim.tick(0.016).unwrap();
    assert_eq!(out.orientation, UnitQuaternion::identity());
    assert_eq!(out.world_force, Vector3::zeros());
    assert_eq!(out.angular_forces, Vector3::zeros());
}

#[test]
pub fn test_balanced_hover() {
    let mut sim = armed(ConstantFirmware { motors: [1.0; 4] });
    let gain = sim.core().config().thrust_gain;

    for _ in 0..10 {
        let out = sim.tick(0.016).unwrap();
        assert_eq!(out.angular_forces, Vector3::zeros());
        assert_eq!(out.orientation, UnitQuaternion::identity());
        assert_eq!(out.thrust.scalar, 4.0);
        assert_eq!(out.world_force, Vector3::new(0.0, 0.0, gain * 4.0));
    }
    assert_eq!(sim.phase(), FlightPhase::Running);
    assert_eq!(sim.core().get_microseconds(), 160_000);
}

#[test]
pub fn test_roll_imbalance_rotates_body() {
    let mut sim = armed(ConstantFirmware { motors: [0.0, 0.0, 0.5, 0.5] });
    let dt = 0.016;
    let out = sim.tick(dt).unwrap();

    assert_approx_eq!(out.angular_forces[0], 1.0);
    let attitude = out.attitude.unwrap();
    // 1 * dt * (180 / pi) degrees of roll
    assert_approx_eq!(attitude.roll * DEGREES_PER_RADIAN, dt * DEGREES_PER_RADIAN, 1E-4);
    assert_approx_eq!(attitude.pitch, 0.0, 1E-6);
    assert_approx_eq!(attitude.yaw, 0.0, 1E-6);

    // thrust follows the tilted body
    assert!(out.world_force[1] < 0.0);
    assert_approx_eq!(out.world_force.norm(), out.thrust.body_force.norm(), 1E-2);
}

#[test]
pub fn test_prop_spin_feedback() {
    let mut sim = armed(ConstantFirmware { motors: [0.5; 4] });
    let out = sim.tick(0.01).unwrap();
    assert_eq!(out.prop_spin, [-50.0, 50.0, 50.0, -50.0]);
}

#[test]
pub fn test_levelling_closes_the_loop() {
    let firmware = LevellingFirmware { hover: 0.5, gain: 2.0, clock_log: Vec::new() };
    let mut sim = Simulato::new(firmware, DynamicsConfig::default()).unwrap();
    sim.set_orientation(UnitQuaternion::from_euler_angles(0.3, 0.0, 0.0));
    sim.arm().unwrap();
    assert_eq!(sim.core().last_message(), Some("levelling firmware ready"));

    let mut last_roll = 0.3;
    for _ in 0..200 {
        let out = sim.tick(0.01).unwrap();
        let roll = out.attitude.unwrap().roll;
        assert!(roll <= last_roll);
        assert!(roll > 0.0);
        last_roll = roll;
    }
    assert!(last_roll < 0.25);

    let log = &sim.firmware().clock_log;
    assert_eq!(log[0], 0);
    assert!(log.windows(2).all(|w| w[1] > w[0]));
}

#[test]
pub fn test_bad_motor_index_fails_tick() {
    let mut sim = armed(SloppyFirmware);
    let res = sim.tick(0.01);
    assert!(matches!(res, Err(FlightError::MotorIndexOutOfRange { index: 4 })));
    // the valid write to motor 0 is rolled back too
    assert_eq!(sim.vehicle_state().motors.values(), &[0.0; 4]);
    assert_eq!(sim.vehicle_state().clock.microseconds(), 0);
}

#[test]
pub fn test_vehicles_are_independent() {
    let mut hover = armed(ConstantFirmware { motors: [1.0; 4] });
    let mut rolling = armed(ConstantFirmware { motors: [0.0, 0.0, 1.0, 1.0] });

    for _ in 0..5 {
        hover.tick(0.0625).unwrap();
        rolling.tick(0.03125).unwrap();
    }
    assert_eq!(hover.orientation(), UnitQuaternion::identity());
    assert_ne!(rolling.orientation(), UnitQuaternion::identity());
    assert_eq!(hover.core().get_microseconds(), 312_500);
    assert_eq!(rolling.core().get_microseconds(), 156_250);
}

#[test]
pub fn test_attitude_reporting_can_be_stubbed() {
    let mut config = DynamicsConfig::default();
    config.report_attitude = false;
    let mut sim = Simulato::new(ConstantFirmware { motors: [0.0, 0.0, 1.0, 1.0] }, config).unwrap();
    sim.arm().unwrap();
    sim.tick(0.05).unwrap();
    assert_eq!(sim.core().get_euler_angles(), [0.0; 3]);
    assert!(sim.core().get_gyro_rates()[0] > 0.0);
}

#[test]
pub fn test_recovers_after_bad_motor_index() {
    let mut sim = armed(FaultOnceFirmware { updates: 0 });
    let res = sim.tick(0.0625);
    assert!(matches!(res, Err(FlightError::MotorIndexOutOfRange { index: 7 })));
    assert_eq!(sim.core().get_microseconds(), 0);

    let out = sim.tick(0.0625).unwrap();
    assert_eq!(out.microseconds, 62_500);
    assert_eq!(out.thrust.scalar, 2.0);
    assert_eq!(sim.phase(), FlightPhase::Running);

    sim.tick(0.0625).unwrap();
    assert_eq!(sim.core().get_microseconds(), 125_000);
    assert_eq!(sim.firmware().updates, 3);
}

#[test]
pub fn test_recovers_after_non_finite_command() {
    let mut sim = armed(NanOnceFirmware { updates: 0 });
    let res = sim.tick(0.0625);
    assert!(matches!(res, Err(FlightError::NonFiniteActuator { index: 0, .. })));
    assert_eq!(sim.vehicle_state().motors.values(), &[0.0; 4]);

    let out = sim.tick(0.0625).unwrap();
    assert_eq!(out.microseconds, 62_500);
    assert_eq!(out.orientation, UnitQuaternion::identity());
    assert_eq!(sim.vehicle_state().motors.values(), &[0.5; 4]);
}

#[test]
pub fn test_sloppy_firmware_fault_does_not_leak() {
    let mut sim = armed(SloppyFirmware);
    for _ in 0..3 {
        assert!(matches!(sim.tick(0.01),
                         Err(FlightError::MotorIndexOutOfRange { index: 4 })));
    }
    assert_eq!(sim.core().get_microseconds(), 0);
}
