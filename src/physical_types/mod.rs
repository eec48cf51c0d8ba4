
/// physical type definitions

mod raw_types;


/// For angular position measurements
pub type AngularPosUnits = raw_types::Radians;
pub type AngularDegreesUnits = raw_types::AngleDegrees;

/// For angular rates
pub type AngularSpeedUnits = raw_types::RadiansPerSecond;
pub type AngularDegreesSpeedUnits = raw_types::DegreesPerSecond;
pub type GyroUnits = AngularSpeedUnits;

/// Duration of a single simulation tick
pub type TimeIntervalUnits = raw_types::Seconds;

/// Accumulated simulated time
pub type ElapsedTimeUnits = raw_types::ElapsedSeconds;

/// Clock value handed to the firmware
pub type TimeBaseUnits = raw_types::TimeMicroseconds;

/// Mixer output and thrust force
pub type ForceUnits = raw_types::TuningForce;

/// A single motor channel command
pub type MotorCommand = raw_types::UnitThrottle;

/// Number of motor channels on the vehicle
pub const NUM_MOTORS: usize = 4;

pub const DEGREES_PER_RADIAN: f32 = 180.0 / std::f32::consts::PI;
pub const RADIANS_PER_DEGREE: f32 = std::f32::consts::PI / 180.0;

/// Seconds to microseconds
pub const TIME_INTERVAL_TO_TIME_BASE: ElapsedTimeUnits = 1E6;
