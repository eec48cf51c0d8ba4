/// Raw physical type definitions


/// private types
pub type Radians = f32;
pub type RadiansPerSecond = f32;
pub type AngleDegrees = f32;
pub type DegreesPerSecond = f32;

/// Seconds of simulated time
pub type Seconds = f32;
/// Elapsed time is accumulated at higher precision than a single tick
pub type ElapsedSeconds = f64;

/// Firmware-facing clock counter
pub type TimeMicroseconds = u32;

/// Unitless tuning force: motor mixing output and thrust are calibration values, not SI
pub type TuningForce = f32;

/// Normalized motor command, nominally 0..1
pub type UnitThrottle = f32;
