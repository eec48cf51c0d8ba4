use crate::physical_types::*;

pub type Result<T> = std::result::Result<T, FlightError>;

/// Errors raised by the dynamics core and its configuration
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("motor index {index} out of range (vehicle has {} motors)", NUM_MOTORS)]
    MotorIndexOutOfRange { index: usize },

    #[error("non-finite actuator command on motor {index}: {value}")]
    NonFiniteActuator { index: usize, value: MotorCommand },

    #[error("invalid time step: {0}")]
    InvalidTimeStep(TimeIntervalUnits),

    #[error("flight loop is not armed")]
    NotArmed,

    #[error("flight loop is already armed")]
    AlreadyArmed,

    #[error("invalid deflection: {0}")]
    InvalidDeflection(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
