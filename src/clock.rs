
use crate::error::{FlightError, Result};
use crate::physical_types::*;

/// Period after which the firmware's microsecond counter wraps (~71.6 minutes)
pub const CLOCK_WRAP_PERIOD: ElapsedTimeUnits =
    (TimeBaseUnits::MAX as ElapsedTimeUnits + 1.0) / TIME_INTERVAL_TO_TIME_BASE;

/**
Simulated time as seen by the firmware.
Elapsed time never decreases; the microsecond counter handed to the
firmware wraps modulo 2^32, like a free-running hardware timer.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VirtualClock {
    elapsed: ElapsedTimeUnits,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, interval: TimeIntervalUnits) -> Result<()> {
        validate_interval(interval)?;
        self.elapsed += interval as ElapsedTimeUnits;
        Ok(())
    }

    /// Seconds since start or the last reset
    pub fn elapsed(&self) -> ElapsedTimeUnits {
        self.elapsed
    }

    pub fn microseconds(&self) -> TimeBaseUnits {
        // truncate, then keep the low 32 bits
        (self.elapsed * TIME_INTERVAL_TO_TIME_BASE) as u64 as TimeBaseUnits
    }

    /// Number of times the microsecond counter has wrapped
    pub fn wrap_count(&self) -> u64 {
        (self.elapsed / CLOCK_WRAP_PERIOD) as u64
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Tick durations must be finite and non-negative
pub fn validate_interval(interval: TimeIntervalUnits) -> Result<()> {
    if interval.is_finite() && interval >= 0.0 {
        Ok(())
    } else {
        Err(FlightError::InvalidTimeStep(interval))
    }
}
