//! Attitude integration and Euler-angle diagnostics.
//!
//! Axes follow the body frame: roll about x (forward), pitch about y,
//! yaw about z (up).

use nalgebra::{UnitQuaternion, Vector3};

use crate::models::AngularForces;
use crate::physical_types::*;


/// Body-frame angular rate implied by the mixer forces.
/// `rate_gain` is in degrees per unit force per second.
pub fn body_rates(forces: &AngularForces, rate_gain: AngularDegreesSpeedUnits)
    -> Vector3<AngularSpeedUnits>
{
    forces * (rate_gain * RADIANS_PER_DEGREE)
}

/// Per-axis rotation increment, in degrees, for one tick
pub fn rotation_increment_degrees(forces: &AngularForces,
                                  interval: TimeIntervalUnits,
                                  rate_gain: AngularDegreesSpeedUnits)
    -> Vector3<AngularDegreesUnits>
{
    forces * (interval * rate_gain)
}

/**
Apply one tick of rotation to `orientation`.
The increment is composed on the right (body frame), so the
vehicle turns about its own axes rather than the world's.
*/
pub fn integrate_attitude(orientation: &mut UnitQuaternion<f32>,
                          forces: &AngularForces,
                          interval: TimeIntervalUnits,
                          rate_gain: AngularDegreesSpeedUnits,
                          renormalize: bool)
{
    let delta = rotation_increment_degrees(forces, interval, rate_gain) * RADIANS_PER_DEGREE;
    if delta == Vector3::zeros() {
        return;
    }

    let increment = UnitQuaternion::from_euler_angles(delta[0], delta[1], delta[2]);
    *orientation = *orientation * increment;
    if renormalize {
        orientation.renormalize();
    }
}


/// Roll / pitch / yaw decoded from an orientation, in radians
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerAttitude {
    pub roll: AngularPosUnits,
    pub pitch: AngularPosUnits,
    pub yaw: AngularPosUnits,
}

impl EulerAttitude {

    /// Pitch is clamped at +/- pi/2 near gimbal lock instead of producing NaN
    pub fn from_orientation(orientation: &UnitQuaternion<f32>) -> Self {
        let q = orientation.quaternion();
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let sin_pitch = (2.0 * (w * y - z * x)).max(-1.0).min(1.0);
        let pitch = sin_pitch.asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        EulerAttitude { roll, pitch, yaw }
    }

    /// Unit vector for diagnostic overlays
    pub fn down_vector(&self) -> Vector3<f32> {
        let (sr, cr) = self.roll.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        Vector3::new(
            -cy * sp * sr - sy * cr,
            -sy * sp * sr + cy * cr,
            cp * sr,
        )
    }

    /// Layout expected by the firmware's getEulerAngles
    pub fn as_array(&self) -> [AngularPosUnits; 3] {
        [self.roll, self.pitch, self.yaw]
    }
}
