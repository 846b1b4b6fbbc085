//! Defines the minimal-rotation angle optimization for module targets.
//!
//! A swerve wheel reaches a given direction of travel in two orientations
//! that are half a turn apart: driving forwards, or driving backwards with
//! the wheel speed negated. The optimizer always picks the orientation that
//! requires the least steering rotation, so a module never turns further
//! than a quarter turn for any target.
//!
//! The steering controller tracks a continuous, unwrapped angle. All results
//! are therefore expressed relative to the current angle rather than wrapped
//! back into a single turn, which keeps the controller from spinning the
//! "long way" across the turn boundary.

use std::f64::consts::PI;

use crate::geometry::wrap_angle;
use crate::kinematics::SwerveModuleState;

#[cfg(test)]
#[path = "optimizer_tests.rs"]
mod optimizer_tests;

/// Shifts an angle by whole turns so that it lands within half a turn of the
/// given reference angle.
///
/// The result lies in `(reference - PI, reference + PI]` and describes the
/// same physical direction as the input angle.
///
/// ## Parameters
///
/// * 'reference_in_radians' - The continuous angle to place the result next
///   to, typically the current measured steering angle.
/// * 'angle_in_radians' - The angle that should be placed.
///
/// ## Example
///
/// ```
/// use core::f64::consts::PI;
/// use swerve_drive_control::optimizer::place_in_scope;
///
/// // Ten full turns plus a quarter turn, targeting "straight ahead".
/// let placed = place_in_scope(20.0 * PI + 0.25 * PI, 0.0);
/// assert!((placed - 20.0 * PI).abs() < 1e-9);
/// ```
pub fn place_in_scope(reference_in_radians: f64, angle_in_radians: f64) -> f64 {
    reference_in_radians + wrap_angle(angle_in_radians - reference_in_radians)
}

/// Picks the equivalent module target that minimizes the steering rotation
/// away from the current angle, negating the wheel speed when the wheel
/// direction is reversed.
///
/// The function is deterministic and idempotent: optimizing an already
/// optimized target against the same current angle returns it unchanged.
///
/// ## Parameters
///
/// * 'target' - The desired module state produced by the kinematics.
/// * 'current_angle_in_radians' - The current measured, continuous steering
///   angle of the module.
pub fn optimize(target: &SwerveModuleState, current_angle_in_radians: f64) -> SwerveModuleState {
    let mut angle = place_in_scope(current_angle_in_radians, target.angle_in_radians());
    let mut speed = target.speed_in_meters_per_second();

    let delta = angle - current_angle_in_radians;
    if delta.abs() > 0.5 * PI {
        speed = -speed;
        angle = if delta > 0.0 { angle - PI } else { angle + PI };
    }

    SwerveModuleState::new(speed, angle)
}
