//! Defines the chord-vs-arc correction for discretely sampled velocity
//! commands.
//!
//! The kinematics assumes an instantaneous velocity vector, but control runs
//! in fixed periods. Holding a constant translational and rotational velocity
//! open-loop for a whole period makes the robot trace the chord of the
//! intended arc instead of the arc itself. The error is small per cycle but
//! it compounds into a sideways skid on curved paths.
//!
//! The correction treats the commanded velocity as constant over one period,
//! forms the pose displacement it is meant to produce, converts that
//! displacement into its exact rigid-body twist and rescales the twist back
//! into a velocity. Commanding the corrected velocity makes the actual chord
//! land on the intended arc.

use std::time::Duration;

use crate::geometry::{ChassisSpeeds, Pose2d};

#[cfg(test)]
#[path = "discretization_tests.rs"]
mod discretization_tests;

/// Adjusts a one-cycle-ahead commanded body velocity for the fact that the
/// command is held constant over a discrete control period.
///
/// For a non-rotating command the correction is an exact no-op. The
/// correction applies to velocity commands only; targets supplied directly as
/// pre-computed module states already account for real trajectories and must
/// not pass through here.
///
/// ## Parameters
///
/// * 'speeds' - The commanded body-frame velocity for the coming period.
/// * 'period' - The fixed control period the command is held for.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use swerve_drive_control::discretization::correct_for_discretization;
/// use swerve_drive_control::geometry::ChassisSpeeds;
///
/// // Straight-line motion passes through unchanged.
/// let speeds = ChassisSpeeds::new(1.0, 0.0, 0.0);
/// let corrected = correct_for_discretization(&speeds, Duration::from_millis(20));
/// assert_eq!(corrected, speeds);
/// ```
pub fn correct_for_discretization(speeds: &ChassisSpeeds, period: Duration) -> ChassisSpeeds {
    let period_in_seconds = period.as_secs_f64();

    let displacement = Pose2d::new(
        speeds.vx_in_meters_per_second() * period_in_seconds,
        speeds.vy_in_meters_per_second() * period_in_seconds,
        speeds.omega_in_radians_per_second() * period_in_seconds,
    );

    let twist = displacement.log();

    ChassisSpeeds::new(
        twist.dx_in_meters() / period_in_seconds,
        twist.dy_in_meters() / period_in_seconds,
        twist.dtheta_in_radians() / period_in_seconds,
    )
}
