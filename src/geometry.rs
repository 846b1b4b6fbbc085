//! Defines the geometric primitives used by the swerve control core.
//!
//! All poses live in a fixed field frame with the X-axis pointing along the
//! field, the Y-axis to the left and headings measured counter-clockwise in
//! radians. A [Twist2d] is an infinitesimal rigid-body displacement in the
//! body frame. The conversion between a finite displacement and its twist is
//! the exact rigid-body logarithmic map, the inverse conversion is the
//! exponential map. Together these allow integrating and differentiating
//! curved motion without the drift that a linear (Euler) approximation
//! accumulates.

use std::f64::consts::{PI, TAU};

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;

/// Values of `1 - cos(theta)` closer to zero than this are treated as a
/// rotation-free displacement to keep the log and exp maps numerically stable.
const SMALL_ANGLE_LIMIT: f64 = 1e-9;

/// Wraps an angle in radians to the canonical `(-PI, PI]` range.
///
/// ## Parameters
///
/// * 'angle_in_radians' - The angle that should be wrapped.
///
/// ## Example
///
/// ```
/// use core::f64::consts::PI;
/// use swerve_drive_control::geometry::wrap_angle;
///
/// assert_eq!(wrap_angle(3.0 * PI), PI);
/// assert_eq!(wrap_angle(-PI), PI);
/// ```
pub fn wrap_angle(angle_in_radians: f64) -> f64 {
    let mut wrapped = angle_in_radians % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    }

    if wrapped <= -PI {
        wrapped += TAU;
    }

    wrapped
}

/// Stores a 2D position and heading in the field frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose2d {
    /// The position along the field X-axis in meters.
    x_in_meters: f64,

    /// The position along the field Y-axis in meters.
    y_in_meters: f64,

    /// The heading in radians, counter-clockwise positive.
    heading_in_radians: f64,
}

impl Pose2d {
    /// Composes the current pose with the given body-frame twist using the
    /// exact rigid-body exponential map.
    ///
    /// The twist is taken to describe a constant velocity over a small time
    /// step, so the resulting motion is an arc rather than a straight chord.
    ///
    /// ## Parameters
    ///
    /// * 'twist' - The body-frame displacement to apply.
    pub fn exp(&self, twist: &Twist2d) -> Pose2d {
        let dtheta = twist.dtheta_in_radians;
        let sin_theta = dtheta.sin();
        let cos_theta = dtheta.cos();

        let (s, c) = if dtheta.abs() < SMALL_ANGLE_LIMIT {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        let dx_in_body = twist.dx_in_meters * s - twist.dy_in_meters * c;
        let dy_in_body = twist.dx_in_meters * c + twist.dy_in_meters * s;

        let heading_cos = self.heading_in_radians.cos();
        let heading_sin = self.heading_in_radians.sin();

        Pose2d {
            x_in_meters: self.x_in_meters + dx_in_body * heading_cos - dy_in_body * heading_sin,
            y_in_meters: self.y_in_meters + dx_in_body * heading_sin + dy_in_body * heading_cos,
            heading_in_radians: wrap_angle(self.heading_in_radians + dtheta),
        }
    }

    /// Returns the heading in radians.
    pub fn heading_in_radians(&self) -> f64 {
        self.heading_in_radians
    }

    /// Returns the identity pose, i.e. the field origin with a zero heading.
    pub fn identity() -> Pose2d {
        Pose2d {
            x_in_meters: 0.0,
            y_in_meters: 0.0,
            heading_in_radians: 0.0,
        }
    }

    /// Computes the exact body-frame twist that produces this pose when it is
    /// interpreted as a displacement relative to the identity pose. This is
    /// the rigid-body logarithmic map, the inverse of [Pose2d::exp].
    pub fn log(&self) -> Twist2d {
        let dtheta = self.heading_in_radians;
        let half_dtheta = 0.5 * dtheta;

        let cos_minus_one = dtheta.cos() - 1.0;
        let half_theta_by_tan_of_half_dtheta = if cos_minus_one.abs() < SMALL_ANGLE_LIMIT {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * dtheta.sin()) / cos_minus_one
        };

        // Rotation by the non-normalized rotation (cos, sin) =
        // (half_theta_by_tan_of_half_dtheta, -half_dtheta) both rotates and
        // scales the translation part in a single step.
        Twist2d::new(
            self.x_in_meters * half_theta_by_tan_of_half_dtheta + self.y_in_meters * half_dtheta,
            -self.x_in_meters * half_dtheta + self.y_in_meters * half_theta_by_tan_of_half_dtheta,
            dtheta,
        )
    }

    /// Creates a new [Pose2d].
    ///
    /// The heading is wrapped to the canonical `(-PI, PI]` range.
    ///
    /// ## Parameters
    ///
    /// * 'x_in_meters' - The position along the field X-axis.
    /// * 'y_in_meters' - The position along the field Y-axis.
    /// * 'heading_in_radians' - The heading, counter-clockwise positive.
    pub fn new(x_in_meters: f64, y_in_meters: f64, heading_in_radians: f64) -> Pose2d {
        Pose2d {
            x_in_meters,
            y_in_meters,
            heading_in_radians: wrap_angle(heading_in_radians),
        }
    }

    /// Returns the position along the field X-axis in meters.
    pub fn x_in_meters(&self) -> f64 {
        self.x_in_meters
    }

    /// Returns the position along the field Y-axis in meters.
    pub fn y_in_meters(&self) -> f64 {
        self.y_in_meters
    }
}

impl Default for Pose2d {
    fn default() -> Self {
        Pose2d::identity()
    }
}

/// Stores an infinitesimal rigid-body displacement in the body frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Twist2d {
    /// The displacement along the body X-axis in meters.
    dx_in_meters: f64,

    /// The displacement along the body Y-axis in meters.
    dy_in_meters: f64,

    /// The rotational displacement in radians.
    dtheta_in_radians: f64,
}

impl Twist2d {
    /// Returns the rotational displacement in radians.
    pub fn dtheta_in_radians(&self) -> f64 {
        self.dtheta_in_radians
    }

    /// Returns the displacement along the body X-axis in meters.
    pub fn dx_in_meters(&self) -> f64 {
        self.dx_in_meters
    }

    /// Returns the displacement along the body Y-axis in meters.
    pub fn dy_in_meters(&self) -> f64 {
        self.dy_in_meters
    }

    /// Creates a new [Twist2d].
    ///
    /// ## Parameters
    ///
    /// * 'dx_in_meters' - The displacement along the body X-axis.
    /// * 'dy_in_meters' - The displacement along the body Y-axis.
    /// * 'dtheta_in_radians' - The rotational displacement.
    pub fn new(dx_in_meters: f64, dy_in_meters: f64, dtheta_in_radians: f64) -> Twist2d {
        Twist2d {
            dx_in_meters,
            dy_in_meters,
            dtheta_in_radians,
        }
    }

    /// Creates a [Twist2d] by replacing the rotational component of the
    /// current twist.
    ///
    /// Used by the odometry estimator to substitute the gyroscope heading
    /// delta for the wheel derived rotation.
    ///
    /// ## Parameters
    ///
    /// * 'dtheta_in_radians' - The rotational displacement that should be used
    ///   instead of the current one.
    pub fn with_rotation(&self, dtheta_in_radians: f64) -> Twist2d {
        Twist2d {
            dx_in_meters: self.dx_in_meters,
            dy_in_meters: self.dy_in_meters,
            dtheta_in_radians,
        }
    }
}

/// Stores a desired or measured body-frame velocity for the whole chassis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChassisSpeeds {
    /// The velocity along the body X-axis in meters per second.
    vx_in_meters_per_second: f64,

    /// The velocity along the body Y-axis in meters per second.
    vy_in_meters_per_second: f64,

    /// The rotational velocity in radians per second, counter-clockwise
    /// positive.
    omega_in_radians_per_second: f64,
}

impl ChassisSpeeds {
    /// Creates body-frame chassis speeds from a velocity expressed in the
    /// field frame, given the current heading of the robot.
    ///
    /// ## Parameters
    ///
    /// * 'vx_in_meters_per_second' - The field frame velocity along the X-axis.
    /// * 'vy_in_meters_per_second' - The field frame velocity along the Y-axis.
    /// * 'omega_in_radians_per_second' - The rotational velocity.
    /// * 'heading_in_radians' - The current heading of the robot.
    pub fn from_field_relative(
        vx_in_meters_per_second: f64,
        vy_in_meters_per_second: f64,
        omega_in_radians_per_second: f64,
        heading_in_radians: f64,
    ) -> ChassisSpeeds {
        let cos_heading = heading_in_radians.cos();
        let sin_heading = heading_in_radians.sin();

        ChassisSpeeds {
            vx_in_meters_per_second: vx_in_meters_per_second * cos_heading
                + vy_in_meters_per_second * sin_heading,
            vy_in_meters_per_second: -vx_in_meters_per_second * sin_heading
                + vy_in_meters_per_second * cos_heading,
            omega_in_radians_per_second,
        }
    }

    /// Creates a new [ChassisSpeeds] with the given body-frame velocities.
    ///
    /// ## Parameters
    ///
    /// * 'vx_in_meters_per_second' - The velocity along the body X-axis.
    /// * 'vy_in_meters_per_second' - The velocity along the body Y-axis.
    /// * 'omega_in_radians_per_second' - The rotational velocity.
    pub fn new(
        vx_in_meters_per_second: f64,
        vy_in_meters_per_second: f64,
        omega_in_radians_per_second: f64,
    ) -> ChassisSpeeds {
        ChassisSpeeds {
            vx_in_meters_per_second,
            vy_in_meters_per_second,
            omega_in_radians_per_second,
        }
    }

    /// Returns the rotational velocity in radians per second.
    pub fn omega_in_radians_per_second(&self) -> f64 {
        self.omega_in_radians_per_second
    }

    /// Returns the velocity along the body X-axis in meters per second.
    pub fn vx_in_meters_per_second(&self) -> f64 {
        self.vx_in_meters_per_second
    }

    /// Returns the velocity along the body Y-axis in meters per second.
    pub fn vy_in_meters_per_second(&self) -> f64 {
        self.vy_in_meters_per_second
    }
}
