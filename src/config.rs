//! Defines the startup configuration for the swerve drivetrain.
//!
//! All values in this module are fixed at startup from physical measurement
//! and tuning, and are read-only afterwards. Invalid configuration is a fatal
//! error: the drivetrain refuses to construct rather than produce commands
//! with undefined geometry or gains.

extern crate nalgebra as na;

use std::time::Duration;

use na::Vector2;

use crate::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

/// Defines the sign convention used when reporting the estimated pose.
///
/// Some field orientation conventions require the reported X and Y positions
/// to be mirrored. This is purely a presentation choice at the reporting
/// boundary, it never changes the kinematics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PoseAxisConvention {
    /// Report the pose exactly as estimated.
    #[default]
    Standard,

    /// Report the pose with the X and Y positions negated. The heading is
    /// reported unchanged.
    MirroredXy,
}

/// Stores the fixed geometry for a single swerve module.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleGeometry {
    /// The position of the module relative to the rotation center of the
    /// robot, in meters.
    offset_in_meters: Vector2<f64>,

    /// The angle reported by the absolute angle sensor when the wheel points
    /// along the body X-axis, in degrees.
    calibration_offset_in_degrees: f64,
}

impl ModuleGeometry {
    /// Returns the calibration offset for the absolute angle sensor in
    /// degrees.
    pub fn calibration_offset_in_degrees(&self) -> f64 {
        self.calibration_offset_in_degrees
    }

    /// Creates a new [ModuleGeometry].
    ///
    /// ## Parameters
    ///
    /// * 'offset_in_meters' - The position of the module relative to the
    ///   rotation center of the robot.
    /// * 'calibration_offset_in_degrees' - The absolute sensor reading at the
    ///   mechanical zero of the steering axis.
    pub fn new(offset_in_meters: Vector2<f64>, calibration_offset_in_degrees: f64) -> Self {
        Self {
            offset_in_meters,
            calibration_offset_in_degrees,
        }
    }

    /// Returns the position of the module relative to the rotation center of
    /// the robot, in meters.
    pub fn offset_in_meters(&self) -> &Vector2<f64> {
        &self.offset_in_meters
    }
}

/// Stores the gains for one closed-loop controller on a module.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidGains {
    /// The proportional gain.
    kp: f64,

    /// The integral gain.
    ki: f64,

    /// The derivative gain.
    kd: f64,

    /// The velocity feed-forward gain.
    kf: f64,
}

impl PidGains {
    /// Returns a value indicating whether all gains are finite numbers.
    fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite() && self.kf.is_finite()
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// Returns the velocity feed-forward gain.
    pub fn kf(&self) -> f64 {
        self.kf
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Creates a new set of [PidGains].
    ///
    /// ## Parameters
    ///
    /// * 'kp' - The proportional gain.
    /// * 'ki' - The integral gain.
    /// * 'kd' - The derivative gain.
    /// * 'kf' - The velocity feed-forward gain.
    pub fn new(kp: f64, ki: f64, kd: f64, kf: f64) -> Self {
        Self { kp, ki, kd, kf }
    }
}

/// Stores the continuous current bounds for the motors of one module.
///
/// The limiting strategy itself lives in the motor controller firmware, the
/// core only passes the configured bounds through at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentLimits {
    /// The continuous current limit for the steering motor in amperes.
    steer_limit_in_amps: f64,

    /// The continuous current limit for the drive motor in amperes.
    drive_limit_in_amps: f64,
}

impl CurrentLimits {
    /// Returns the continuous current limit for the drive motor in amperes.
    pub fn drive_limit_in_amps(&self) -> f64 {
        self.drive_limit_in_amps
    }

    /// Creates a new set of [CurrentLimits].
    ///
    /// ## Parameters
    ///
    /// * 'steer_limit_in_amps' - The continuous limit for the steering motor.
    /// * 'drive_limit_in_amps' - The continuous limit for the drive motor.
    pub fn new(steer_limit_in_amps: f64, drive_limit_in_amps: f64) -> Self {
        Self {
            steer_limit_in_amps,
            drive_limit_in_amps,
        }
    }

    /// Returns the continuous current limit for the steering motor in
    /// amperes.
    pub fn steer_limit_in_amps(&self) -> f64 {
        self.steer_limit_in_amps
    }
}

/// Stores the complete startup configuration for the swerve drivetrain.
#[derive(Clone, Debug, PartialEq)]
pub struct SwerveConfig {
    /// The geometry for each module, one entry per module. The module index
    /// used everywhere else in the crate is the index into this list.
    modules: Vec<ModuleGeometry>,

    /// The maximum linear speed of the platform in meters per second.
    maximum_speed_in_meters_per_second: f64,

    /// The maximum angular velocity of the platform in radians per second.
    maximum_angular_velocity_in_radians_per_second: f64,

    /// A flag that indicates whether the gyroscope yaw reading increases
    /// clockwise instead of counter-clockwise.
    invert_gyro: bool,

    /// The gains for the steering position loops.
    steer_gains: PidGains,

    /// The gains for the drive velocity loops.
    drive_gains: PidGains,

    /// The current bounds for the module motors.
    current_limits: CurrentLimits,

    /// The fixed control period of the platform runtime.
    control_period: Duration,

    /// The sign convention used when reporting the estimated pose.
    pose_axis_convention: PoseAxisConvention,
}

impl SwerveConfig {
    /// Returns the fixed control period of the platform runtime.
    pub fn control_period(&self) -> Duration {
        self.control_period
    }

    /// Returns the current bounds for the module motors.
    pub fn current_limits(&self) -> &CurrentLimits {
        &self.current_limits
    }

    /// Returns the gains for the drive velocity loops.
    pub fn drive_gains(&self) -> &PidGains {
        &self.drive_gains
    }

    /// Returns a value indicating whether the gyroscope yaw reading increases
    /// clockwise instead of counter-clockwise.
    pub fn invert_gyro(&self) -> bool {
        self.invert_gyro
    }

    /// Returns the maximum angular velocity of the platform in radians per
    /// second.
    pub fn maximum_angular_velocity_in_radians_per_second(&self) -> f64 {
        self.maximum_angular_velocity_in_radians_per_second
    }

    /// Returns the maximum linear speed of the platform in meters per second.
    pub fn maximum_speed_in_meters_per_second(&self) -> f64 {
        self.maximum_speed_in_meters_per_second
    }

    /// Returns the number of configured modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Returns the geometry for each module.
    pub fn modules(&self) -> &[ModuleGeometry] {
        &self.modules
    }

    /// Creates a new validated [SwerveConfig].
    ///
    /// ## Parameters
    ///
    /// * 'modules' - The geometry for each module, at least two entries.
    /// * 'maximum_speed_in_meters_per_second' - The platform speed limit.
    /// * 'maximum_angular_velocity_in_radians_per_second' - The platform
    ///   rotation rate limit.
    /// * 'invert_gyro' - Whether the gyroscope reads clockwise positive.
    /// * 'steer_gains' - The gains for the steering position loops.
    /// * 'drive_gains' - The gains for the drive velocity loops.
    /// * 'current_limits' - The current bounds for the module motors.
    /// * 'control_period' - The fixed control period of the platform runtime.
    /// * 'pose_axis_convention' - The sign convention for reported poses.
    ///
    /// ## Errors
    ///
    /// * [Error::TooFewModules] - Returned when fewer than two module
    ///   geometries are provided.
    /// * [Error::InvalidConfigurationValue] - Returned when a geometry,
    ///   limit, gain or period value is not finite or not positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        modules: Vec<ModuleGeometry>,
        maximum_speed_in_meters_per_second: f64,
        maximum_angular_velocity_in_radians_per_second: f64,
        invert_gyro: bool,
        steer_gains: PidGains,
        drive_gains: PidGains,
        current_limits: CurrentLimits,
        control_period: Duration,
        pose_axis_convention: PoseAxisConvention,
    ) -> Result<Self, Error> {
        let config = Self {
            modules,
            maximum_speed_in_meters_per_second,
            maximum_angular_velocity_in_radians_per_second,
            invert_gyro,
            steer_gains,
            drive_gains,
            current_limits,
            control_period,
            pose_axis_convention,
        };

        config.validate()?;
        Ok(config)
    }

    /// Returns the sign convention used when reporting the estimated pose.
    pub fn pose_axis_convention(&self) -> PoseAxisConvention {
        self.pose_axis_convention
    }

    /// Returns the gains for the steering position loops.
    pub fn steer_gains(&self) -> &PidGains {
        &self.steer_gains
    }

    /// Verifies that the configuration describes a drivable platform.
    fn validate(&self) -> Result<(), Error> {
        if self.modules.len() < 2 {
            return Err(Error::TooFewModules {
                minimum: 2,
                provided: self.modules.len(),
            });
        }

        for (index, module) in self.modules.iter().enumerate() {
            let offset = module.offset_in_meters();
            if !offset.x.is_finite() || !offset.y.is_finite() {
                return Err(Error::InvalidConfigurationValue {
                    name: format!("modules[{}].offset_in_meters", index),
                    value: if offset.x.is_finite() {
                        offset.y
                    } else {
                        offset.x
                    },
                });
            }

            if !module.calibration_offset_in_degrees().is_finite() {
                return Err(Error::InvalidConfigurationValue {
                    name: format!("modules[{}].calibration_offset_in_degrees", index),
                    value: module.calibration_offset_in_degrees(),
                });
            }
        }

        Self::validate_positive(
            "maximum_speed_in_meters_per_second",
            self.maximum_speed_in_meters_per_second,
        )?;
        Self::validate_positive(
            "maximum_angular_velocity_in_radians_per_second",
            self.maximum_angular_velocity_in_radians_per_second,
        )?;
        Self::validate_positive(
            "current_limits.steer_limit_in_amps",
            self.current_limits.steer_limit_in_amps(),
        )?;
        Self::validate_positive(
            "current_limits.drive_limit_in_amps",
            self.current_limits.drive_limit_in_amps(),
        )?;

        if !self.steer_gains.is_finite() {
            return Err(Error::InvalidConfigurationValue {
                name: "steer_gains".to_string(),
                value: f64::NAN,
            });
        }

        if !self.drive_gains.is_finite() {
            return Err(Error::InvalidConfigurationValue {
                name: "drive_gains".to_string(),
                value: f64::NAN,
            });
        }

        if self.control_period.is_zero() {
            return Err(Error::InvalidConfigurationValue {
                name: "control_period".to_string(),
                value: 0.0,
            });
        }

        Ok(())
    }

    /// Verifies that a single configuration value is finite and positive.
    fn validate_positive(name: &str, value: f64) -> Result<(), Error> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidConfigurationValue {
                name: name.to_string(),
                value,
            });
        }

        Ok(())
    }
}
