#![warn(missing_docs)]

//! Control core for a swerve (all wheel steering and all wheel drive) robot.
//!
//! Provides the kinematics transform between whole-body motion commands and
//! per-module targets, the minimal-rotation angle optimization, the per-module
//! closed-loop tracking controller, the dead-reckoning pose estimator and the
//! discretization correction for commanded velocities. Hardware is reached
//! only through the capability traits in the [hardware] module so that the
//! control logic stays free of vendor specific wrapper code.

use thiserror::Error;

/// Defines the geometric primitives: poses, twists and chassis velocities.
pub mod geometry;

/// Defines the startup configuration for the drivetrain.
pub mod config;

/// Defines the forward and inverse kinematics for a set of swerve modules.
pub mod kinematics;

/// Defines the minimal-rotation angle optimization for module targets.
pub mod optimizer;

/// Defines the chord-vs-arc correction for discretely sampled velocity commands.
pub mod discretization;

/// Defines the capability interfaces for the drivetrain hardware.
pub mod hardware;

/// Defines the module controller, the odometry estimator and the drivetrain
/// coordinator.
pub mod drivetrain;

/// Provides the write-only telemetry records published to the dashboard.
pub mod telemetry;

/// Defines the different errors for the swerve control crate.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that the drivetrain was configured with fewer modules than
    /// are needed for a well-posed kinematic inversion.
    #[error("At least {minimum} swerve modules are required, but {provided} were configured.")]
    TooFewModules {
        /// The minimum number of modules required.
        minimum: usize,
        /// The number of modules that was provided.
        provided: usize,
    },

    /// Indicates that the number of module values passed to an operation does
    /// not match the number of configured modules.
    #[error("Expected values for {expected} modules but received {provided}.")]
    ModuleCountMismatch {
        /// The number of configured modules.
        expected: usize,
        /// The number of values that was provided.
        provided: usize,
    },

    /// Indicates that a configuration value is not valid, e.g. a non-finite
    /// gain or a non-positive limit.
    #[error("The configuration value '{name}' is not valid: {value}.")]
    InvalidConfigurationValue {
        /// The name of the offending configuration value.
        name: String,
        /// The value that was provided.
        value: f64,
    },

    /// Indicates that the forward kinematics matrix could not be inverted.
    /// This happens when the configured module offsets are degenerate, for
    /// instance when all modules are placed in the same location.
    #[error("The module layout does not permit a least-squares kinematic inversion.")]
    DegenerateModuleLayout,

    /// Indicates that reading from a hardware sensor failed.
    #[error("Failed to read from the '{device}' sensor.")]
    SensorReadFailure {
        /// The name of the device that failed.
        device: String,
    },

    /// Indicates that writing a command to a hardware actuator failed.
    #[error("Failed to write a command to the '{device}' actuator.")]
    ActuatorWriteFailure {
        /// The name of the device that failed.
        device: String,
    },

    /// Indicates that a module could not establish its mechanical zero from
    /// the absolute angle sensor during calibration.
    #[error("Module {module_index} failed to calibrate against its absolute angle sensor.")]
    ModuleCalibrationFailure {
        /// The index of the module that failed to calibrate.
        module_index: usize,
    },
}
