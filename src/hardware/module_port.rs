//! Defines the capability interface for one swerve module's hardware.
//!
//! A swerve module consists of a steering motor with a relative encoder, a
//! drive motor with a relative encoder and an absolute angle sensor used for
//! calibration only. The [ModulePort] trait exposes exactly those
//! capabilities, implemented once per motor controller vendor. The module
//! controller depends only on this trait, never on a concrete hardware
//! binding, which keeps the control logic free of vendor specific wrapper
//! code.
//!
//! All reads and writes are synchronous and are expected to complete well
//! within the control period. The closed position and velocity loops run in
//! the motor controller firmware, the port only carries their setpoints,
//! gains and current bounds.

use crate::{
    config::{CurrentLimits, PidGains},
    Error,
};

/// Defines the interface for the hardware of a single swerve module.
pub trait ModulePort {
    /// Returns the angle reported by the absolute angle sensor, in radians.
    ///
    /// The absolute sensor survives power loss, so this reading is used once
    /// at startup to recover the true mechanical angle without a homing
    /// motion. It is not used for tracking.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorReadFailure] - Returned when the sensor cannot be
    ///   read.
    fn absolute_angle_in_radians(&self) -> Result<f64, Error>;

    /// Applies the control loop gains and current bounds to the module
    /// hardware. Called once during construction of the module controller.
    ///
    /// ## Parameters
    ///
    /// * 'steer_gains' - The gains for the steering position loop.
    /// * 'drive_gains' - The gains for the drive velocity loop.
    /// * 'current_limits' - The continuous current bounds for both motors.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the configuration
    ///   cannot be written to the hardware.
    fn configure(
        &mut self,
        steer_gains: &PidGains,
        drive_gains: &PidGains,
        current_limits: &CurrentLimits,
    ) -> Result<(), Error>;

    /// Returns the accumulated drive distance in meters, relative to the
    /// arbitrary zero set when the hardware was initialized.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorReadFailure] - Returned when the encoder cannot be
    ///   read.
    fn drive_distance_in_meters(&self) -> Result<f64, Error>;

    /// Returns the measured drive velocity in meters per second.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorReadFailure] - Returned when the encoder cannot be
    ///   read.
    fn drive_velocity_in_meters_per_second(&self) -> Result<f64, Error>;

    /// Commands zero steering effort, leaving the wheel free to hold its
    /// current direction.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the command cannot be
    ///   written.
    fn hold_steer(&mut self) -> Result<(), Error>;

    /// Seeds the relative steering encoder with a known mechanical angle.
    ///
    /// ## Parameters
    ///
    /// * 'angle_in_radians' - The true mechanical angle of the wheel.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the encoder cannot be
    ///   written.
    fn seed_steer_angle(&mut self, angle_in_radians: f64) -> Result<(), Error>;

    /// Commands the drive motor with a direct output fraction in `[-1, 1]`.
    /// Used for open-loop control.
    ///
    /// ## Parameters
    ///
    /// * 'fraction' - The fraction of the full output to apply.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the command cannot be
    ///   written.
    fn set_drive_duty_cycle(&mut self, fraction: f64) -> Result<(), Error>;

    /// Commands the closed-loop drive velocity controller with a new
    /// setpoint.
    ///
    /// ## Parameters
    ///
    /// * 'velocity_in_meters_per_second' - The wheel velocity setpoint.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the setpoint cannot be
    ///   written.
    fn set_drive_velocity(&mut self, velocity_in_meters_per_second: f64) -> Result<(), Error>;

    /// Commands the closed-loop steering position controller with a new
    /// setpoint. The setpoint is a continuous angle, it is not wrapped to a
    /// single turn.
    ///
    /// ## Parameters
    ///
    /// * 'angle_in_radians' - The continuous steering angle setpoint.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the setpoint cannot be
    ///   written.
    fn set_steer_setpoint(&mut self, angle_in_radians: f64) -> Result<(), Error>;

    /// Returns the continuous steering angle from the relative encoder, in
    /// radians.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorReadFailure] - Returned when the encoder cannot be
    ///   read.
    fn steer_angle_in_radians(&self) -> Result<f64, Error>;
}
