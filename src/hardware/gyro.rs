//! Defines the capability interface for the gyroscope.

use crate::Error;

/// Defines the interface for the gyroscope that provides the authoritative
/// heading of the robot.
///
/// The yaw reading is continuous, it is not wrapped to a single turn. Whether
/// the reading increases clockwise or counter-clockwise depends on the sensor
/// mounting, the configured gyro-invert policy compensates for this in the
/// drivetrain coordinator.
pub trait GyroPort {
    /// Sets the reference zero of the gyroscope so that the current physical
    /// heading reads as the given yaw.
    ///
    /// ## Parameters
    ///
    /// * 'yaw_in_degrees' - The yaw value the sensor should report from now
    ///   on for the current heading.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the sensor does not
    ///   accept the new reference.
    fn set_yaw(&mut self, yaw_in_degrees: f64) -> Result<(), Error>;

    /// Returns the current yaw of the robot in degrees, continuous and
    /// unwrapped.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorReadFailure] - Returned when the sensor cannot be
    ///   read.
    fn yaw_in_degrees(&self) -> Result<f64, Error>;
}
