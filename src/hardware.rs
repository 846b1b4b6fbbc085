/// Defines the capability interface for one swerve module's actuators and
/// sensors.
pub mod module_port;

/// Defines the capability interface for the gyroscope.
pub mod gyro;
