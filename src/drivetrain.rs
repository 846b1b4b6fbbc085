/// Defines the closed-loop tracking controller for a single swerve module.
pub mod module;

/// Defines the dead-reckoning odometry estimator.
pub mod odometry;

/// Defines the top-level drivetrain coordinator.
pub mod swerve;
