//! Defines the dead-reckoning odometry estimator.
//!
//! The estimator integrates module position deltas into a running 2D pose.
//! Wheel geometry is the ground truth for translation, but wheels slip, so
//! the rotational component of every increment is overridden with the delta
//! between consecutive gyroscope headings: the gyroscope is authoritative
//! for heading. Each increment is composed onto the pose with the exact
//! rigid-body exponential rather than a linear approximation, which keeps
//! heading-dependent translational error from accumulating over long runs.

use crate::{
    geometry::Pose2d,
    kinematics::{SwerveKinematics, SwerveModulePosition},
    Error,
};

#[cfg(test)]
#[path = "odometry_tests.rs"]
mod odometry_tests;

/// Tracks the estimated pose of the robot by dead reckoning.
#[derive(Debug)]
pub struct SwerveOdometry {
    /// The kinematics used to convert module position deltas into a body
    /// twist.
    kinematics: SwerveKinematics,

    /// The current estimated pose in the field frame.
    pose: Pose2d,

    /// The gyroscope heading at the previous update, in radians, continuous.
    previous_heading_in_radians: f64,

    /// The module positions at the previous update.
    previous_positions: Vec<SwerveModulePosition>,
}

impl SwerveOdometry {
    /// Creates a new [SwerveOdometry] starting at the identity pose.
    ///
    /// ## Parameters
    ///
    /// * 'kinematics' - The kinematics for the configured module layout.
    /// * 'heading_in_radians' - The current gyroscope heading.
    /// * 'positions' - The current module positions, used as the reference
    ///   point for the first increment.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of positions
    ///   does not match the number of configured modules.
    pub fn new(
        kinematics: SwerveKinematics,
        heading_in_radians: f64,
        positions: &[SwerveModulePosition],
    ) -> Result<Self, Error> {
        if positions.len() != kinematics.module_count() {
            return Err(Error::ModuleCountMismatch {
                expected: kinematics.module_count(),
                provided: positions.len(),
            });
        }

        Ok(Self {
            kinematics,
            pose: Pose2d::identity(),
            previous_heading_in_radians: heading_in_radians,
            previous_positions: positions.to_vec(),
        })
    }

    /// Returns the current estimated pose.
    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    /// Forces the estimator to a known pose and re-bases the gyroscope and
    /// module position reference points.
    ///
    /// ## Parameters
    ///
    /// * 'pose' - The known true pose of the robot.
    /// * 'heading_in_radians' - The current gyroscope heading.
    /// * 'positions' - The current module positions.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of positions
    ///   does not match the number of configured modules.
    pub fn reset(
        &mut self,
        pose: Pose2d,
        heading_in_radians: f64,
        positions: &[SwerveModulePosition],
    ) -> Result<(), Error> {
        if positions.len() != self.kinematics.module_count() {
            return Err(Error::ModuleCountMismatch {
                expected: self.kinematics.module_count(),
                provided: positions.len(),
            });
        }

        self.pose = pose;
        self.previous_heading_in_radians = heading_in_radians;
        self.previous_positions = positions.to_vec();
        Ok(())
    }

    /// Overwrites the heading of the estimated pose and the gyroscope
    /// reference point without touching the position estimate.
    ///
    /// Used after the gyroscope reference zero changes, so that the pose
    /// heading and the gyroscope agree at that instant.
    ///
    /// ## Parameters
    ///
    /// * 'heading_in_radians' - The new gyroscope heading.
    pub fn sync_heading(&mut self, heading_in_radians: f64) {
        self.pose = Pose2d::new(
            self.pose.x_in_meters(),
            self.pose.y_in_meters(),
            heading_in_radians,
        );
        self.previous_heading_in_radians = heading_in_radians;
    }

    /// Integrates one cycle of module motion into the pose estimate.
    ///
    /// ## Parameters
    ///
    /// * 'heading_in_radians' - The current gyroscope heading, continuous.
    /// * 'positions' - The current module positions.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of positions
    ///   does not match the number of configured modules.
    pub fn update(
        &mut self,
        heading_in_radians: f64,
        positions: &[SwerveModulePosition],
    ) -> Result<Pose2d, Error> {
        if positions.len() != self.kinematics.module_count() {
            return Err(Error::ModuleCountMismatch {
                expected: self.kinematics.module_count(),
                provided: positions.len(),
            });
        }

        let deltas: Vec<SwerveModulePosition> = positions
            .iter()
            .zip(self.previous_positions.iter())
            .map(|(current, previous)| {
                SwerveModulePosition::new(
                    current.distance_in_meters() - previous.distance_in_meters(),
                    current.angle_in_radians(),
                )
            })
            .collect();

        let wheel_twist = self.kinematics.twist_from_module_deltas(&deltas)?;

        // The gyroscope overrides the wheel derived rotation.
        let twist =
            wheel_twist.with_rotation(heading_in_radians - self.previous_heading_in_radians);

        self.pose = self.pose.exp(&twist);
        self.previous_heading_in_radians = heading_in_radians;
        self.previous_positions = positions.to_vec();

        Ok(self.pose)
    }
}
