//! Defines the forward and inverse kinematics for a set of swerve modules.
//!
//! The forward map converts a desired body-frame velocity into one (speed,
//! angle) target per module. It is an exact linear map from the chassis
//! velocity `(vx, vy, omega)` to the per-module velocity vectors: for a
//! module mounted at offset `(x, y)` from the rotation center the module
//! velocity is the body translational velocity plus the rotational component
//! `omega x offset`, i.e. `(vx - omega * y, vy + omega * x)`.
//!
//! The inverse map is the least-squares pseudo-inverse of the same linear
//! map. With more than two modules the module measurements over-determine the
//! chassis velocity, so the pseudo-inverse yields the best fit in the
//! presence of measurement noise and wheel slip.

extern crate nalgebra as na;

use na::{DMatrix, DVector};

use crate::{
    config::ModuleGeometry,
    geometry::{ChassisSpeeds, Twist2d},
    Error,
};

#[cfg(test)]
#[path = "kinematics_tests.rs"]
mod kinematics_tests;

/// Module velocity magnitudes below this value cannot produce a meaningful
/// direction, so the previously commanded wheel heading is kept instead.
const SPEED_DIRECTION_LIMIT_IN_METERS_PER_SECOND: f64 = 1e-9;

/// Stores a commanded target or measured feedback value for one module.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwerveModuleState {
    /// The wheel speed in meters per second. Negative values drive the wheel
    /// backwards.
    speed_in_meters_per_second: f64,

    /// The steering angle in radians. The angle is continuous, it is not
    /// wrapped to a single turn.
    angle_in_radians: f64,
}

impl SwerveModuleState {
    /// Returns the steering angle in radians.
    pub fn angle_in_radians(&self) -> f64 {
        self.angle_in_radians
    }

    /// Creates a new [SwerveModuleState].
    ///
    /// ## Parameters
    ///
    /// * 'speed_in_meters_per_second' - The wheel speed.
    /// * 'angle_in_radians' - The continuous steering angle.
    pub fn new(speed_in_meters_per_second: f64, angle_in_radians: f64) -> Self {
        Self {
            speed_in_meters_per_second,
            angle_in_radians,
        }
    }

    /// Returns the wheel speed in meters per second.
    pub fn speed_in_meters_per_second(&self) -> f64 {
        self.speed_in_meters_per_second
    }
}

/// Stores the accumulated drive distance and steering angle for one module.
///
/// The distance is relative to an arbitrary zero that is set when the module
/// is constructed. Only differences between successive positions carry
/// meaning, which is exactly what the odometry estimator consumes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwerveModulePosition {
    /// The accumulated drive distance in meters.
    distance_in_meters: f64,

    /// The steering angle in radians.
    angle_in_radians: f64,
}

impl SwerveModulePosition {
    /// Returns the steering angle in radians.
    pub fn angle_in_radians(&self) -> f64 {
        self.angle_in_radians
    }

    /// Returns the accumulated drive distance in meters.
    pub fn distance_in_meters(&self) -> f64 {
        self.distance_in_meters
    }

    /// Creates a new [SwerveModulePosition].
    ///
    /// ## Parameters
    ///
    /// * 'distance_in_meters' - The accumulated drive distance.
    /// * 'angle_in_radians' - The steering angle.
    pub fn new(distance_in_meters: f64, angle_in_radians: f64) -> Self {
        Self {
            distance_in_meters,
            angle_in_radians,
        }
    }
}

/// Converts between whole-body chassis velocities and per-module targets for
/// a configured set of swerve modules.
///
/// The number of modules is taken from the configured geometry list, all
/// operations are written in terms of that count.
#[derive(Clone, Debug)]
pub struct SwerveKinematics {
    /// The position of each module relative to the rotation center, in
    /// meters. One entry per module.
    offsets_in_meters: Vec<na::Vector2<f64>>,

    /// The `2N x 3` matrix mapping a chassis velocity to the stacked module
    /// velocity vectors.
    forward_map: DMatrix<f64>,

    /// The `3 x 2N` least-squares pseudo-inverse of the forward map.
    inverse_map: DMatrix<f64>,

    /// The most recent wheel heading produced for each module. Used to keep
    /// the wheels pointed where they were when the commanded velocity drops
    /// to zero, where the direction is numerically undefined.
    last_headings_in_radians: Vec<f64>,
}

impl SwerveKinematics {
    /// Uniformly scales all module speeds so that none exceeds the given
    /// limit.
    ///
    /// When any computed speed exceeds the platform limit, every speed is
    /// multiplied by the same factor. This preserves the shape of the
    /// commanded motion, unlike clamping each module on its own which would
    /// change the direction of travel.
    ///
    /// ## Parameters
    ///
    /// * 'states' - The module targets to rescale in place.
    /// * 'maximum_speed_in_meters_per_second' - The platform speed limit.
    pub fn desaturate(states: &mut [SwerveModuleState], maximum_speed_in_meters_per_second: f64) {
        let highest_speed = states
            .iter()
            .map(|state| state.speed_in_meters_per_second().abs())
            .fold(0.0, f64::max);

        if highest_speed > maximum_speed_in_meters_per_second {
            let scale = maximum_speed_in_meters_per_second / highest_speed;
            for state in states.iter_mut() {
                state.speed_in_meters_per_second *= scale;
            }
        }
    }

    /// Returns the number of modules this kinematics instance was built for.
    pub fn module_count(&self) -> usize {
        self.offsets_in_meters.len()
    }

    /// Creates a new [SwerveKinematics] for the given module geometries.
    ///
    /// ## Parameters
    ///
    /// * 'modules' - The geometry for each module, at least two entries.
    ///
    /// ## Errors
    ///
    /// * [Error::TooFewModules] - Returned when fewer than two module
    ///   geometries are provided.
    /// * [Error::DegenerateModuleLayout] - Returned when the module offsets do
    ///   not permit a least-squares inversion of the forward map.
    pub fn new(modules: &[ModuleGeometry]) -> Result<Self, Error> {
        if modules.len() < 2 {
            return Err(Error::TooFewModules {
                minimum: 2,
                provided: modules.len(),
            });
        }

        let offsets_in_meters: Vec<na::Vector2<f64>> = modules
            .iter()
            .map(|module| *module.offset_in_meters())
            .collect();

        let mut forward_map = DMatrix::<f64>::zeros(2 * offsets_in_meters.len(), 3);
        for (index, offset) in offsets_in_meters.iter().enumerate() {
            forward_map[(2 * index, 0)] = 1.0;
            forward_map[(2 * index, 2)] = -offset.y;
            forward_map[(2 * index + 1, 1)] = 1.0;
            forward_map[(2 * index + 1, 2)] = offset.x;
        }

        // A rank-deficient layout, e.g. all modules mounted in the same
        // location, cannot separate translation from rotation.
        if forward_map.rank(1e-10) < 3 {
            return Err(Error::DegenerateModuleLayout);
        }

        let inverse_map = forward_map
            .clone()
            .pseudo_inverse(1e-10)
            .map_err(|_| Error::DegenerateModuleLayout)?;

        let last_headings_in_radians = vec![0.0; offsets_in_meters.len()];

        Ok(Self {
            offsets_in_meters,
            forward_map,
            inverse_map,
            last_headings_in_radians,
        })
    }

    /// Reconstructs the body-frame chassis velocity from measured module
    /// states using the least-squares inverse of the forward map.
    ///
    /// ## Parameters
    ///
    /// * 'states' - The measured state of each module.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of states
    ///   does not match the number of configured modules.
    pub fn to_chassis_speeds(&self, states: &[SwerveModuleState]) -> Result<ChassisSpeeds, Error> {
        if states.len() != self.offsets_in_meters.len() {
            return Err(Error::ModuleCountMismatch {
                expected: self.offsets_in_meters.len(),
                provided: states.len(),
            });
        }

        let mut module_velocities = DVector::<f64>::zeros(2 * states.len());
        for (index, state) in states.iter().enumerate() {
            let speed = state.speed_in_meters_per_second();
            module_velocities[2 * index] = speed * state.angle_in_radians().cos();
            module_velocities[2 * index + 1] = speed * state.angle_in_radians().sin();
        }

        let chassis = &self.inverse_map * module_velocities;
        Ok(ChassisSpeeds::new(chassis[0], chassis[1], chassis[2]))
    }

    /// Converts a desired body-frame chassis velocity into one target per
    /// module.
    ///
    /// A module whose required velocity vector is zero keeps its previously
    /// commanded heading, because the direction of a zero vector is
    /// undefined and forcing an arbitrary angle would spin the wheel for no
    /// reason.
    ///
    /// ## Parameters
    ///
    /// * 'speeds' - The desired body-frame chassis velocity.
    pub fn to_module_states(&mut self, speeds: &ChassisSpeeds) -> Vec<SwerveModuleState> {
        let chassis = DVector::from_column_slice(&[
            speeds.vx_in_meters_per_second(),
            speeds.vy_in_meters_per_second(),
            speeds.omega_in_radians_per_second(),
        ]);
        let module_velocities = &self.forward_map * chassis;

        let mut states = Vec::with_capacity(self.offsets_in_meters.len());
        for index in 0..self.offsets_in_meters.len() {
            let vx = module_velocities[2 * index];
            let vy = module_velocities[2 * index + 1];

            let speed = vx.hypot(vy);
            let angle = if speed < SPEED_DIRECTION_LIMIT_IN_METERS_PER_SECOND {
                self.last_headings_in_radians[index]
            } else {
                let direction = vy.atan2(vx);
                self.last_headings_in_radians[index] = direction;
                direction
            };

            states.push(SwerveModuleState::new(speed, angle));
        }

        states
    }

    /// Computes the body-frame twist corresponding to a set of module
    /// position deltas.
    ///
    /// The same least-squares inverse used for velocities applies to small
    /// displacements: each delta is treated as a displacement vector along
    /// the measured wheel heading.
    ///
    /// ## Parameters
    ///
    /// * 'deltas' - The change in position of each module over one cycle.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of deltas
    ///   does not match the number of configured modules.
    pub fn twist_from_module_deltas(
        &self,
        deltas: &[SwerveModulePosition],
    ) -> Result<Twist2d, Error> {
        if deltas.len() != self.offsets_in_meters.len() {
            return Err(Error::ModuleCountMismatch {
                expected: self.offsets_in_meters.len(),
                provided: deltas.len(),
            });
        }

        let mut module_displacements = DVector::<f64>::zeros(2 * deltas.len());
        for (index, delta) in deltas.iter().enumerate() {
            let distance = delta.distance_in_meters();
            module_displacements[2 * index] = distance * delta.angle_in_radians().cos();
            module_displacements[2 * index + 1] = distance * delta.angle_in_radians().sin();
        }

        let twist = &self.inverse_map * module_displacements;
        Ok(Twist2d::new(twist[0], twist[1], twist[2]))
    }
}
