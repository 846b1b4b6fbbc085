//! Defines the top-level drivetrain coordinator.
//!
//! The coordinator owns the module controllers, the gyroscope and the
//! odometry estimator. It is driven from a single control thread: the
//! platform runtime calls [SwerveDrive::update] once per fixed control
//! period and passes a fresh [DriveCommand] into [SwerveDrive::drive] each
//! cycle. No state is shared across threads and no operation blocks, every
//! call is one synchronous step that either completes or leaves the previous
//! commanded state in place.

extern crate nalgebra as na;

use std::time::Instant;

use log::warn;
use na::Vector2;

use crate::{
    config::{PoseAxisConvention, SwerveConfig},
    discretization::correct_for_discretization,
    drivetrain::{module::SwerveModule, odometry::SwerveOdometry},
    geometry::{ChassisSpeeds, Pose2d},
    hardware::{gyro::GyroPort, module_port::ModulePort},
    kinematics::{SwerveKinematics, SwerveModulePosition, SwerveModuleState},
    telemetry::{ModuleTelemetry, TelemetryPublisher, TelemetryRecord},
    Error,
};

#[cfg(test)]
#[path = "swerve_tests.rs"]
mod swerve_tests;

/// Stores one cycle's worth of operator or autonomous driving input.
///
/// The command is passed into [SwerveDrive::drive] every cycle. Modes such
/// as field-relative or open-loop driving are part of the command rather
/// than process-wide state, which makes the coordinator a function of its
/// inputs plus its owned sensors and actuators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveCommand {
    /// The desired translational velocity in meters per second. Expressed in
    /// the body frame, or in the field frame when 'field_relative' is set.
    translation_in_meters_per_second: Vector2<f64>,

    /// The desired rotational velocity in radians per second,
    /// counter-clockwise positive.
    rotation_in_radians_per_second: f64,

    /// A flag indicating whether the translation is expressed in the field
    /// frame.
    field_relative: bool,

    /// A flag indicating whether the drive motors should be commanded
    /// open-loop instead of through their velocity controllers.
    open_loop: bool,
}

impl DriveCommand {
    /// Returns a value indicating whether the translation is expressed in
    /// the field frame.
    pub fn field_relative(&self) -> bool {
        self.field_relative
    }

    /// Creates a new [DriveCommand].
    ///
    /// ## Parameters
    ///
    /// * 'translation_in_meters_per_second' - The desired translational
    ///   velocity.
    /// * 'rotation_in_radians_per_second' - The desired rotational velocity.
    /// * 'field_relative' - Whether the translation is expressed in the
    ///   field frame.
    /// * 'open_loop' - Whether the drive motors should be commanded
    ///   open-loop.
    pub fn new(
        translation_in_meters_per_second: Vector2<f64>,
        rotation_in_radians_per_second: f64,
        field_relative: bool,
        open_loop: bool,
    ) -> Self {
        Self {
            translation_in_meters_per_second,
            rotation_in_radians_per_second,
            field_relative,
            open_loop,
        }
    }

    /// Returns a value indicating whether the drive motors should be
    /// commanded open-loop.
    pub fn open_loop(&self) -> bool {
        self.open_loop
    }

    /// Returns the desired rotational velocity in radians per second.
    pub fn rotation_in_radians_per_second(&self) -> f64 {
        self.rotation_in_radians_per_second
    }

    /// Returns the desired translational velocity in meters per second.
    pub fn translation_in_meters_per_second(&self) -> &Vector2<f64> {
        &self.translation_in_meters_per_second
    }
}

/// Coordinates the swerve modules, the gyroscope and the odometry estimator
/// into a drivable platform.
pub struct SwerveDrive {
    /// The validated drivetrain configuration.
    config: SwerveConfig,

    /// The kinematics for the configured module layout.
    kinematics: SwerveKinematics,

    /// The module controllers, one per configured module geometry.
    modules: Vec<SwerveModule>,

    /// The gyroscope capability interface.
    gyro: Box<dyn GyroPort>,

    /// The dead-reckoning pose estimator.
    odometry: SwerveOdometry,

    /// The optional telemetry publisher for the dashboard collaborator.
    telemetry: Option<TelemetryPublisher>,

    /// The last successfully read gyroscope yaw in degrees, after the invert
    /// policy has been applied.
    last_yaw_in_degrees: f64,

    /// A flag indicating whether the most recent gyroscope read failed.
    gyro_fault: bool,

    /// A flag indicating whether the previous periodic update exceeded the
    /// control period budget.
    overran_previous_cycle: bool,
}

impl SwerveDrive {
    /// Drives the platform with the given per-cycle command.
    ///
    /// A field-relative translation is rotated into the body frame using the
    /// gyroscope heading, not the odometry pose, to avoid feeding a possibly
    /// stale pose estimate back into the command path. The commanded
    /// velocity is then corrected for discretization, converted into module
    /// targets, desaturated uniformly and dispatched to the modules.
    ///
    /// ## Parameters
    ///
    /// * 'command' - The driving input for this cycle. Calling twice in one
    ///   cycle simply overwrites the previous target.
    pub fn drive(&mut self, command: &DriveCommand) {
        let translation = command.translation_in_meters_per_second();
        let speeds = if command.field_relative() {
            ChassisSpeeds::from_field_relative(
                translation.x,
                translation.y,
                command.rotation_in_radians_per_second(),
                self.heading_in_radians(),
            )
        } else {
            ChassisSpeeds::new(
                translation.x,
                translation.y,
                command.rotation_in_radians_per_second(),
            )
        };

        let corrected = correct_for_discretization(&speeds, self.config.control_period());

        let mut states = self.kinematics.to_module_states(&corrected);
        SwerveKinematics::desaturate(
            &mut states,
            self.config.maximum_speed_in_meters_per_second(),
        );

        for (module, state) in self.modules.iter_mut().zip(states.iter()) {
            module.set_desired_state(state, command.open_loop());
        }
    }

    /// Returns the current estimated pose, expressed under the configured
    /// pose axis convention.
    pub fn get_pose(&self) -> Pose2d {
        let pose = self.odometry.pose();
        match self.config.pose_axis_convention() {
            PoseAxisConvention::Standard => pose,
            PoseAxisConvention::MirroredXy => Pose2d::new(
                -pose.x_in_meters(),
                -pose.y_in_meters(),
                pose.heading_in_radians(),
            ),
        }
    }

    /// Returns the current gyroscope heading in radians, continuous, with
    /// the configured invert policy applied. Falls back to the last known
    /// good value when the gyroscope does not respond.
    pub fn heading_in_radians(&mut self) -> f64 {
        self.yaw_in_degrees().to_radians()
    }

    /// Returns the measured position of every module.
    pub fn module_positions(&mut self) -> Vec<SwerveModulePosition> {
        self.modules
            .iter_mut()
            .map(|module| module.position())
            .collect()
    }

    /// Returns the measured state of every module.
    pub fn module_states(&mut self) -> Vec<SwerveModuleState> {
        self.modules.iter_mut().map(|module| module.state()).collect()
    }

    /// Creates a new [SwerveDrive].
    ///
    /// Construction validates that the hardware matches the configuration,
    /// calibrates every module against its absolute angle sensor and zeroes
    /// the gyroscope. An invalid configuration or a module that cannot
    /// establish its mechanical zero is fatal: the coordinator must not
    /// produce commands with undefined geometry.
    ///
    /// ## Parameters
    ///
    /// * 'config' - The validated drivetrain configuration.
    /// * 'ports' - One hardware port per configured module geometry, in the
    ///   same order as the geometry list.
    /// * 'gyro' - The gyroscope capability interface.
    /// * 'telemetry' - The optional telemetry publisher for the dashboard.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of ports
    ///   does not match the number of configured module geometries.
    /// * [Error::TooFewModules] - Returned when the configuration holds
    ///   fewer than two modules.
    /// * [Error::DegenerateModuleLayout] - Returned when the module offsets
    ///   do not permit a kinematic inversion.
    /// * [Error::ModuleCalibrationFailure] - Returned when a module cannot
    ///   recover its mechanical zero.
    /// * [Error::SensorReadFailure] - Returned when the gyroscope cannot be
    ///   read during construction.
    /// * [Error::ActuatorWriteFailure] - Returned when module gains cannot
    ///   be applied or the gyroscope cannot be zeroed.
    pub fn new(
        config: SwerveConfig,
        ports: Vec<Box<dyn ModulePort>>,
        gyro: Box<dyn GyroPort>,
        telemetry: Option<TelemetryPublisher>,
    ) -> Result<Self, Error> {
        if ports.len() != config.module_count() {
            return Err(Error::ModuleCountMismatch {
                expected: config.module_count(),
                provided: ports.len(),
            });
        }

        let kinematics = SwerveKinematics::new(config.modules())?;

        let mut modules = Vec::with_capacity(ports.len());
        for (index, port) in ports.into_iter().enumerate() {
            modules.push(SwerveModule::new(index, port, &config)?);
        }

        let mut gyro = gyro;
        gyro.set_yaw(0.0)?;
        let raw_yaw_in_degrees = gyro.yaw_in_degrees()?;
        let yaw_in_degrees = if config.invert_gyro() {
            -raw_yaw_in_degrees
        } else {
            raw_yaw_in_degrees
        };

        let positions: Vec<SwerveModulePosition> = modules
            .iter_mut()
            .map(|module| module.position())
            .collect();
        let odometry =
            SwerveOdometry::new(kinematics.clone(), yaw_in_degrees.to_radians(), &positions)?;

        Ok(Self {
            config,
            kinematics,
            modules,
            gyro,
            odometry,
            telemetry,
            last_yaw_in_degrees: yaw_in_degrees,
            gyro_fault: false,
            overran_previous_cycle: false,
        })
    }

    /// Forces the odometry estimator to a known pose and re-zeroes the
    /// gyroscope so that the reported heading matches the pose heading.
    ///
    /// ## Parameters
    ///
    /// * 'pose' - The known true pose of the robot.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the gyroscope does
    ///   not accept its new reference zero.
    pub fn reset_odometry(&mut self, pose: Pose2d) -> Result<(), Error> {
        self.zero_gyro(pose.heading_in_radians().to_degrees())?;

        let heading = self.heading_in_radians();
        let positions = self.module_positions();
        self.odometry.reset(pose, heading, &positions)
    }

    /// Dispatches externally computed module targets directly.
    ///
    /// The targets are desaturated and handed to the modules under
    /// closed-loop control. Field-relative rotation and discretization
    /// correction are bypassed: a trajectory follower that produces module
    /// states has already accounted for the real path.
    ///
    /// ## Parameters
    ///
    /// * 'states' - One target per configured module, in geometry order.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of targets
    ///   does not match the number of configured modules.
    pub fn set_module_states(&mut self, states: &[SwerveModuleState]) -> Result<(), Error> {
        if states.len() != self.modules.len() {
            return Err(Error::ModuleCountMismatch {
                expected: self.modules.len(),
                provided: states.len(),
            });
        }

        let mut desaturated = states.to_vec();
        SwerveKinematics::desaturate(
            &mut desaturated,
            self.config.maximum_speed_in_meters_per_second(),
        );

        for (module, state) in self.modules.iter_mut().zip(desaturated.iter()) {
            module.set_desired_state(state, false);
        }

        Ok(())
    }

    /// Runs one periodic cycle: read the gyroscope and module feedback, feed
    /// the odometry estimator and publish telemetry.
    ///
    /// Exceeding the control period budget is a timing fault: it is reported
    /// and surfaced in the next telemetry record, but the cycle's math
    /// always completes once started.
    pub fn update(&mut self) {
        let cycle_start = Instant::now();

        let yaw_in_degrees = self.yaw_in_degrees();
        let heading = yaw_in_degrees.to_radians();
        let positions = self.module_positions();

        if let Err(error) = self.odometry.update(heading, &positions) {
            warn!("Odometry update rejected the module positions: {}.", error);
        }

        self.publish_telemetry(yaw_in_degrees);
        self.record_cycle_time(cycle_start);
    }

    /// Returns the current gyroscope yaw in degrees, continuous, with the
    /// configured invert policy applied. Falls back to the last known good
    /// value when the gyroscope does not respond.
    pub fn yaw_in_degrees(&mut self) -> f64 {
        match self.gyro.yaw_in_degrees() {
            Ok(raw) => {
                self.gyro_fault = false;
                self.last_yaw_in_degrees = if self.config.invert_gyro() { -raw } else { raw };
            }
            Err(_) => {
                if !self.gyro_fault {
                    warn!("The gyroscope is not responding, holding the last known heading.");
                }

                self.gyro_fault = true;
            }
        }

        self.last_yaw_in_degrees
    }

    /// Sets the gyroscope reference zero and immediately re-syncs the
    /// odometry estimator so that the pose heading and the gyroscope agree.
    ///
    /// ## Parameters
    ///
    /// * 'yaw_in_degrees' - The yaw the current physical heading should read
    ///   as, before the invert policy is applied.
    ///
    /// ## Errors
    ///
    /// * [Error::ActuatorWriteFailure] - Returned when the gyroscope does
    ///   not accept the new reference.
    pub fn zero_gyro(&mut self, yaw_in_degrees: f64) -> Result<(), Error> {
        let sensor_yaw = if self.config.invert_gyro() {
            -yaw_in_degrees
        } else {
            yaw_in_degrees
        };

        self.gyro.set_yaw(sensor_yaw)?;

        let heading = self.heading_in_radians();
        self.odometry.sync_heading(heading);
        Ok(())
    }

    /// Builds and publishes the telemetry record for this cycle.
    fn publish_telemetry(&mut self, yaw_in_degrees: f64) {
        if self.telemetry.is_none() {
            return;
        }

        let mut module_records = Vec::with_capacity(self.modules.len());
        for module in self.modules.iter_mut() {
            let state = module.state();
            module_records.push(ModuleTelemetry::new(
                module.index(),
                state.angle_in_radians(),
                module.absolute_angle_in_radians(),
                state.speed_in_meters_per_second(),
                module.faults().any(),
            ));
        }

        let record = TelemetryRecord::new(
            yaw_in_degrees,
            self.get_pose(),
            module_records,
            self.overran_previous_cycle,
        );

        if let Some(publisher) = &self.telemetry {
            publisher.publish(record);
        }
    }

    /// Measures the elapsed cycle time against the control period budget and
    /// reports a timing fault when the budget was exceeded.
    #[cfg_attr(test, mutants::skip)] // Wall clock dependent, cannot be checked deterministically
    fn record_cycle_time(&mut self, cycle_start: Instant) {
        let elapsed = cycle_start.elapsed();
        self.overran_previous_cycle = elapsed > self.config.control_period();
        if self.overran_previous_cycle {
            warn!(
                "The periodic update took {} us, exceeding the {} us control period.",
                elapsed.as_micros(),
                self.config.control_period().as_micros()
            );
        }
    }
}
