//! Defines the closed-loop tracking controller for a single swerve module.
//!
//! The controller owns the hardware port for one physical module. On
//! construction it recovers the true mechanical wheel angle from the absolute
//! angle sensor and seeds the continuous relative encoder with it, so no
//! homing motion is needed after power loss. From then on it tracks
//! commanded (speed, angle) targets, running the target through the angle
//! optimizer against the measured angle first.
//!
//! Hardware faults are observable state, not control flow: a failed sensor
//! read falls back to the last known good value and raises a fault flag, a
//! failed actuator write is reported once and superseded by the next cycle's
//! command. A half-completed drive command is worse than a degraded one.

use log::{debug, warn};

use crate::{
    config::SwerveConfig,
    hardware::module_port::ModulePort,
    kinematics::{SwerveModulePosition, SwerveModuleState},
    optimizer::optimize,
    Error,
};

#[cfg(test)]
#[path = "module_tests.rs"]
mod module_tests;

/// Commanded speeds at or below this fraction of the platform maximum do not
/// produce a meaningful wheel direction, so the steering motor is left idle
/// to prevent the wheel from chattering while nearly stationary.
const STEER_DEADBAND_FRACTION: f64 = 0.01;

/// Defines the lifecycle phase of a module controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModulePhase {
    /// The controller has recovered the mechanical wheel angle from the
    /// absolute sensor but has not been commanded yet.
    Calibrated,

    /// The controller is tracking commanded targets.
    Tracking,
}

/// Stores the observable fault flags for one module.
///
/// Flags reflect the most recent interaction with the corresponding device,
/// a flag clears again as soon as the device responds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModuleFaults {
    /// The absolute angle sensor failed to read.
    absolute_sensor: bool,

    /// The relative steering encoder failed to read.
    steer_sensor: bool,

    /// The drive encoder failed to read.
    drive_sensor: bool,

    /// A steering command failed to write.
    steer_actuator: bool,

    /// A drive command failed to write.
    drive_actuator: bool,
}

impl ModuleFaults {
    /// Returns a value indicating whether the absolute angle sensor failed to
    /// read.
    pub fn absolute_sensor(&self) -> bool {
        self.absolute_sensor
    }

    /// Returns a value indicating whether any fault flag is raised.
    pub fn any(&self) -> bool {
        self.absolute_sensor
            || self.steer_sensor
            || self.drive_sensor
            || self.steer_actuator
            || self.drive_actuator
    }

    /// Returns a value indicating whether a drive command failed to write.
    pub fn drive_actuator(&self) -> bool {
        self.drive_actuator
    }

    /// Returns a value indicating whether the drive encoder failed to read.
    pub fn drive_sensor(&self) -> bool {
        self.drive_sensor
    }

    /// Returns a value indicating whether a steering command failed to write.
    pub fn steer_actuator(&self) -> bool {
        self.steer_actuator
    }

    /// Returns a value indicating whether the relative steering encoder
    /// failed to read.
    pub fn steer_sensor(&self) -> bool {
        self.steer_sensor
    }
}

/// Controls one physical swerve module through its hardware port.
pub struct SwerveModule {
    /// The index of the module in the configured geometry list.
    index: usize,

    /// The hardware capability interface for the module.
    port: Box<dyn ModulePort>,

    /// The platform maximum linear speed in meters per second.
    maximum_speed_in_meters_per_second: f64,

    /// The lifecycle phase of the controller.
    phase: ModulePhase,

    /// The observable fault flags for the module.
    faults: ModuleFaults,

    /// The last successfully measured continuous steering angle in radians.
    last_angle_in_radians: f64,

    /// The last successfully measured drive velocity in meters per second.
    last_velocity_in_meters_per_second: f64,

    /// The last successfully measured accumulated drive distance in meters.
    last_distance_in_meters: f64,

    /// The last successfully measured absolute sensor angle in radians.
    last_absolute_angle_in_radians: f64,
}

impl SwerveModule {
    /// Returns the most recent absolute sensor angle in radians, falling back
    /// to the last known good value when the sensor does not respond.
    pub fn absolute_angle_in_radians(&mut self) -> f64 {
        match self.port.absolute_angle_in_radians() {
            Ok(angle) => {
                self.faults.absolute_sensor = false;
                self.last_absolute_angle_in_radians = angle;
                angle
            }
            Err(_) => {
                self.report_fault("absolute angle sensor", self.faults.absolute_sensor);
                self.faults.absolute_sensor = true;
                self.last_absolute_angle_in_radians
            }
        }
    }

    /// Returns the observable fault flags for the module.
    pub fn faults(&self) -> ModuleFaults {
        self.faults
    }

    /// Returns the index of the module in the configured geometry list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creates a new [SwerveModule] and calibrates it against its absolute
    /// angle sensor.
    ///
    /// Calibration reads the absolute sensor, subtracts the configured
    /// calibration offset and seeds the continuous relative encoder with the
    /// result. This recovers the true mechanical angle after power loss
    /// without a homing motion.
    ///
    /// ## Parameters
    ///
    /// * 'index' - The index of the module in the configured geometry list.
    /// * 'port' - The hardware capability interface for the module.
    /// * 'config' - The validated drivetrain configuration.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCalibrationFailure] - Returned when the absolute
    ///   sensor cannot be read or the relative encoder cannot be seeded. A
    ///   module without a known mechanical zero must not start tracking.
    /// * [Error::ActuatorWriteFailure] - Returned when the gains or current
    ///   bounds cannot be applied to the hardware.
    pub fn new(
        index: usize,
        mut port: Box<dyn ModulePort>,
        config: &SwerveConfig,
    ) -> Result<Self, Error> {
        port.configure(
            config.steer_gains(),
            config.drive_gains(),
            config.current_limits(),
        )?;

        let absolute_angle = port
            .absolute_angle_in_radians()
            .map_err(|_| Error::ModuleCalibrationFailure {
                module_index: index,
            })?;

        let calibration_offset = config.modules()[index]
            .calibration_offset_in_degrees()
            .to_radians();
        let mechanical_angle = absolute_angle - calibration_offset;

        port.seed_steer_angle(mechanical_angle)
            .map_err(|_| Error::ModuleCalibrationFailure {
                module_index: index,
            })?;

        debug!(
            "Module {}: calibrated, absolute angle {:.4} rad, mechanical angle {:.4} rad.",
            index, absolute_angle, mechanical_angle
        );

        Ok(Self {
            index,
            port,
            maximum_speed_in_meters_per_second: config.maximum_speed_in_meters_per_second(),
            phase: ModulePhase::Calibrated,
            faults: ModuleFaults::default(),
            last_angle_in_radians: mechanical_angle,
            last_velocity_in_meters_per_second: 0.0,
            last_distance_in_meters: 0.0,
            last_absolute_angle_in_radians: absolute_angle,
        })
    }

    /// Returns the lifecycle phase of the controller.
    pub fn phase(&self) -> ModulePhase {
        self.phase
    }

    /// Returns the accumulated position of the module, falling back to the
    /// last known good values when a sensor does not respond.
    pub fn position(&mut self) -> SwerveModulePosition {
        match self.port.drive_distance_in_meters() {
            Ok(distance) => {
                self.faults.drive_sensor = false;
                self.last_distance_in_meters = distance;
            }
            Err(_) => {
                self.report_fault("drive encoder", self.faults.drive_sensor);
                self.faults.drive_sensor = true;
            }
        }

        SwerveModulePosition::new(self.last_distance_in_meters, self.measured_angle())
    }

    /// Logs a device fault on the transition from healthy to faulted, so a
    /// persistent fault is reported once rather than every cycle.
    fn report_fault(&self, device: &str, already_faulted: bool) {
        if !already_faulted {
            warn!("Module {}: {} is not responding.", self.index, device);
        }
    }

    /// Commands the module toward the given target.
    ///
    /// The target is first optimized against the measured steering angle so
    /// the wheel never rotates more than a quarter turn. Targets at or below
    /// one percent of the platform maximum speed leave the steering motor
    /// idle to prevent chatter while nearly stationary.
    ///
    /// Hardware failures do not interrupt the command: they raise the module
    /// fault flags and the previous commanded state persists until the next
    /// cycle supersedes it.
    ///
    /// ## Parameters
    ///
    /// * 'target' - The desired module state.
    /// * 'open_loop' - When true the drive output is commanded directly as a
    ///   fraction of the full output, otherwise the closed-loop velocity
    ///   controller tracks the target speed.
    pub fn set_desired_state(&mut self, target: &SwerveModuleState, open_loop: bool) {
        let current_angle = self.measured_angle();
        let optimized = optimize(target, current_angle);

        let speed = optimized.speed_in_meters_per_second();

        let steer_result = if speed.abs()
            <= STEER_DEADBAND_FRACTION * self.maximum_speed_in_meters_per_second
        {
            self.port.hold_steer()
        } else {
            self.port.set_steer_setpoint(optimized.angle_in_radians())
        };
        match steer_result {
            Ok(()) => self.faults.steer_actuator = false,
            Err(_) => {
                self.report_fault("steering actuator", self.faults.steer_actuator);
                self.faults.steer_actuator = true;
            }
        }

        let drive_result = if open_loop {
            let fraction = (speed / self.maximum_speed_in_meters_per_second).clamp(-1.0, 1.0);
            self.port.set_drive_duty_cycle(fraction)
        } else {
            self.port.set_drive_velocity(speed)
        };
        match drive_result {
            Ok(()) => self.faults.drive_actuator = false,
            Err(_) => {
                self.report_fault("drive actuator", self.faults.drive_actuator);
                self.faults.drive_actuator = true;
            }
        }

        self.phase = ModulePhase::Tracking;
    }

    /// Returns the measured state of the module, falling back to the last
    /// known good values when a sensor does not respond.
    pub fn state(&mut self) -> SwerveModuleState {
        match self.port.drive_velocity_in_meters_per_second() {
            Ok(velocity) => {
                self.faults.drive_sensor = false;
                self.last_velocity_in_meters_per_second = velocity;
            }
            Err(_) => {
                self.report_fault("drive encoder", self.faults.drive_sensor);
                self.faults.drive_sensor = true;
            }
        }

        SwerveModuleState::new(self.last_velocity_in_meters_per_second, self.measured_angle())
    }

    /// Reads the continuous steering angle, falling back to the last known
    /// good value when the encoder does not respond.
    fn measured_angle(&mut self) -> f64 {
        match self.port.steer_angle_in_radians() {
            Ok(angle) => {
                self.faults.steer_sensor = false;
                self.last_angle_in_radians = angle;
                angle
            }
            Err(_) => {
                self.report_fault("steering encoder", self.faults.steer_sensor);
                self.faults.steer_sensor = true;
                self.last_angle_in_radians
            }
        }
    }
}
