//! Provides the write-only telemetry records published to the dashboard.
//!
//! The control core never reads telemetry back. Records are pushed over a
//! bounded channel with a non-blocking send: when the dashboard consumer
//! falls behind or disappears the record is dropped, the control loop is
//! never allowed to stall on observability.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::geometry::Pose2d;

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod telemetry_tests;

/// Stores the published measurements for one module.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModuleTelemetry {
    /// The index of the module in the configured geometry list.
    index: usize,

    /// The measured continuous steering angle in radians.
    angle_in_radians: f64,

    /// The raw absolute sensor angle in radians.
    absolute_angle_in_radians: f64,

    /// The measured wheel speed in meters per second.
    speed_in_meters_per_second: f64,

    /// A flag indicating whether any fault flag is raised on the module.
    faulted: bool,
}

impl ModuleTelemetry {
    /// Returns the raw absolute sensor angle in radians.
    pub fn absolute_angle_in_radians(&self) -> f64 {
        self.absolute_angle_in_radians
    }

    /// Returns the measured continuous steering angle in radians.
    pub fn angle_in_radians(&self) -> f64 {
        self.angle_in_radians
    }

    /// Returns a value indicating whether any fault flag is raised on the
    /// module.
    pub fn faulted(&self) -> bool {
        self.faulted
    }

    /// Returns the index of the module in the configured geometry list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creates a new [ModuleTelemetry] value.
    ///
    /// ## Parameters
    ///
    /// * 'index' - The index of the module.
    /// * 'angle_in_radians' - The measured continuous steering angle.
    /// * 'absolute_angle_in_radians' - The raw absolute sensor angle.
    /// * 'speed_in_meters_per_second' - The measured wheel speed.
    /// * 'faulted' - Whether any fault flag is raised on the module.
    pub fn new(
        index: usize,
        angle_in_radians: f64,
        absolute_angle_in_radians: f64,
        speed_in_meters_per_second: f64,
        faulted: bool,
    ) -> Self {
        Self {
            index,
            angle_in_radians,
            absolute_angle_in_radians,
            speed_in_meters_per_second,
            faulted,
        }
    }

    /// Returns the measured wheel speed in meters per second.
    pub fn speed_in_meters_per_second(&self) -> f64 {
        self.speed_in_meters_per_second
    }
}

/// Stores one control cycle's worth of published drivetrain state.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryRecord {
    /// The gyroscope yaw in degrees, continuous and unwrapped.
    yaw_in_degrees: f64,

    /// The current estimated pose.
    pose: Pose2d,

    /// The measurements for each module.
    modules: Vec<ModuleTelemetry>,

    /// A flag indicating whether the previous periodic update exceeded the
    /// control period budget.
    overran_previous_cycle: bool,
}

impl TelemetryRecord {
    /// Returns the measurements for each module.
    pub fn modules(&self) -> &[ModuleTelemetry] {
        &self.modules
    }

    /// Creates a new [TelemetryRecord].
    ///
    /// ## Parameters
    ///
    /// * 'yaw_in_degrees' - The gyroscope yaw, continuous and unwrapped.
    /// * 'pose' - The current estimated pose.
    /// * 'modules' - The measurements for each module.
    /// * 'overran_previous_cycle' - Whether the previous periodic update
    ///   exceeded the control period budget.
    pub fn new(
        yaw_in_degrees: f64,
        pose: Pose2d,
        modules: Vec<ModuleTelemetry>,
        overran_previous_cycle: bool,
    ) -> Self {
        Self {
            yaw_in_degrees,
            pose,
            modules,
            overran_previous_cycle,
        }
    }

    /// Returns a value indicating whether the previous periodic update
    /// exceeded the control period budget.
    pub fn overran_previous_cycle(&self) -> bool {
        self.overran_previous_cycle
    }

    /// Returns the current estimated pose.
    pub fn pose(&self) -> &Pose2d {
        &self.pose
    }

    /// Returns the gyroscope yaw in degrees.
    pub fn yaw_in_degrees(&self) -> f64 {
        self.yaw_in_degrees
    }
}

/// Publishes telemetry records to the external dashboard collaborator.
pub struct TelemetryPublisher {
    /// The sending half of the bounded telemetry channel.
    sender: Sender<TelemetryRecord>,
}

impl TelemetryPublisher {
    /// Creates a new [TelemetryPublisher] together with the receiving half
    /// of its channel. The receiver is handed to the dashboard collaborator.
    ///
    /// ## Parameters
    ///
    /// * 'capacity' - The number of records the channel buffers before
    ///   publishing starts dropping records.
    pub fn new(capacity: usize) -> (TelemetryPublisher, Receiver<TelemetryRecord>) {
        let (sender, receiver) = bounded(capacity);
        (TelemetryPublisher { sender }, receiver)
    }

    /// Publishes a record without blocking.
    ///
    /// Returns a value indicating whether the record was accepted. A full or
    /// disconnected channel drops the record, the control loop never waits
    /// for the dashboard.
    ///
    /// ## Parameters
    ///
    /// * 'record' - The record to publish.
    pub fn publish(&self, record: TelemetryRecord) -> bool {
        match self.sender.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
