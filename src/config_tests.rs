use super::*;

use std::time::Duration;

use nalgebra::Vector2;

use crate::Error;

/// Returns a valid rectangular four module configuration for use in tests.
fn valid_config_parts() -> Vec<ModuleGeometry> {
    vec![
        ModuleGeometry::new(Vector2::new(0.3, 0.3), 11.07),
        ModuleGeometry::new(Vector2::new(0.3, -0.3), 259.28),
        ModuleGeometry::new(Vector2::new(-0.3, 0.3), 73.74),
        ModuleGeometry::new(Vector2::new(-0.3, -0.3), 5.27),
    ]
}

fn build_config(modules: Vec<ModuleGeometry>) -> Result<SwerveConfig, Error> {
    SwerveConfig::new(
        modules,
        4.0,
        5.0,
        false,
        PidGains::new(0.05, 0.0, 0.0, 0.0),
        PidGains::new(0.1, 0.0, 0.0, 0.0),
        CurrentLimits::new(20.0, 35.0),
        Duration::from_millis(20),
        PoseAxisConvention::Standard,
    )
}

#[test]
fn when_creating_valid_config_should_be_initialized() {
    let config = build_config(valid_config_parts()).unwrap();

    assert_eq!(config.module_count(), 4);
    assert_eq!(config.maximum_speed_in_meters_per_second(), 4.0);
    assert_eq!(config.maximum_angular_velocity_in_radians_per_second(), 5.0);
    assert!(!config.invert_gyro());
    assert_eq!(config.steer_gains().kp(), 0.05);
    assert_eq!(config.drive_gains().kp(), 0.1);
    assert_eq!(config.current_limits().steer_limit_in_amps(), 20.0);
    assert_eq!(config.current_limits().drive_limit_in_amps(), 35.0);
    assert_eq!(config.control_period(), Duration::from_millis(20));
    assert_eq!(config.pose_axis_convention(), PoseAxisConvention::Standard);
    assert_eq!(config.modules()[0].calibration_offset_in_degrees(), 11.07);
}

#[test]
fn when_creating_config_with_one_module_should_fail() {
    let result = build_config(vec![ModuleGeometry::new(Vector2::new(0.3, 0.3), 0.0)]);

    assert_eq!(
        result.unwrap_err(),
        Error::TooFewModules {
            minimum: 2,
            provided: 1
        }
    );
}

#[test]
fn when_creating_config_with_non_finite_offset_should_fail() {
    let mut modules = valid_config_parts();
    modules[2] = ModuleGeometry::new(Vector2::new(f64::NAN, -0.3), 0.0);

    let result = build_config(modules);

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. }) if name == "modules[2].offset_in_meters"
    ));
}

#[test]
fn when_creating_config_with_non_finite_calibration_offset_should_fail() {
    let mut modules = valid_config_parts();
    modules[1] = ModuleGeometry::new(Vector2::new(0.3, -0.3), f64::INFINITY);

    let result = build_config(modules);

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. })
            if name == "modules[1].calibration_offset_in_degrees"
    ));
}

#[test]
fn when_creating_config_with_non_positive_maximum_speed_should_fail() {
    let result = SwerveConfig::new(
        valid_config_parts(),
        0.0,
        5.0,
        false,
        PidGains::new(0.05, 0.0, 0.0, 0.0),
        PidGains::new(0.1, 0.0, 0.0, 0.0),
        CurrentLimits::new(20.0, 35.0),
        Duration::from_millis(20),
        PoseAxisConvention::Standard,
    );

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. })
            if name == "maximum_speed_in_meters_per_second"
    ));
}

#[test]
fn when_creating_config_with_non_finite_gain_should_fail() {
    let result = SwerveConfig::new(
        valid_config_parts(),
        4.0,
        5.0,
        false,
        PidGains::new(f64::NAN, 0.0, 0.0, 0.0),
        PidGains::new(0.1, 0.0, 0.0, 0.0),
        CurrentLimits::new(20.0, 35.0),
        Duration::from_millis(20),
        PoseAxisConvention::Standard,
    );

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. }) if name == "steer_gains"
    ));
}

#[test]
fn when_creating_config_with_non_positive_current_limit_should_fail() {
    let result = SwerveConfig::new(
        valid_config_parts(),
        4.0,
        5.0,
        false,
        PidGains::new(0.05, 0.0, 0.0, 0.0),
        PidGains::new(0.1, 0.0, 0.0, 0.0),
        CurrentLimits::new(20.0, -1.0),
        Duration::from_millis(20),
        PoseAxisConvention::Standard,
    );

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. })
            if name == "current_limits.drive_limit_in_amps"
    ));
}

#[test]
fn when_creating_config_with_zero_control_period_should_fail() {
    let result = SwerveConfig::new(
        valid_config_parts(),
        4.0,
        5.0,
        false,
        PidGains::new(0.05, 0.0, 0.0, 0.0),
        PidGains::new(0.1, 0.0, 0.0, 0.0),
        CurrentLimits::new(20.0, 35.0),
        Duration::ZERO,
        PoseAxisConvention::Standard,
    );

    assert!(matches!(
        result,
        Err(Error::InvalidConfigurationValue { name, .. }) if name == "control_period"
    ));
}
