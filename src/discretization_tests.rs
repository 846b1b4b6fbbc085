use super::*;

use std::f64::consts::PI;

use float_cmp::{ApproxEq, F64Margin};

use crate::geometry::Twist2d;

const MARGIN: F64Margin = F64Margin {
    epsilon: 1e-9,
    ulps: 2,
};

const PERIOD: Duration = Duration::from_millis(20);

#[test]
fn when_correcting_straight_line_motion_should_be_a_no_op() {
    let speeds = ChassisSpeeds::new(1.5, -0.75, 0.0);

    let corrected = correct_for_discretization(&speeds, PERIOD);

    assert!(corrected
        .vx_in_meters_per_second()
        .approx_eq(1.5, MARGIN));
    assert!(corrected
        .vy_in_meters_per_second()
        .approx_eq(-0.75, MARGIN));
    assert_eq!(corrected.omega_in_radians_per_second(), 0.0);
}

#[test]
fn when_correcting_pure_rotation_should_keep_the_rotation_rate() {
    let speeds = ChassisSpeeds::new(0.0, 0.0, 2.0 * PI);

    let corrected = correct_for_discretization(&speeds, PERIOD);

    assert!(corrected.vx_in_meters_per_second().approx_eq(0.0, MARGIN));
    assert!(corrected.vy_in_meters_per_second().approx_eq(0.0, MARGIN));
    assert!(corrected
        .omega_in_radians_per_second()
        .approx_eq(2.0 * PI, MARGIN));
}

#[test]
fn when_correcting_curved_motion_should_adjust_the_translation() {
    // Driving forward while rotating. The corrected command steers slightly
    // into the arc so the chord traced over one period lands on the arc.
    let speeds = ChassisSpeeds::new(2.0, 0.0, 4.0);

    let corrected = correct_for_discretization(&speeds, PERIOD);

    assert!(corrected.vx_in_meters_per_second() != 2.0);
    assert!(corrected.vy_in_meters_per_second() != 0.0);
    assert!(corrected
        .omega_in_radians_per_second()
        .approx_eq(4.0, MARGIN));
}

#[test]
fn when_integrating_the_corrected_command_should_land_on_the_intended_pose() {
    // A constant body-frame velocity, followed continuously, sweeps the arc
    // described by the exponential of its twist. The corrected command is
    // chosen so that this arc ends exactly at the pose the original command
    // naively describes, eliminating the per-cycle skid.
    let speeds = ChassisSpeeds::new(2.0, 0.5, 4.0);
    let period_in_seconds = PERIOD.as_secs_f64();

    let corrected = correct_for_discretization(&speeds, PERIOD);

    let intended = Pose2d::new(
        speeds.vx_in_meters_per_second() * period_in_seconds,
        speeds.vy_in_meters_per_second() * period_in_seconds,
        speeds.omega_in_radians_per_second() * period_in_seconds,
    );

    let actual = Pose2d::identity().exp(&Twist2d::new(
        corrected.vx_in_meters_per_second() * period_in_seconds,
        corrected.vy_in_meters_per_second() * period_in_seconds,
        corrected.omega_in_radians_per_second() * period_in_seconds,
    ));

    assert!(actual
        .x_in_meters()
        .approx_eq(intended.x_in_meters(), MARGIN));
    assert!(actual
        .y_in_meters()
        .approx_eq(intended.y_in_meters(), MARGIN));
    assert!(actual
        .heading_in_radians()
        .approx_eq(intended.heading_in_radians(), MARGIN));
}
