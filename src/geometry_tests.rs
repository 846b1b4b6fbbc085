use super::*;

use std::f64::consts::PI;

use float_cmp::{ApproxEq, F64Margin};

const MARGIN: F64Margin = F64Margin {
    epsilon: 1e-9,
    ulps: 2,
};

// wrap_angle tests

#[test]
fn when_wrapping_angles_should_stay_in_canonical_range() {
    assert_eq!(wrap_angle(0.0), 0.0);
    assert_eq!(wrap_angle(PI), PI);
    assert_eq!(wrap_angle(-PI), PI);
    assert!(wrap_angle(3.0 * PI).approx_eq(PI, MARGIN));
    assert!(wrap_angle(-0.5 * PI).approx_eq(-0.5 * PI, MARGIN));
    assert!(wrap_angle(2.5 * PI).approx_eq(0.5 * PI, MARGIN));
    assert!(wrap_angle(-2.5 * PI).approx_eq(-0.5 * PI, MARGIN));
}

// Pose2d tests

#[test]
fn when_creating_pose_should_wrap_heading() {
    let pose = Pose2d::new(1.0, 2.0, 3.0 * PI);

    assert_eq!(pose.x_in_meters(), 1.0);
    assert_eq!(pose.y_in_meters(), 2.0);
    assert!(pose.heading_in_radians().approx_eq(PI, MARGIN));
}

#[test]
fn when_applying_zero_twist_should_not_move_pose() {
    let pose = Pose2d::new(1.0, -2.0, 0.25 * PI);
    let moved = pose.exp(&Twist2d::new(0.0, 0.0, 0.0));

    assert_eq!(pose, moved);
}

#[test]
fn when_applying_straight_twist_should_translate_along_heading() {
    let pose = Pose2d::new(0.0, 0.0, 0.5 * PI);
    let moved = pose.exp(&Twist2d::new(2.0, 0.0, 0.0));

    assert!(moved.x_in_meters().approx_eq(0.0, MARGIN));
    assert!(moved.y_in_meters().approx_eq(2.0, MARGIN));
    assert!(moved.heading_in_radians().approx_eq(0.5 * PI, MARGIN));
}

#[test]
fn when_applying_arc_twist_should_follow_the_arc_not_the_chord() {
    // A quarter turn of a circle with radius 2 / (PI / 2): driving forward
    // while rotating by 90 degrees ends up at (r, r) in the field frame.
    let pose = Pose2d::identity();
    let arc_length = 2.0;
    let dtheta = 0.5 * PI;
    let radius = arc_length / dtheta;

    let moved = pose.exp(&Twist2d::new(arc_length, 0.0, dtheta));

    assert!(moved.x_in_meters().approx_eq(radius, MARGIN));
    assert!(moved.y_in_meters().approx_eq(radius, MARGIN));
    assert!(moved.heading_in_radians().approx_eq(dtheta, MARGIN));
}

#[test]
fn when_taking_log_of_exp_should_round_trip_the_twist() {
    let twist = Twist2d::new(0.7, -0.3, 0.4);
    let displacement = Pose2d::identity().exp(&twist);
    let recovered = displacement.log();

    assert!(recovered
        .dx_in_meters()
        .approx_eq(twist.dx_in_meters(), MARGIN));
    assert!(recovered
        .dy_in_meters()
        .approx_eq(twist.dy_in_meters(), MARGIN));
    assert!(recovered
        .dtheta_in_radians()
        .approx_eq(twist.dtheta_in_radians(), MARGIN));
}

#[test]
fn when_taking_log_of_pure_translation_should_return_the_translation() {
    let displacement = Pose2d::new(1.5, -0.25, 0.0);
    let twist = displacement.log();

    assert_eq!(twist.dx_in_meters(), 1.5);
    assert_eq!(twist.dy_in_meters(), -0.25);
    assert_eq!(twist.dtheta_in_radians(), 0.0);
}

#[test]
fn when_default_pose_should_be_identity() {
    assert_eq!(Pose2d::default(), Pose2d::identity());
}

// Twist2d tests

#[test]
fn when_replacing_twist_rotation_should_keep_translation() {
    let twist = Twist2d::new(0.2, 0.3, 0.4);
    let adjusted = twist.with_rotation(-0.1);

    assert_eq!(adjusted.dx_in_meters(), 0.2);
    assert_eq!(adjusted.dy_in_meters(), 0.3);
    assert_eq!(adjusted.dtheta_in_radians(), -0.1);
}

// ChassisSpeeds tests

#[test]
fn when_field_relative_with_zero_heading_should_match_body_speeds() {
    let speeds = ChassisSpeeds::from_field_relative(1.0, 2.0, 0.5, 0.0);

    assert!(speeds.vx_in_meters_per_second().approx_eq(1.0, MARGIN));
    assert!(speeds.vy_in_meters_per_second().approx_eq(2.0, MARGIN));
    assert_eq!(speeds.omega_in_radians_per_second(), 0.5);
}

#[test]
fn when_field_relative_with_quarter_turn_heading_should_rotate_into_body_frame() {
    // Facing +Y in the field frame, a field +X request becomes a body -Y
    // request.
    let speeds = ChassisSpeeds::from_field_relative(1.0, 0.0, 0.0, 0.5 * PI);

    assert!(speeds.vx_in_meters_per_second().approx_eq(0.0, MARGIN));
    assert!(speeds.vy_in_meters_per_second().approx_eq(-1.0, MARGIN));
}
