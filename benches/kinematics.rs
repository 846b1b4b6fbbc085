use std::f64::consts::PI;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector2;
use swerve_drive_control::config::ModuleGeometry;
use swerve_drive_control::discretization::correct_for_discretization;
use swerve_drive_control::geometry::{ChassisSpeeds, Pose2d, Twist2d};
use swerve_drive_control::kinematics::{SwerveKinematics, SwerveModulePosition, SwerveModuleState};
use swerve_drive_control::optimizer::optimize;

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets =
        kinematics_to_module_states,
        kinematics_to_chassis_speeds,
        kinematics_twist_from_module_deltas,
        optimizer_optimize,
        discretization_correct_for_discretization,
        geometry_pose_exp,
        geometry_pose_log,
}

criterion_main!(benches);

fn create_kinematics() -> SwerveKinematics {
    SwerveKinematics::new(&[
        ModuleGeometry::new(Vector2::new(0.3, 0.3), 0.0),
        ModuleGeometry::new(Vector2::new(0.3, -0.3), 0.0),
        ModuleGeometry::new(Vector2::new(-0.3, 0.3), 0.0),
        ModuleGeometry::new(Vector2::new(-0.3, -0.3), 0.0),
    ])
    .unwrap()
}

pub fn kinematics_to_module_states(c: &mut Criterion) {
    let mut kinematics = create_kinematics();
    let speeds = ChassisSpeeds::new(1.5, -0.5, 0.75);

    c.bench_function("SwerveKinematics::to_module_states", |b| {
        b.iter(|| kinematics.to_module_states(black_box(&speeds)))
    });
}

pub fn kinematics_to_chassis_speeds(c: &mut Criterion) {
    let kinematics = create_kinematics();
    let states = [
        SwerveModuleState::new(1.2, 0.3),
        SwerveModuleState::new(1.4, -0.2),
        SwerveModuleState::new(1.1, 0.4),
        SwerveModuleState::new(1.3, -0.1),
    ];

    c.bench_function("SwerveKinematics::to_chassis_speeds", |b| {
        b.iter(|| kinematics.to_chassis_speeds(black_box(&states)))
    });
}

pub fn kinematics_twist_from_module_deltas(c: &mut Criterion) {
    let kinematics = create_kinematics();
    let deltas = [
        SwerveModulePosition::new(0.03, 0.3),
        SwerveModulePosition::new(0.035, -0.2),
        SwerveModulePosition::new(0.028, 0.4),
        SwerveModulePosition::new(0.032, -0.1),
    ];

    c.bench_function("SwerveKinematics::twist_from_module_deltas", |b| {
        b.iter(|| kinematics.twist_from_module_deltas(black_box(&deltas)))
    });
}

pub fn optimizer_optimize(c: &mut Criterion) {
    let target = SwerveModuleState::new(2.0, 0.75 * PI);

    c.bench_function("optimizer::optimize", |b| {
        b.iter(|| optimize(black_box(&target), black_box(12.3)))
    });
}

pub fn discretization_correct_for_discretization(c: &mut Criterion) {
    let speeds = ChassisSpeeds::new(2.0, 0.5, 1.5);
    let period = Duration::from_millis(20);

    c.bench_function("discretization::correct_for_discretization", |b| {
        b.iter(|| correct_for_discretization(black_box(&speeds), black_box(period)))
    });
}

pub fn geometry_pose_exp(c: &mut Criterion) {
    let pose = Pose2d::new(1.0, 2.0, 0.5);
    let twist = Twist2d::new(0.04, 0.01, 0.03);

    c.bench_function("Pose2d::exp", |b| {
        b.iter(|| black_box(&pose).exp(black_box(&twist)))
    });
}

pub fn geometry_pose_log(c: &mut Criterion) {
    let pose = Pose2d::new(0.04, 0.01, 0.03);

    c.bench_function("Pose2d::log", |b| {
        b.iter(|| black_box(&pose).log())
    });
}
