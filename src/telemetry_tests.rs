use super::*;

#[test]
fn when_publishing_with_space_should_deliver_the_record() {
    let (publisher, receiver) = TelemetryPublisher::new(4);

    let record = TelemetryRecord::new(45.0, Pose2d::new(1.0, 2.0, 0.5), Vec::new(), false);
    assert!(publisher.publish(record.clone()));

    let received = receiver.recv().unwrap();
    assert_eq!(received, record);
}

#[test]
fn when_channel_is_full_should_drop_the_record_without_blocking() {
    let (publisher, _receiver) = TelemetryPublisher::new(1);

    let record = TelemetryRecord::new(0.0, Pose2d::identity(), Vec::new(), false);
    assert!(publisher.publish(record.clone()));
    assert!(!publisher.publish(record));
}

#[test]
fn when_receiver_is_gone_should_drop_the_record_without_blocking() {
    let (publisher, receiver) = TelemetryPublisher::new(4);
    drop(receiver);

    let record = TelemetryRecord::new(0.0, Pose2d::identity(), Vec::new(), false);
    assert!(!publisher.publish(record));
}

#[test]
fn when_creating_module_telemetry_should_be_initialized() {
    let telemetry = ModuleTelemetry::new(2, 0.5, 0.25, 1.5, true);

    assert_eq!(telemetry.index(), 2);
    assert_eq!(telemetry.angle_in_radians(), 0.5);
    assert_eq!(telemetry.absolute_angle_in_radians(), 0.25);
    assert_eq!(telemetry.speed_in_meters_per_second(), 1.5);
    assert!(telemetry.faulted());
}
