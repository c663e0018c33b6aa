mod common;

use hindsight_capture::CaptureStatus;
use serde_json::json;

#[test]
fn test_flaky_connection_exhausts_after_three_retries() {
    let mut controller = common::controller();
    assert!(controller.start());

    // Four transient drops, zero good observations between them
    for attempt in 1..=3 {
        controller.handle_error("NotFoundError: Requested device not found");
        assert_eq!(controller.status(), CaptureStatus::Reconnecting);
        assert_eq!(controller.retry_count(), attempt);

        let retry = controller.take_pending_retry().expect("retry scheduled");
        assert_eq!(retry.delay_ms, 1000);
        assert!(controller.fire_retry(retry.generation));
        assert_eq!(controller.status(), CaptureStatus::Recording);
    }

    controller.handle_error("NotFoundError: Requested device not found");
    assert_eq!(controller.status(), CaptureStatus::ConnectionLost);
    assert_eq!(controller.retry_count(), 3);
    assert!(controller.status_message().is_some());
    assert!(controller.take_pending_retry().is_none());
}

#[test]
fn test_good_observation_resets_the_retry_budget() {
    let mut controller = common::controller();
    controller.start();

    controller.handle_error("stream not found");
    let retry = controller.take_pending_retry().unwrap();
    controller.fire_retry(retry.generation);
    assert_eq!(controller.retry_count(), 1);

    // A successful observation, not a successful reconnect, resets the count
    controller.handle_observation(json!("back on screen"));
    assert_eq!(controller.retry_count(), 0);
}

#[test]
fn test_start_is_idempotent_while_recording() {
    let mut controller = common::controller();
    assert!(controller.start());
    assert!(controller.start());
    assert_eq!(controller.status(), CaptureStatus::Recording);
}

#[test]
fn test_stop_never_started_is_safe() {
    let mut controller = common::controller();
    let observations = controller.stop();
    assert!(observations.is_empty());
    assert_eq!(controller.status(), CaptureStatus::Ready);
}

#[test]
fn test_late_retry_after_stop_is_a_noop() {
    let mut controller = common::controller();
    controller.start();
    controller.handle_observation(json!("working"));
    controller.handle_error("NotFoundError");
    let pending = controller.take_pending_retry().unwrap();

    // User stops while the 1s timer is still in flight
    let observations = controller.stop();
    assert_eq!(observations.len(), 1);
    assert_eq!(controller.status(), CaptureStatus::Ready);

    assert!(!controller.fire_retry(pending.generation));
    assert_eq!(controller.status(), CaptureStatus::Ready);
}

#[test]
fn test_non_transient_error_skips_the_retry_path() {
    let mut controller = common::controller();
    controller.start();
    controller.handle_error("permission revoked by user");
    assert_eq!(controller.status(), CaptureStatus::ConnectionLost);
    assert_eq!(controller.retry_count(), 0);
    assert!(controller.take_pending_retry().is_none());
}
