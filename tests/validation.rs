mod common;

use common::*;
use rulegraph::prelude::*;
use rulegraph::validation::{EXPRESSION_INVALID, EXPRESSION_REQUIRED, VALIDATION_UNAVAILABLE};
use serde_json::{Map, Value, json};
use std::time::Duration;

fn sample() -> Value {
    json!({ "msg": { "temperature": 21 } })
}

#[tokio::test(start_paused = true)]
async fn test_empty_expression_fails_without_remote_call() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker.clone(), Some(ExpectedKind::Boolean));

    assert_eq!(validator.state(), ValidationState::idle());
    assert!(validator.on_change("   ", sample()).is_none());
    assert_eq!(validator.state(), ValidationState::error(EXPRESSION_REQUIRED));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(checker.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_valid_expression() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker.clone(), Some(ExpectedKind::Boolean));

    let handle = validator.on_change(".msg.temperature > 20", sample()).unwrap();
    assert_eq!(validator.state().status, ValidationStatus::Validating);
    handle.await.unwrap();

    assert_eq!(validator.state(), ValidationState::valid());
    let request = checker.last_request().unwrap();
    assert_eq!(request.expected, Some(ExpectedKind::Boolean));
    assert_eq!(request.sample, sample());
}

#[tokio::test(start_paused = true)]
async fn test_expected_kind_follows_node_type() {
    let registry = NodeRegistry::default();
    let checker = ScriptedChecker::new();

    let split = ExpressionValidator::for_node(checker.clone(), registry.get("Transform.SplitArrayMsgNode"));
    assert_eq!(split.expected(), Some(ExpectedKind::Array));
    split.on_change(".msg.readings", sample()).unwrap().await.unwrap();
    assert_eq!(checker.last_request().unwrap().expected, Some(ExpectedKind::Array));

    let switch = ExpressionValidator::for_node(checker.clone(), registry.get("Filter.ScriptSwitchNode"));
    assert_eq!(switch.expected(), None);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_are_coalesced() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker.clone(), None);

    let mut handles = Vec::new();
    for expression in [".m", ".ms", ".msg"] {
        handles.extend(validator.on_change(expression, sample()));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(checker.call_count(), 1);
    assert_eq!(checker.last_request().unwrap().expression, ".msg");
    assert_eq!(validator.state(), ValidationState::valid());
}

#[tokio::test(start_paused = true)]
async fn test_edits_outside_debounce_window_each_validate() {
    let checker = ScriptedChecker::new();
    let validator =
        ExpressionValidator::new(checker.clone(), None).with_debounce(Duration::from_millis(50));

    validator.on_change(".a", sample()).unwrap().await.unwrap();
    validator.on_change(".b", sample()).unwrap().await.unwrap();
    assert_eq!(checker.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_completion_does_not_overwrite() {
    let checker = ScriptedChecker::with_delays(vec![("slow", Duration::from_secs(2))]);
    let validator = ExpressionValidator::new(checker.clone(), None);

    let slow = validator.on_change("slow", sample()).unwrap();
    // Let the first run reach the checker before editing again.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(checker.call_count(), 1);

    let fast = validator.on_change("bad expr", sample()).unwrap();
    fast.await.unwrap();
    assert_eq!(
        validator.state(),
        ValidationState::error("syntax error in 'bad expr'")
    );

    slow.await.unwrap();
    assert_eq!(checker.call_count(), 2);
    assert_eq!(
        validator.state(),
        ValidationState::error("syntax error in 'bad expr'")
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejection_without_message_uses_generic_error() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker, None);

    validator.on_change("reject", sample()).unwrap().await.unwrap();
    assert_eq!(validator.state(), ValidationState::error(EXPRESSION_INVALID));
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_reports_generic_message() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker.clone(), None);

    validator.on_change("boom", sample()).unwrap().await.unwrap();
    let state = validator.state();
    assert_eq!(state.status, ValidationStatus::Error);
    assert_eq!(state.error.as_deref(), Some(VALIDATION_UNAVAILABLE));
    assert_eq!(checker.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_run() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker.clone(), None);

    let pending = validator.on_change(".msg", sample()).unwrap();
    validator.teardown();
    pending.await.unwrap();

    assert_eq!(checker.call_count(), 0);
    assert_eq!(validator.state().status, ValidationStatus::Validating);
    assert!(validator.on_change(".msg.t", sample()).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_validator_suppresses_in_flight_result() {
    let checker = ScriptedChecker::with_delays(vec![("slow", Duration::from_secs(1))]);
    let validator = ExpressionValidator::new(checker.clone(), None);
    let mut updates = validator.subscribe();

    let pending = validator.on_change("slow", sample()).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(checker.call_count(), 1);
    assert_eq!(updates.borrow_and_update().status, ValidationStatus::Validating);

    drop(validator);
    pending.await.unwrap();
    assert!(!updates.has_changed().unwrap_or(false));
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_observe_transitions() {
    let checker = ScriptedChecker::new();
    let validator = ExpressionValidator::new(checker, None);
    let mut updates = validator.subscribe();

    let handle = validator.on_change(".msg", sample()).unwrap();
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().status, ValidationStatus::Validating);

    handle.await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow(), ValidationState::valid());
}

#[test]
fn test_sample_message_context_shape() {
    let mut headers = Map::new();
    headers.insert("deviceName".into(), json!("meter-0007"));
    headers.insert("device_type".into(), json!("meter"));
    headers.insert("ts".into(), json!("1700000000000"));
    let sample = SampleMessage::new(json!({ "temperature": 21.5 }), headers, "POST_TELEMETRY_REQUEST");

    let context = sample.context();
    assert_eq!(context["msg"], json!({ "temperature": 21.5 }));
    assert_eq!(context["payload"], context["msg"]);
    assert_eq!(context["metadata"], context["meta"]);
    assert_eq!(context["headers"]["ts"], json!("1700000000000"));
    assert_eq!(context["msgType"], json!("POST_TELEMETRY_REQUEST"));
    assert_eq!(context["message_type"], json!("POST_TELEMETRY_REQUEST"));
    assert_eq!(context["metadata"]["msgType"], json!("POST_TELEMETRY_REQUEST"));
    assert_eq!(context["metadata"]["headers"], context["headers"]);
    assert_eq!(
        context["metadata"]["device"],
        json!({ "name": "meter-0007", "type": "meter" })
    );
}

#[test]
fn test_sample_message_from_text_degrades() {
    let sample = SampleMessage::from_text("{ broken", "[1, 2]", "ALARM");
    assert_eq!(sample.body, json!({}));
    assert!(sample.headers.is_empty());
    assert_eq!(sample.message_type, "ALARM");

    let parsed: SampleMessage = serde_json::from_value(json!({
        "body": { "a": 1 },
        "headers": { "deviceId": "d-1" },
        "msgType": "CONNECT_EVENT"
    }))
    .unwrap();
    assert_eq!(parsed.message_type, "CONNECT_EVENT");
    assert_eq!(parsed.context()["metadata"]["device"], json!({ "id": "d-1" }));
}

#[test]
fn test_validator_driven_from_sync_code() {
    let checker = ScriptedChecker::new();
    let state = tokio_test::block_on(async {
        let validator =
            ExpressionValidator::new(checker.clone(), None).with_debounce(Duration::from_millis(1));
        let handle = validator.on_change("bad input", sample()).unwrap();
        tokio_test::assert_ok!(handle.await);
        validator.state()
    });

    assert_eq!(state, ValidationState::error("syntax error in 'bad input'"));
    assert_eq!(checker.call_count(), 1);
}
