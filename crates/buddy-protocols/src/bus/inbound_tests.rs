use super::*;
use serde_json::json;

fn envelope(message_type: &str, data: Value) -> BusEnvelope {
    BusEnvelope::new(message_type, data)
}

#[test]
fn test_parse_execute_task() {
    let request = BusRequest::parse(&envelope(
        "EXECUTE_TASK",
        json!({"taskId": "summarize-page", "content": "Body text", "conversationId": "c1"}),
    ))
    .unwrap();

    match request {
        BusRequest::ExecuteTask(data) => {
            assert_eq!(data.task_id, "summarize-page");
            assert_eq!(data.content, "Body text");
            assert_eq!(data.conversation_id.as_deref(), Some("c1"));
            assert!(data.request_id.is_none());
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn test_parse_send_message_flags() {
    let request = BusRequest::parse(&envelope(
        "SEND_MESSAGE",
        json!({"message": "What is this?", "showDebugMessages": true}),
    ))
    .unwrap();

    let BusRequest::SendMessage(data) = request else {
        panic!("expected SEND_MESSAGE");
    };
    assert_eq!(data.show_debug_messages, Some(true));
    assert!(data.conversation_id.is_none());
}

#[test]
fn test_unknown_type_rejected() {
    let err = BusRequest::parse(&envelope("SELF_DESTRUCT", Value::Null)).unwrap_err();
    assert_eq!(err.to_string(), "Unknown message type: SELF_DESTRUCT");
}

#[test]
fn test_missing_field_is_invalid_payload() {
    let err = BusRequest::parse(&envelope("UPDATE_API_KEY", json!({}))).unwrap_err();
    assert!(matches!(err, BusError::InvalidPayload { ref message_type, .. } if message_type == "UPDATE_API_KEY"));
}

#[test]
fn test_update_settings_requires_object() {
    assert!(BusRequest::parse(&envelope("UPDATE_SETTINGS", json!(3))).is_err());
    let request =
        BusRequest::parse(&envelope("UPDATE_SETTINGS", json!({"sidebarWidth": 450}))).unwrap();
    assert_eq!(request.message_type(), "UPDATE_SETTINGS");
}

#[test]
fn test_save_task_payload() {
    let request = BusRequest::parse(&envelope(
        "SAVE_TASK",
        json!({"task": {"id": "t1", "name": "Translate", "inputType": "page", "prompt": "Translate"}}),
    ))
    .unwrap();
    let BusRequest::SaveTask(task) = request else {
        panic!("expected SAVE_TASK");
    };
    assert_eq!(task.id, "t1");
}

#[test]
fn test_payloadless_requests() {
    for name in [
        "GET_API_KEY",
        "CLEAR_API_KEY",
        "GET_CONVERSATIONS",
        "GET_TASKS",
        "GET_SETTINGS",
        "GET_AVAILABLE_MODELS",
        "OPEN_MANAGEMENT",
        "CAPTURE_VISIBLE_TAB",
    ] {
        let request = BusRequest::parse(&envelope(name, Value::Null)).unwrap();
        assert_eq!(request.message_type(), name);
    }
}
