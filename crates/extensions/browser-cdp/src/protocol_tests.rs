use super::*;
use serde_json::json;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Runtime.evaluate".to_string(),
        params: Some(json!({"expression": "document.title"})),
        session_id: Some("S1".to_string()),
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["method"], "Runtime.evaluate");
    assert_eq!(value["sessionId"], "S1");
}

#[test]
fn test_request_without_session_omits_field() {
    let req = CdpRequest {
        id: 2,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("sessionId"));
    assert!(!json.contains("params"));
}

#[test]
fn test_cdp_error_response_deserialize() {
    let json = r#"{"id": 7, "error": {"code": -32601, "message": "'Foo.bar' wasn't found"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(7));
    let error = resp.error.unwrap();
    assert_eq!(error.code, -32601);
}

#[test]
fn test_event_has_no_id() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(resp.id.is_none());
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Test",
        "url": "https://example.com",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert!(info.is_page());
}

#[test]
fn test_service_worker_is_not_a_page() {
    let info: PageInfo = serde_json::from_value(json!({
        "id": "sw1",
        "type": "service_worker",
        "title": "",
        "url": "chrome-extension://abc/background.js"
    }))
    .unwrap();
    assert!(!info.is_page());
}

#[test]
fn test_navigation_history_steps() {
    let history: NavigationHistory = serde_json::from_value(json!({
        "currentIndex": 1,
        "entries": [
            {"id": 10, "url": "https://a.example", "title": "A"},
            {"id": 11, "url": "https://b.example", "title": "B"},
            {"id": 12, "url": "https://c.example", "title": "C"}
        ]
    }))
    .unwrap();
    assert_eq!(history.previous().map(|e| e.id), Some(10));
    assert_eq!(history.next().map(|e| e.id), Some(12));
}

#[test]
fn test_navigation_history_edges() {
    let history: NavigationHistory = serde_json::from_value(json!({
        "currentIndex": 0,
        "entries": [{"id": 1, "url": "https://only.example"}]
    }))
    .unwrap();
    assert!(history.previous().is_none());
    assert!(history.next().is_none());
}

#[test]
fn test_stepping_past_history_edges_fails() {
    let history: NavigationHistory = serde_json::from_value(json!({
        "currentIndex": 0,
        "entries": [
            {"id": 1, "url": "https://a.example"},
            {"id": 2, "url": "https://b.example"}
        ]
    }))
    .unwrap();

    let err = history.back_target().unwrap_err();
    assert!(matches!(err, CdpError::NavigationFailed(ref m) if m == "no previous page in history"));
    assert_eq!(history.forward_target().unwrap().id, 2);

    let at_end = NavigationHistory {
        current_index: 1,
        entries: history.entries.clone(),
    };
    assert_eq!(at_end.back_target().unwrap().id, 1);
    assert!(matches!(
        at_end.forward_target(),
        Err(CdpError::NavigationFailed(ref m)) if m == "no next page in history"
    ));
}

#[test]
fn test_screenshot_format_serialize() {
    let json = serde_json::to_string(&ScreenshotFormat::Png).unwrap();
    assert_eq!(json, "\"png\"");
}
