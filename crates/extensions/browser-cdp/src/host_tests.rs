use super::*;
use parking_lot::Mutex;
use serde_json::json;

use crate::protocol::{NavigationEntry, NavigationHistory};

struct MockPage {
    evaluations: Mutex<Vec<String>>,
    script_result: Mutex<Result<Value, String>>,
    navigations: Mutex<Vec<String>>,
    history: NavigationHistory,
}

fn history_at(current_index: usize) -> NavigationHistory {
    NavigationHistory {
        current_index,
        entries: (1..=3)
            .map(|id| NavigationEntry {
                id,
                url: format!("https://example.com/{id}"),
                title: String::new(),
            })
            .collect(),
    }
}

impl MockPage {
    fn returning(value: Value) -> Self {
        Self {
            evaluations: Mutex::new(Vec::new()),
            script_result: Mutex::new(Ok(value)),
            navigations: Mutex::new(Vec::new()),
            history: history_at(1),
        }
    }

    fn at_history_start() -> Self {
        Self {
            history: history_at(0),
            ..Self::returning(Value::Null)
        }
    }

    fn throwing(message: &str) -> Self {
        let page = Self::returning(Value::Null);
        *page.script_result.lock() = Err(message.to_string());
        page
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        self.evaluations.lock().push(expression.to_string());
        self.script_result
            .lock()
            .clone()
            .map_err(CdpError::JavaScript)
    }

    async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        if url.starts_with("blocked:") {
            return Err(CdpError::NavigationFailed("net::ERR_BLOCKED_BY_CLIENT".to_string()));
        }
        self.navigations.lock().push(url.to_string());
        Ok(())
    }

    async fn go_back(&self) -> Result<(), CdpError> {
        self.history.back_target()?;
        self.navigations.lock().push("back".to_string());
        Ok(())
    }

    async fn go_forward(&self) -> Result<(), CdpError> {
        self.history.forward_target()?;
        self.navigations.lock().push("forward".to_string());
        Ok(())
    }

    async fn url(&self) -> Result<String, CdpError> {
        Ok("https://example.com/article".to_string())
    }

    async fn title(&self) -> Result<String, CdpError> {
        Ok("An Article".to_string())
    }

    async fn screenshot_png(&self) -> Result<String, CdpError> {
        Ok("iVBORw0KGgo=".to_string())
    }
}

struct FixedPrompter {
    choice: PermissionChoice,
    asked: Mutex<Vec<(String, String)>>,
}

impl FixedPrompter {
    fn new(choice: PermissionChoice) -> Self {
        Self {
            choice,
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PermissionPrompter for FixedPrompter {
    async fn prompt(&self, tool_name: &str, request_id: &str) -> PermissionChoice {
        self.asked
            .lock()
            .push((tool_name.to_string(), request_id.to_string()));
        self.choice
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl TabOpener for RecordingOpener {
    async fn open(&self, url: &str) -> Result<(), CdpError> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}

fn host(page: MockPage) -> (Arc<MockPage>, Arc<FixedPrompter>, CdpHost) {
    let page = Arc::new(page);
    let prompter = Arc::new(FixedPrompter::new(PermissionChoice::AllowOnce));
    let host = CdpHost::new(page.clone(), prompter.clone());
    (page, prompter, host)
}

fn action(name: &str, params: Value) -> OutboundMessage {
    OutboundMessage::ExecuteBrowserAction {
        action: name.to_string(),
        params,
    }
}

#[tokio::test]
async fn test_permission_request_goes_to_prompter() {
    let (_page, prompter, host) = host(MockPage::returning(Value::Null));

    let reply = host
        .send_to_tab(
            ATTACHED_TAB,
            OutboundMessage::PermissionRequest {
                tool_name: "click".to_string(),
                request_id: "r1".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(reply, json!({"permission": "allow_once"}));
    assert_eq!(
        prompter.asked.lock().clone(),
        vec![("click".to_string(), "r1".to_string())]
    );
}

#[tokio::test]
async fn test_click_runs_script_with_params() {
    let (page, _prompter, host) = host(MockPage::returning(
        json!({"success": true, "result": {"navigating": true}}),
    ));

    let reply = host
        .send_to_tab(
            ATTACHED_TAB,
            action("click", json!({"elementText": "Buy", "elementId": null, "exact": true})),
        )
        .await
        .unwrap();

    let response: BrowserActionResponse = serde_json::from_value(reply).unwrap();
    assert!(response.success);
    assert_eq!(response.result, Some(json!({"navigating": true})));

    let evaluations = page.evaluations.lock().clone();
    assert_eq!(evaluations.len(), 1);
    assert!(evaluations[0].contains(r#""elementText":"Buy""#));
    assert!(evaluations[0].contains("Element not found"));
}

#[tokio::test]
async fn test_script_failure_is_passed_through() {
    let (_page, _prompter, host) = host(MockPage::returning(
        json!({"success": false, "error": "No input element is focused"}),
    ));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("type_text", json!({"text": "hi"})))
        .await
        .unwrap();

    assert_eq!(reply, json!({"success": false, "error": "No input element is focused"}));
}

#[tokio::test]
async fn test_script_exception_becomes_failed_response() {
    let (_page, _prompter, host) = host(MockPage::throwing("ReferenceError: x is not defined"));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("scroll_down", json!({})))
        .await
        .unwrap();

    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().contains("ReferenceError"));
}

#[tokio::test]
async fn test_malformed_script_result() {
    let (_page, _prompter, host) = host(MockPage::returning(json!(42)));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("read_page_content", json!({})))
        .await
        .unwrap();

    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().contains("read_page_content"));
}

#[tokio::test]
async fn test_page_snapshot_is_native_screenshot() {
    let (page, _prompter, host) = host(MockPage::returning(Value::Null));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("page_snapshot", json!({})))
        .await
        .unwrap();

    assert_eq!(
        reply,
        json!({"success": true, "result": "data:image/png;base64,iVBORw0KGgo="})
    );
    assert!(page.evaluations.lock().is_empty());
}

#[tokio::test]
async fn test_unknown_action() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("teleport", json!({})))
        .await
        .unwrap();

    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().contains("teleport"));
}

#[tokio::test]
async fn test_tab_route_action_is_rejected_by_page() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let reply = host
        .send_to_tab(ATTACHED_TAB, action("go_to_url", json!({})))
        .await
        .unwrap();

    assert_eq!(reply["success"], false);
}

#[tokio::test]
async fn test_other_tabs_have_no_receiver() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let err = host
        .send_to_tab(7, action("scroll_up", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, BusError::NoReceiver(7)));

    assert!(host.tab_info(7).await.is_err());
}

#[tokio::test]
async fn test_notifications_reach_subscribers() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));
    let mut events = host.subscribe();

    host.send_to_tab(
        ATTACHED_TAB,
        OutboundMessage::SiteBlacklisted {
            url: "https://bank.example".to_string(),
        },
    )
    .await
    .unwrap();
    host.broadcast(OutboundMessage::ToolCallUpdate {
        request_id: "r1".to_string(),
        tool_call: buddy_protocols::ToolCall::new("t1", "scroll_down", json!({})),
    })
    .await
    .unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.message_type, "SITE_BLACKLISTED");
    let second = events.recv().await.unwrap();
    assert_eq!(second.message_type, "TOOL_CALL_UPDATE");
    assert_eq!(second.data["toolCall"]["name"], "scroll_down");
}

#[tokio::test]
async fn test_broadcast_without_subscribers_is_ok() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let result = host
        .broadcast(OutboundMessage::SiteBlacklisted {
            url: "https://x.example".to_string(),
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_tab_info_and_navigation() {
    let (page, _prompter, host) = host(MockPage::returning(Value::Null));

    let info = host.tab_info(ATTACHED_TAB).await.unwrap();
    assert_eq!(info.url, "https://example.com/article");
    assert_eq!(info.title, "An Article");

    host.go_back(ATTACHED_TAB).await.unwrap();
    host.go_forward(ATTACHED_TAB).await.unwrap();
    host.navigate(ATTACHED_TAB, "https://rust-lang.org/").await.unwrap();
    assert_eq!(
        page.navigations.lock().clone(),
        vec!["back", "forward", "https://rust-lang.org/"]
    );
}

#[tokio::test]
async fn test_navigation_failure_maps_to_bus_error() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let err = host
        .navigate(ATTACHED_TAB, "blocked:site")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("ERR_BLOCKED_BY_CLIENT"));
}

#[tokio::test]
async fn test_go_back_without_history_fails() {
    let (page, _prompter, host) = host(MockPage::at_history_start());

    let err = host.go_back(ATTACHED_TAB).await.unwrap_err();

    assert!(matches!(err, BusError::DeliveryFailed(_)));
    assert!(err.to_string().contains("no previous page in history"));
    assert!(page.navigations.lock().is_empty());
    host.go_forward(ATTACHED_TAB).await.unwrap();
}

#[tokio::test]
async fn test_capture_visible_tab_is_data_url() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));

    let data_url = host.capture_visible_tab(ATTACHED_TAB).await.unwrap();

    assert_eq!(data_url, "data:image/png;base64,iVBORw0KGgo=");
}

#[tokio::test]
async fn test_open_tab_needs_opener() {
    let (_page, _prompter, host) = host(MockPage::returning(Value::Null));
    assert!(matches!(
        host.open_tab("https://example.com").await,
        Err(BusError::Unsupported(_))
    ));

    let opener = Arc::new(RecordingOpener::default());
    let host = host.with_opener(opener.clone());
    let first = host.open_tab("https://a.example").await.unwrap();
    let second = host.open_tab("https://b.example").await.unwrap();

    assert_eq!(first, ATTACHED_TAB + 1);
    assert_eq!(second, ATTACHED_TAB + 2);
    assert_eq!(opener.opened.lock().len(), 2);
}
