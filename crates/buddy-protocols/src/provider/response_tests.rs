use super::*;
use serde_json::json;

fn response(content: Vec<ContentPart>) -> CompletionResponse {
    CompletionResponse {
        id: "msg_1".to_string(),
        model: "claude-3-5-sonnet-20241022".to_string(),
        content,
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
    }
}

#[test]
fn test_first_text_picks_first_text_block() {
    let resp = response(vec![
        ContentPart::Text { text: "first".to_string() },
        ContentPart::Text { text: "second".to_string() },
    ]);
    assert_eq!(resp.first_text(), Some("first"));
    assert!(resp.tool_calls().is_empty());
}

#[test]
fn test_first_text_none_when_only_tools() {
    let resp = response(vec![ContentPart::ToolUse {
        id: "t1".to_string(),
        name: "scroll_down".to_string(),
        input: json!({}),
    }]);
    assert!(resp.first_text().is_none());
    assert_eq!(resp.tool_calls().len(), 1);
}

#[test]
fn test_to_message_echoes_all_blocks() {
    let resp = response(vec![
        ContentPart::Text { text: "Clicking".to_string() },
        ContentPart::ToolUse {
            id: "t1".to_string(),
            name: "click".to_string(),
            input: json!({"element_text": "Next"}),
        },
    ]);
    let msg = resp.to_message();
    assert_eq!(msg.role, MessageRole::Assistant);
    assert_eq!(msg.content.parts().len(), 2);
    assert_eq!(msg.tool_calls()[0].name, "click");
}
