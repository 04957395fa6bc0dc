use super::*;
use buddy_protocols::tool::BrowserTool;
use buddy_protocols::types::ToolCall;
use serde_json::json;

#[test]
fn test_convert_plain_messages() {
    let messages = vec![Message::user("Hello"), Message::assistant("Hi there!")];
    let converted = convert_messages(&messages);

    assert_eq!(converted.len(), 2);
    assert_eq!(converted[0].role, "user");
    assert_eq!(converted[1].role, "assistant");
    assert!(matches!(converted[0].content, ApiContent::Text(ref t) if t == "Hello"));
}

#[test]
fn test_convert_assistant_echo_keeps_order() {
    let echo = Message::with_parts(
        MessageRole::Assistant,
        vec![
            ContentPart::Text {
                text: "Let me scroll".to_string(),
            },
            ToolCall::new("t1", "scroll_down", json!({})).to_part(),
        ],
    );

    let converted = convert_messages(&[echo]);
    let json = serde_json::to_value(&converted[0]).unwrap();
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["content"][0]["type"], "text");
    assert_eq!(json["content"][1]["type"], "tool_use");
    assert_eq!(json["content"][1]["id"], "t1");
}

#[test]
fn test_convert_tool_results() {
    let results = Message::with_parts(
        MessageRole::User,
        vec![
            ContentPart::tool_result("t1", "Scrolled down"),
            ContentPart::tool_result("t2", "Permission denied for tool: click"),
        ],
    );

    let converted = convert_messages(&[results]);
    let json = serde_json::to_value(&converted[0]).unwrap();
    assert_eq!(json["role"], "user");
    assert_eq!(
        json["content"],
        json!([
            {"type": "tool_result", "tool_use_id": "t1", "content": "Scrolled down"},
            {"type": "tool_result", "tool_use_id": "t2", "content": "Permission denied for tool: click"}
        ])
    );
}

#[test]
fn test_convert_tools() {
    let request = CompletionRequest::new("m", vec![Message::user("Hi")])
        .with_tools(BrowserTool::all_definitions());

    let tools = convert_tools(&request);
    assert_eq!(tools.len(), 10);
    assert_eq!(tools[4].name, "type_text");
    assert_eq!(tools[4].input_schema["required"][0], "input_text");
}

#[test]
fn test_convert_no_tools() {
    let request = CompletionRequest::new("m", vec![Message::user("Hi")]);
    assert!(convert_tools(&request).is_empty());
}
