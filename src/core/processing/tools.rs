//! Tool-call tallying across provider output shapes

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::providers::shared::{array_at, str_at, value_at};

pub const FUNCTION_CALL: &str = "function_call";
pub const CUSTOM_TOOL_CALL: &str = "custom_tool_call";
pub const TOOL_USE: &str = "tool_use";
pub const WEB_SEARCH_CALL: &str = "web_search_call";
pub const WEB_FETCH_CALL: &str = "web_fetch_call";
pub const FILE_SEARCH_CALL: &str = "file_search_call";
pub const CODE_INTERPRETER_CALL: &str = "code_interpreter_call";
pub const COMPUTER_CALL: &str = "computer_call";
pub const MCP_TOOL_CALL: &str = "mcp_tool_call";
pub const IMAGE_GENERATION_CALL: &str = "image_generation_call";
pub const LOCAL_SHELL_CALL: &str = "local_shell_call";
pub const MCP_APPROVAL_REQUEST: &str = "mcp_approval_request";
pub const SERVER_TOOL_USE: &str = "server_tool_use";

/// Finish reasons that imply the model called a tool
const TOOL_FINISH_REASONS: &[&str] = &["tool_calls", "tool_use"];

/// Responses API output item
pub fn responses_item_kind(item: &Value) -> Option<&'static str> {
    let kind = match str_at(item, "type")? {
        "function_call" => FUNCTION_CALL,
        "custom_tool_call" => CUSTOM_TOOL_CALL,
        "web_search_call" => WEB_SEARCH_CALL,
        "file_search_call" => FILE_SEARCH_CALL,
        "code_interpreter_call" => CODE_INTERPRETER_CALL,
        "computer_call" => COMPUTER_CALL,
        "mcp_call" | "mcp_tool_call" => MCP_TOOL_CALL,
        "image_generation_call" => IMAGE_GENERATION_CALL,
        "local_shell_call" => LOCAL_SHELL_CALL,
        "mcp_approval_request" => MCP_APPROVAL_REQUEST,
        _ => return None,
    };
    Some(kind)
}

/// Chat Completions `message.tool_calls` entry
pub fn chat_tool_call_kind(call: &Value) -> &'static str {
    match str_at(call, "type") {
        Some("custom") => CUSTOM_TOOL_CALL,
        _ => FUNCTION_CALL,
    }
}

/// Anthropic content block; server tools are keyed by what they do
pub fn anthropic_block_kind(block: &Value) -> Option<&'static str> {
    let kind = match str_at(block, "type")? {
        "tool_use" => TOOL_USE,
        "mcp_tool_use" => MCP_TOOL_CALL,
        "server_tool_use" => match str_at(block, "name") {
            Some("web_search") => WEB_SEARCH_CALL,
            Some("web_fetch") => WEB_FETCH_CALL,
            Some("code_execution" | "bash_code_execution" | "text_editor_code_execution") => {
                CODE_INTERPRETER_CALL
            }
            _ => SERVER_TOOL_USE,
        },
        _ => return None,
    };
    Some(kind)
}

/// Gemini content part
pub fn gemini_part_kind(part: &Value) -> Option<&'static str> {
    if part.get("functionCall").is_some() || part.get("function_call").is_some() {
        Some(FUNCTION_CALL)
    } else if part.get("executableCode").is_some() {
        Some(CODE_INTERPRETER_CALL)
    } else {
        None
    }
}

/// Count tool invocations by kind in a non-streaming response body
pub fn tally_tool_calls(body: &Value) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut bump = |kind: &str| *counts.entry(kind.to_string()).or_insert(0) += 1;

    for item in array_at(body, "output") {
        if let Some(kind) = responses_item_kind(item) {
            bump(kind);
        }
    }

    for choice in array_at(body, "choices") {
        for call in array_at(choice, "message.tool_calls") {
            bump(chat_tool_call_kind(call));
        }
        if value_at(choice, "message.function_call").is_some_and(Value::is_object) {
            bump(FUNCTION_CALL);
        }
    }

    for block in array_at(body, "content") {
        if let Some(kind) = anthropic_block_kind(block) {
            bump(kind);
        }
    }

    for candidate in array_at(body, "candidates") {
        for part in array_at(candidate, "content.parts") {
            if let Some(kind) = gemini_part_kind(part) {
                bump(kind);
            }
        }
    }

    counts
}

pub fn finish_reason_implies_tools(reason: &str) -> bool {
    TOOL_FINISH_REASONS.contains(&reason)
}
