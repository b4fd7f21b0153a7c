//! Reasoning detection
//!
//! A call counts as reasoning when tokens were reported, an effort or budget
//! was set, or the output carries thinking content.

use serde_json::Value;

use crate::core::providers::shared::{array_at, str_at, value_at};

/// Request-declared reasoning effort or budget, in provider shapes
pub fn effort_from_request(request: &Value) -> Option<String> {
    if let Some(effort) = str_at(request, "reasoning_effort").or_else(|| str_at(request, "reasoning.effort")) {
        return Some(effort.to_string());
    }

    // Anthropic extended thinking
    match str_at(request, "thinking.type") {
        Some("enabled") => {
            return Some(
                value_at(request, "thinking.budget_tokens")
                    .and_then(Value::as_u64)
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "enabled".to_string()),
            );
        }
        Some("disabled") => return Some("none".to_string()),
        _ => {}
    }

    // Gemini thinking config, under the REST or SDK key
    let thinking = value_at(request, "generationConfig.thinkingConfig")
        .or_else(|| value_at(request, "config.thinkingConfig"))?;
    if let Some(level) = str_at(thinking, "thinkingLevel") {
        return Some(level.to_string());
    }
    match value_at(thinking, "thinkingBudget").and_then(Value::as_i64)? {
        0 => Some("none".to_string()),
        -1 => Some("dynamic".to_string()),
        budget => Some(budget.to_string()),
    }
}

/// Effort echoed back by the provider
pub fn effort_from_response(body: &Value) -> Option<String> {
    str_at(body, "reasoning.effort").map(str::to_string)
}

/// Whether a declared effort actually turns reasoning on
pub fn effort_enables_reasoning(effort: &str) -> bool {
    !matches!(
        effort.trim().to_lowercase().as_str(),
        "" | "none" | "0" | "disabled" | "off"
    )
}

/// Thinking or reasoning content in a response body
pub fn has_reasoning_content(body: &Value) -> bool {
    let responses = array_at(body, "output")
        .iter()
        .any(|item| str_at(item, "type") == Some("reasoning"));

    let anthropic = array_at(body, "content").iter().any(|block| {
        matches!(str_at(block, "type"), Some("thinking" | "redacted_thinking"))
    });

    let gemini = array_at(body, "candidates").iter().any(|c| {
        array_at(c, "content.parts")
            .iter()
            .any(|p| p.get("thought").and_then(Value::as_bool) == Some(true))
    });

    let chat = array_at(body, "choices").iter().any(|c| {
        ["message.reasoning_content", "message.reasoning"]
            .iter()
            .any(|path| str_at(c, path).is_some_and(|s| !s.is_empty()))
    });

    responses || anthropic || gemini || chat
}
