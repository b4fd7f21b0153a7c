//! Response processor integration tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::common::fixtures::{AnthropicFixtures, GeminiFixtures, OpenAIFixtures};
    use llm_usage::core::processing::BASE64_MARKER;
    use llm_usage::{
        CostCalculator, HandlerRegistry, ModelType, PricingCatalog, Provider, RequestContext,
        ResponseBody, ResponseProcessor,
    };
    use serde_json::json;

    fn processor() -> ResponseProcessor {
        ResponseProcessor::new(
            Arc::new(HandlerRegistry::with_defaults().unwrap()),
            Arc::new(CostCalculator::new(Arc::new(PricingCatalog::builtin()))),
        )
    }

    // ==================== Tool Calls ====================

    #[test]
    fn test_responses_tool_tally() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/responses")
            .build();
        processor.process(&mut ctx, ResponseBody::Json(OpenAIFixtures::responses_with_tools()));

        assert_eq!(ctx.tool_calls.get("function_call"), Some(&2));
        assert_eq!(ctx.tool_calls.get("web_search_call"), Some(&3));
        assert_eq!(ctx.tool_calls.get("code_interpreter_call"), Some(&1));
        assert_eq!(ctx.tool_calls.len(), 3);
        assert!(ctx.has_tool_calls);
    }

    #[test]
    fn test_chat_tool_calls_counted_individually() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .build();
        processor.process(&mut ctx, ResponseBody::Json(OpenAIFixtures::chat_tool_calls()));

        assert_eq!(ctx.tool_calls.get("function_call"), Some(&2));
        assert_eq!(ctx.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(ctx.model, "gpt-4o-2024-08-06");
    }

    // ==================== Idempotence ====================

    #[test]
    fn test_second_process_returns_same_usage() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/responses")
            .build();
        let body = OpenAIFixtures::responses_with_tools();

        let first = processor.process(&mut ctx, ResponseBody::Json(body.clone()));
        let tools = ctx.tool_calls.clone();
        let second = processor.process(&mut ctx, ResponseBody::Json(body));

        assert_eq!(first.usage(), second.usage());
        assert_eq!(ctx.tool_calls, tools);
        assert!(ctx.processed);
    }

    // ==================== Model Identity ====================

    #[test]
    fn test_snapshot_kept_beside_requested_model() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .model("gpt-4o-mini")
            .build();
        processor.process(
            &mut ctx,
            ResponseBody::Json(OpenAIFixtures::chat_completion("gpt-4o-mini-2024-07-18", 5, 5)),
        );
        assert_eq!(ctx.model, "gpt-4o-mini");
        assert_eq!(ctx.model_snapshot.as_deref(), Some("gpt-4o-mini-2024-07-18"));
    }

    #[test]
    fn test_speech_characters_from_request() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::ElevenLabs)
            .endpoint("/v1/text-to-speech/voice123")
            .request_body(json!({"text": "Hello there", "model_id": "eleven_flash_v2_5"}))
            .build();
        let body = ResponseBody::Binary {
            data: vec![0xff, 0xf3, 0x44, 0xc4],
            content_type: Some("audio/mpeg".into()),
        };
        processor.process(&mut ctx, body);

        assert_eq!(ctx.model, "eleven_flash_v2_5");
        assert_eq!(ctx.model_type, Some(ModelType::Audio));
        assert_eq!(ctx.usage.input_characters(), Some(11));
    }

    // ==================== Reasoning and Sanitizing ====================

    #[test]
    fn test_thinking_block_sets_reasoning() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::Anthropic)
            .endpoint("/v1/messages")
            .build();
        processor.process(
            &mut ctx,
            ResponseBody::Json(AnthropicFixtures::message_with_tool_use()),
        );

        assert!(ctx.has_reasoning);
        assert!(ctx.has_tool_calls);
        assert_eq!(ctx.tool_calls.get("tool_use"), Some(&1));
        let tokens = ctx.usage.tokens_or_default();
        assert_eq!(tokens.prompt_tokens, 140);
        assert_eq!(tokens.cached_tokens, 40);
    }

    #[test]
    fn test_inline_image_is_sanitized() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::Google)
            .endpoint(GeminiFixtures::ENDPOINT)
            .build();
        let outcome = processor.process(&mut ctx, ResponseBody::Json(GeminiFixtures::image()));

        assert_eq!(ctx.usage.image_count(), 1);
        assert_eq!(ctx.model, "gemini-2.5-flash-image");
        let body = outcome.body().unwrap();
        assert_eq!(
            body["candidates"][0]["content"]["parts"][0]["inlineData"]["data"],
            json!(BASE64_MARKER)
        );
        assert_eq!(body["finish_reason"], json!("STOP"));
    }

    #[test]
    fn test_pending_video_is_skipped() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/videos/video_123")
            .build();
        let outcome = processor.process(&mut ctx, ResponseBody::Json(OpenAIFixtures::video("queued")));
        assert!(outcome.is_skipped());
        assert!(!ctx.processed);

        let outcome =
            processor.process(&mut ctx, ResponseBody::Json(OpenAIFixtures::video("completed")));
        assert!(!outcome.is_skipped());
        assert_eq!(ctx.usage.video_count(), 1);
        assert!(ctx.expires_at.is_some());
    }

    #[test]
    fn test_malformed_body_degrades_to_empty() {
        let processor = processor();
        let mut ctx = RequestContext::builder(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .build();
        let outcome = processor.process(&mut ctx, ResponseBody::from_json_bytes(b"{not json"));
        assert!(!outcome.is_skipped());
        assert!(ctx.usage.tokens_or_default().is_zero());
        assert!(ctx.processed);
    }
}
