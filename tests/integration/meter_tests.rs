//! Usage meter integration tests
//!
//! Process, price and persist through one `UsageMeter`.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{AnthropicFixtures, OpenAIFixtures};
    use crate::common::{test_meter, test_meter_with};
    use futures::StreamExt;
    use futures::stream;
    use llm_usage::{MeterConfig, PricingTierName, Provider, ResponseBody, TrackedStream};
    use serde_json::{Value, json};

    // ==================== Non-streaming ====================

    #[test]
    fn test_record_prices_and_persists() {
        let (meter, sink) = test_meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .request_body(json!({"model": "gpt-4.1", "service_tier": "flex"}))
            .tag("integration")
            .build();
        meter.prepare(&mut ctx);
        assert_eq!(ctx.model, "gpt-4.1");
        assert_eq!(ctx.pricing_tier, Some(PricingTierName::Flex));

        let body = OpenAIFixtures::chat_completion("gpt-4.1-2025-04-14", 19, 10);
        meter.record(&mut ctx, ResponseBody::Json(body)).unwrap();

        // gpt-4.1 has no flex tier, so standard prices apply
        let expected = (19.0 * 200.0 + 10.0 * 800.0) / 1_000_000.0;
        assert!((ctx.total_cost - expected).abs() < 1e-12);
        assert_eq!(ctx.pricing_tier, Some(PricingTierName::Standard));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["model"], json!("gpt-4.1"));
        assert_eq!(record["model_snapshot"], json!("gpt-4.1-2025-04-14"));
        assert_eq!(record["tags"], json!(["integration"]));
        assert_eq!(record["response_body"]["finish_reason"], json!("stop"));
    }

    #[test]
    fn test_azure_priced_from_openai_tables() {
        let (meter, sink) = test_meter();
        let mut ctx = meter
            .context(Provider::Azure)
            .endpoint("/openai/deployments/prod-4o/chat/completions")
            .request_body(json!({"messages": []}))
            .build();
        meter.prepare(&mut ctx);
        assert!(!ctx.has_known_model());

        let body = OpenAIFixtures::chat_completion("gpt-4o-2024-08-06", 1_000, 1_000);
        meter.record(&mut ctx, ResponseBody::Json(body)).unwrap();

        assert_eq!(ctx.model, "gpt-4o-2024-08-06");
        assert!(ctx.total_cost > 0.0);
        assert_eq!(sink.records()[0]["provider"], json!("azure"));
    }

    #[test]
    fn test_tool_surcharge_is_added() {
        let (meter, _) = test_meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/responses")
            .build();
        meter
            .record(&mut ctx, ResponseBody::Json(OpenAIFixtures::responses_with_tools()))
            .unwrap();

        assert!(ctx.tool_cost > 0.0);
        let token_cost = ctx.prompt_cost.unwrap_or(0.0) + ctx.completion_cost.unwrap_or(0.0);
        assert!((ctx.total_cost - (token_cost + ctx.tool_cost)).abs() < 1e-9);
    }

    #[test]
    fn test_speech_priced_by_characters() {
        let (meter, sink) = test_meter();
        let text = "x".repeat(1_000);
        let mut ctx = meter
            .context(Provider::ElevenLabs)
            .endpoint("/v1/text-to-speech/voice123")
            .request_body(json!({"text": text, "model_id": "eleven_multilingual_v2"}))
            .build();
        meter.prepare(&mut ctx);
        meter
            .record(
                &mut ctx,
                ResponseBody::from_bytes(vec![0xff, 0xf3, 0x00, 0x01], Some("audio/mpeg")),
            )
            .unwrap();

        assert!((ctx.total_cost - 30.0).abs() < 1e-9);
        let record = &sink.records()[0];
        assert_eq!(record["characters"], json!(1_000));
        assert_eq!(record["pricing_unit"], json!("characters"));
        assert_eq!(record["response_body"]["content"], json!("[binary omitted]"));
    }

    #[test]
    fn test_currency_from_config() {
        let config = MeterConfig {
            default_currency: "EUR".to_string(),
            ..MeterConfig::default()
        };
        let (meter, sink) = test_meter_with(&config);
        let mut ctx = meter.context(Provider::Anthropic).endpoint("/v1/messages").build();
        meter
            .record(&mut ctx, ResponseBody::Json(AnthropicFixtures::message_with_tool_use()))
            .unwrap();
        assert_eq!(sink.records()[0]["currency"], json!("EUR"));
    }

    // ==================== Streaming ====================

    #[tokio::test]
    async fn test_stream_recorded_once() {
        let (meter, sink) = test_meter();
        let tracker = meter.start_stream(
            meter
                .context(Provider::OpenAI)
                .endpoint("/v1/chat/completions"),
        );
        let chunks: Vec<Result<Value, std::io::Error>> = vec![
            Ok(OpenAIFixtures::chat_chunk("Hi")),
            Ok(OpenAIFixtures::chat_final_chunk(15, 5)),
        ];
        let mut tracked = TrackedStream::new(stream::iter(chunks), tracker);
        while tracked.next().await.is_some() {}

        assert!(meter.finish_stream(tracked.tracker_mut()).unwrap().is_some());
        assert!(meter.finish_stream(tracked.tracker_mut()).is_err());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["prompt_tokens"], json!(15));
        assert_eq!(records[0]["streamed"], json!(true));
        assert!(records[0]["time_to_first_token_ms"].is_u64());
    }
}
