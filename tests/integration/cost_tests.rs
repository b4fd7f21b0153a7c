//! Pricing and cost calculation integration tests

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use llm_usage::core::cost::tokens_to_cost;
    use llm_usage::{
        CostCalculator, PricingCatalog, PricingTierName, Provider, TokenMetrics, UsageQuantities,
    };

    fn calculator() -> CostCalculator {
        CostCalculator::new(Arc::new(PricingCatalog::builtin()))
    }

    // ==================== Token Pricing ====================

    #[test]
    fn test_small_token_cost() {
        let usage = UsageQuantities::from_tokens(TokenMetrics::new(19, 10));
        let cost = calculator().calculate(Provider::OpenAI, "gpt-4.1", None, None, &usage);

        let expected = (19.0 * 200.0 + 10.0 * 800.0) / 1_000_000.0;
        assert!((cost.total_cost - expected).abs() < 1e-12);
        assert!(cost.total_cost > 0.0 && cost.total_cost < 1.0);
        assert_eq!(cost.prompt_cost, Some(tokens_to_cost(19, 200.0)));
    }

    /// A tier the model does not define prices like standard
    #[test]
    fn test_missing_tier_falls_back_to_standard() {
        let calculator = calculator();
        let usage = UsageQuantities::from_tokens(TokenMetrics::new(5_000, 1_000));
        let flex = calculator.calculate(
            Provider::OpenAI,
            "gpt-4.1",
            Some(PricingTierName::Flex),
            None,
            &usage,
        );
        let standard = calculator.calculate(
            Provider::OpenAI,
            "gpt-4.1",
            Some(PricingTierName::Standard),
            None,
            &usage,
        );
        assert_eq!(flex.total_cost, standard.total_cost);
        assert_eq!(flex.tier, Some(PricingTierName::Standard));
    }

    #[test]
    fn test_every_catalog_entry_is_non_negative() {
        let calculator = calculator();
        let usage = UsageQuantities {
            tokens: TokenMetrics::new(1_000, 500).with_cached(100).with_reasoning(50),
            duration_seconds: Some(30.0),
            characters: Some(1_000),
            images: 2,
            videos: 1,
            searches: 1,
            ..Default::default()
        };
        let catalog = calculator.catalog();
        for (provider, model) in catalog.iter() {
            for tier in [
                None,
                Some(PricingTierName::Standard),
                Some(PricingTierName::Batch),
                Some(PricingTierName::Flex),
                Some(PricingTierName::Priority),
                Some(PricingTierName::Hd),
            ] {
                let cost = calculator.calculate(provider, &model.internal_name, tier, None, &usage);
                assert!(cost.total_cost >= 0.0, "{} {:?}", model.internal_name, tier);
                assert!(cost.model_found, "{}", model.internal_name);
            }
        }
    }

    #[test]
    fn test_unknown_model_costs_nothing() {
        let usage = UsageQuantities::from_tokens(TokenMetrics::new(100, 100));
        let cost = calculator().calculate(Provider::Anthropic, "claude-99", None, None, &usage);
        assert_eq!(cost.total_cost, 0.0);
        assert!(!cost.model_found);
    }

    // ==================== Catalog Files ====================

    #[test]
    fn test_catalog_file_overrides_builtin_model() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
providers:
  - provider: openai
    models:
      - internal_name: gpt-4.1
        display_name: GPT-4.1 (negotiated)
        model_type: text
        pricing_unit: tokens
        tiers:
          - name: standard
            input_price: 100.0
            output_price: 400.0
"#
        )
        .unwrap();

        let catalog = PricingCatalog::builtin_with_file(file.path()).unwrap();
        let calculator = CostCalculator::new(Arc::new(catalog));
        let usage = UsageQuantities::from_tokens(TokenMetrics::new(1_000_000, 0));
        let cost = calculator.calculate(Provider::OpenAI, "gpt-4.1", None, None, &usage);
        assert_eq!(cost.total_cost, 100.0);

        // Models the file does not mention keep their built-in prices
        let cost = calculator.calculate(Provider::OpenAI, "gpt-4o", None, None, &usage);
        assert_eq!(cost.total_cost, 250.0);
    }
}
