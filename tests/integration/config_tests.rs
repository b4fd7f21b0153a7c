//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use std::io::Write;

    use llm_usage::{MeterConfig, MeterError, Provider};

    #[test]
    fn test_config_file_drives_meter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
persist_media: false
default_currency: USD
custom_hosts:
  openai:
    - llm.corp.example
sanitize:
  base64_min_length: 64
logging:
  level: warn
"#
        )
        .unwrap();

        let config = MeterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sanitize.base64_min_length, 64);
        assert_eq!(config.logging.level, "warn");

        let (meter, _) = crate::common::test_meter_with(&config);
        assert_eq!(meter.detect_provider("llm.corp.example"), Some(Provider::OpenAI));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sanitize:\n  base64_min_length: 0\n").unwrap();
        assert!(matches!(
            MeterConfig::from_file(file.path()),
            Err(MeterError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MeterConfig::from_file(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(MeterError::Config(_))));
    }

    #[test]
    fn test_missing_pricing_catalog_fails_meter() {
        let config = MeterConfig {
            pricing_catalog: Some("/nonexistent/pricing.yaml".into()),
            ..MeterConfig::default()
        };
        let sink = std::sync::Arc::new(llm_usage::InMemorySink::new());
        assert!(llm_usage::UsageMeter::from_config(&config, sink).is_err());
    }
}
