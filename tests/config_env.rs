// tests/config_env.rs
//
// Environment-driven configuration: the completion key comes only from the
// environment, and the config path override is honored. Env mutation forces
// these to run serially.

use std::fs;

use serial_test::serial;

use stock_news_analyzer::config::{AnalyzerConfig, LlmConfig, ENV_API_KEY, ENV_CONFIG_PATH};

#[test]
#[serial]
fn api_key_is_read_from_env() {
    std::env::remove_var(ENV_API_KEY);
    assert!(LlmConfig::resolve_api_key().is_none());

    std::env::set_var(ENV_API_KEY, "gsk_test_key");
    assert_eq!(LlmConfig::resolve_api_key().as_deref(), Some("gsk_test_key"));

    // whitespace-only is as good as unset
    std::env::set_var(ENV_API_KEY, "   ");
    assert!(LlmConfig::resolve_api_key().is_none());

    std::env::remove_var(ENV_API_KEY);
}

#[test]
#[serial]
fn config_path_override_is_honored() {
    let path = std::env::temp_dir().join("analyzer-config-test.toml");
    fs::write(
        &path,
        r#"
        [acquisition]
        target_count = 2
        request_delay_ms = 100

        [discovery]
        max_results = 10
        "#,
    )
    .expect("write temp config");

    std::env::set_var(ENV_CONFIG_PATH, &path);
    let cfg = AnalyzerConfig::load_or_default();
    std::env::remove_var(ENV_CONFIG_PATH);
    let _ = fs::remove_file(&path);

    assert_eq!(cfg.acquisition.target_count, 2);
    assert_eq!(cfg.acquisition.request_delay_ms, 100);
    assert_eq!(cfg.discovery.max_results, 10);
    // unspecified sections keep defaults
    assert_eq!(cfg.extraction.min_raw_chars, 2_000);
}

#[test]
#[serial]
fn missing_config_file_falls_back_to_defaults() {
    std::env::set_var(ENV_CONFIG_PATH, "/nonexistent/analyzer.toml");
    let cfg = AnalyzerConfig::load_or_default();
    std::env::remove_var(ENV_CONFIG_PATH);

    assert_eq!(cfg.acquisition.target_count, 5);
    assert_eq!(cfg.discovery.max_results, 40);
}
