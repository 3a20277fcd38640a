use std::io::Write;

use relaybot::{config::GlobalConfig, AppError};

fn sample_toml() -> &'static str {
    r#"
private_by_default = true

[slack]
channel_id = "C123"

[chat]
api_base = "https://llm.internal.example"
model = "claude-3-haiku-20240307"
max_tokens = 512
temperature = 0.2
system_prompt = "Be brief."
"#
}

#[test]
fn parses_full_config() {
    let config = GlobalConfig::from_toml_str(sample_toml()).unwrap();

    assert!(config.private_by_default);
    assert_eq!(config.slack.channel_id.as_deref(), Some("C123"));
    assert_eq!(config.chat.api_base, "https://llm.internal.example");
    assert_eq!(config.chat.model, "claude-3-haiku-20240307");
    assert_eq!(config.chat.max_tokens, 512);
    assert!((config.chat.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.chat.system_prompt, "Be brief.");
}

#[test]
fn empty_config_uses_defaults() {
    let config = GlobalConfig::from_toml_str("").unwrap();

    assert!(!config.private_by_default);
    assert_eq!(config.slack.channel_id, None);
    assert_eq!(config.chat.api_base, "https://api.anthropic.com");
    assert_eq!(config.chat.model, "claude-3-5-sonnet-20240620");
    assert_eq!(config.chat.max_tokens, 1000);
    assert!((config.chat.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.chat.system_prompt, "You are Claude, an AI assistant.");
}

#[test]
fn tokens_are_never_read_from_file() {
    let raw = r#"
[slack]
app_token = "xapp-leak"
bot_token = "xoxb-leak"

[chat]
api_key = "sk-leak"
"#;
    let config = GlobalConfig::from_toml_str(raw).unwrap();

    assert!(config.slack.app_token.is_empty());
    assert!(config.slack.bot_token.is_empty());
    assert!(config.chat.api_key.is_empty());
}

#[test]
fn rejects_zero_max_tokens() {
    let err = GlobalConfig::from_toml_str("[chat]\nmax_tokens = 0\n").unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("max_tokens")));
}

#[test]
fn rejects_out_of_range_temperature() {
    let err = GlobalConfig::from_toml_str("[chat]\ntemperature = 1.5\n").unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("temperature")));
}

#[test]
fn rejects_blank_model() {
    let err = GlobalConfig::from_toml_str("[chat]\nmodel = \"  \"\n").unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("model")));
}

#[test]
fn rejects_blank_channel() {
    let err = GlobalConfig::from_toml_str("[slack]\nchannel_id = \"\"\n").unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("channel_id")));
}

#[test]
fn rejects_invalid_toml() {
    let err = GlobalConfig::from_toml_str("[chat\nmodel = 1").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn loads_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample_toml().as_bytes()).unwrap();

    let config = GlobalConfig::load_from_path(file.path()).unwrap();
    assert_eq!(config.chat.max_tokens, 512);
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GlobalConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("failed to read config")));
}

#[test]
fn starting_prompt_path_is_optional() {
    let config = GlobalConfig::from_toml_str("starting_prompt = \"prompts/start.txt\"\n").unwrap();
    assert_eq!(
        config.starting_prompt.as_deref(),
        Some(std::path::Path::new("prompts/start.txt"))
    );

    let config = GlobalConfig::from_toml_str("").unwrap();
    assert_eq!(config.starting_prompt, None);
}
