//! Config loader — reads `~/.camp/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.camp/config.json`
//! 3. Legacy variables (`OPENAI_API_KEY`, `SENDGRID_*`, `PUBLISH_MODE`,
//!    `BUSINESS_URL`), which only fill fields the file left empty
//! 4. `CAMP_<SECTION>__<FIELD>` variables (override everything)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, PublishMode};
use crate::channel::Channel;
use crate::recipients::parse_email_list;
use crate::tone::Tone;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given (or default) path + process env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit env lookup.
pub fn load_config_with_env(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_file(&config_path), env)
}

/// Read and parse the JSON file only.
fn load_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Structured format: `CAMP_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `CAMP_GENERATION__PROVIDER` / `__API_KEY` / `__API_BASE` / `__MODEL` /
///   `__TEMPERATURE` / `__TIMEOUT_SECS`
/// - `CAMP_PUBLISH__MODE` / `__OUTPUT_DIR`
/// - `CAMP_PUBLISH__SENDGRID__API_KEY` / `__FROM_EMAIL` / `__DEFAULT_TO`
/// - `CAMP_CHANNELS__<CHANNEL>__ENABLED` / `__LIVE`
/// - `CAMP_DEFAULTS__TONE` / `__BUSINESS_URL`
/// - `CAMP_TOKENS__KEY_FILE` / `__STORE_PATH`
pub fn apply_env_overrides(mut config: Config, env: impl Fn(&str) -> Option<String>) -> Config {
    apply_legacy_env(&mut config, &env);

    // Generation
    if let Some(val) = env("CAMP_GENERATION__PROVIDER") {
        config.generation.provider = val;
    }
    if let Some(val) = env("CAMP_GENERATION__API_KEY") {
        config.generation.api_key = val;
    }
    if let Some(val) = env("CAMP_GENERATION__API_BASE") {
        config.generation.api_base = Some(val);
    }
    if let Some(val) = env("CAMP_GENERATION__MODEL") {
        config.generation.model = val;
    }
    if let Some(val) = env("CAMP_GENERATION__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.generation.temperature = t;
        }
    }
    if let Some(val) = env("CAMP_GENERATION__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.generation.timeout_secs = n;
        }
    }

    // Publishing
    if let Some(val) = env("CAMP_PUBLISH__MODE") {
        match val.parse::<PublishMode>() {
            Ok(mode) => config.publish.mode = mode,
            Err(e) => warn!("Ignoring CAMP_PUBLISH__MODE: {}", e),
        }
    }
    if let Some(val) = env("CAMP_PUBLISH__OUTPUT_DIR") {
        config.publish.output_dir = val;
    }
    if let Some(val) = env("CAMP_PUBLISH__SENDGRID__API_KEY") {
        config.publish.sendgrid.api_key = val;
    }
    if let Some(val) = env("CAMP_PUBLISH__SENDGRID__FROM_EMAIL") {
        config.publish.sendgrid.from_email = val;
    }
    if let Some(val) = env("CAMP_PUBLISH__SENDGRID__DEFAULT_TO") {
        config.publish.sendgrid.default_to = parse_email_list(&val);
    }

    // Channels
    for channel in Channel::ALL {
        let section = channel.as_str().to_uppercase();
        let toggle = config.channels.get_mut(channel);
        if let Some(val) = env(&format!("CAMP_CHANNELS__{section}__ENABLED")) {
            toggle.enabled = is_truthy(&val);
        }
        if let Some(val) = env(&format!("CAMP_CHANNELS__{section}__LIVE")) {
            toggle.live = is_truthy(&val);
        }
    }

    // Defaults
    if let Some(val) = env("CAMP_DEFAULTS__TONE") {
        match val.parse::<Tone>() {
            Ok(tone) => config.defaults.tone = tone,
            Err(e) => warn!("Ignoring CAMP_DEFAULTS__TONE: {}", e),
        }
    }
    if let Some(val) = env("CAMP_DEFAULTS__BUSINESS_URL") {
        config.defaults.business_url = val;
    }

    // Token store
    if let Some(val) = env("CAMP_TOKENS__KEY_FILE") {
        config.tokens.key_file = val;
    }
    if let Some(val) = env("CAMP_TOKENS__STORE_PATH") {
        config.tokens.store_path = val;
    }

    config
}

/// Plain variable names from earlier deployments. They never overwrite a
/// value the config file already set.
fn apply_legacy_env(config: &mut Config, env: &impl Fn(&str) -> Option<String>) {
    let present = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if config.generation.api_key.is_empty() {
        if let Some(val) = present("OPENAI_API_KEY") {
            config.generation.api_key = val;
        }
    }
    if config.publish.sendgrid.api_key.is_empty() {
        if let Some(val) = present("SENDGRID_API_KEY") {
            config.publish.sendgrid.api_key = val;
        }
    }
    if config.publish.sendgrid.from_email.is_empty() {
        if let Some(val) = present("SENDGRID_FROM") {
            config.publish.sendgrid.from_email = val;
        }
    }
    if config.publish.sendgrid.default_to.is_empty() {
        if let Some(val) = present("SENDGRID_TO") {
            config.publish.sendgrid.default_to = parse_email_list(&val);
        }
    }
    if config.publish.mode == PublishMode::Local {
        if let Some(val) = present("PUBLISH_MODE") {
            match val.parse::<PublishMode>() {
                Ok(mode) => config.publish.mode = mode,
                Err(e) => warn!("Ignoring PUBLISH_MODE: {}", e),
            }
        }
    }
    if config.defaults.business_url.is_empty() {
        if let Some(val) = present("BUSINESS_URL") {
            config.defaults.business_url = val;
        }
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_with_env(Some(Path::new("/nonexistent/camp/config.json")), no_env);
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.publish.mode, PublishMode::Local);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "generation": { "model": "gpt-4o", "maxTokens": 2048 },
            "defaults": { "tone": "sharp" }
        }"#,
        );

        let config = load_config_with_env(Some(file.path()), no_env);
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.generation.max_tokens, 2048);
        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.defaults.tone, Tone::Sharp);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_with_env(Some(file.path()), no_env);
        assert_eq!(config.generation.max_tokens, 1024);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.generation.api_key = "sk-test".to_string();
        config.publish.mode = PublishMode::Live;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_with_env(Some(&path), no_env);
        assert_eq!(reloaded.generation.api_key, "sk-test");
        assert_eq!(reloaded.publish.mode, PublishMode::Live);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["generation"].get("apiKey").is_some());
        assert!(raw["generation"].get("api_key").is_none());
    }

    #[test]
    fn test_legacy_env_fills_empty_fields() {
        let env = env_of(&[
            ("OPENAI_API_KEY", "sk-legacy"),
            ("SENDGRID_API_KEY", "SG.legacy"),
            ("SENDGRID_FROM", "shop@example.com"),
            ("SENDGRID_TO", "a@example.com, bad, b@example.com"),
            ("PUBLISH_MODE", "sendgrid"),
            ("BUSINESS_URL", "https://shop.example.com"),
        ]);
        let config = apply_env_overrides(Config::default(), env);
        assert_eq!(config.generation.api_key, "sk-legacy");
        assert!(config.publish.sendgrid.is_configured());
        assert_eq!(
            config.publish.sendgrid.default_to,
            vec!["a@example.com", "b@example.com"]
        );
        assert_eq!(config.publish.mode, PublishMode::Live);
        assert_eq!(config.defaults.business_url, "https://shop.example.com");
    }

    #[test]
    fn test_legacy_env_does_not_override_file() {
        let mut config = Config::default();
        config.generation.api_key = "sk-file".into();
        let config = apply_env_overrides(config, env_of(&[("OPENAI_API_KEY", "sk-legacy")]));
        assert_eq!(config.generation.api_key, "sk-file");
    }

    #[test]
    fn test_structured_env_wins() {
        let mut config = Config::default();
        config.generation.api_key = "sk-file".into();
        let env = env_of(&[
            ("CAMP_GENERATION__API_KEY", "sk-env"),
            ("CAMP_GENERATION__TIMEOUT_SECS", "5"),
            ("CAMP_CHANNELS__SMS__ENABLED", "false"),
            ("CAMP_CHANNELS__SOCIAL__LIVE", "1"),
            ("CAMP_DEFAULTS__TONE", "Humorous"),
        ]);
        let config = apply_env_overrides(config, env);
        assert_eq!(config.generation.api_key, "sk-env");
        assert_eq!(config.generation.timeout_secs, 5);
        assert!(!config.channels.sms.enabled);
        assert!(config.channels.social.live);
        assert_eq!(config.defaults.tone, Tone::Humorous);
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let env = env_of(&[
            ("CAMP_PUBLISH__MODE", "carrier-pigeon"),
            ("CAMP_DEFAULTS__TONE", "grumpy"),
            ("CAMP_GENERATION__TEMPERATURE", "warm"),
        ]);
        let config = apply_env_overrides(Config::default(), env);
        assert_eq!(config.publish.mode, PublishMode::Local);
        assert_eq!(config.defaults.tone, Tone::Professional);
        assert_eq!(config.generation.temperature, 0.6);
    }
}
