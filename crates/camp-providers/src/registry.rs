//! Provider registry — static specs for the supported OpenAI-compatible backends.
//!
//! Each `ProviderSpec` describes how to reach a provider: API base, key
//! prefix used for auto-detection, and per-model parameter quirks.

use camp_core::config::GenerationConfig;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one generation provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// If the API key starts with this prefix, auto-detect this provider.
    pub detect_by_key_prefix: Option<&'static str>,
    /// Per-model overrides applied to the request.
    pub model_overrides: &'static [ModelOverride],
}

/// A per-model parameter override.
#[derive(Clone, Debug)]
pub struct ModelOverride {
    /// Substring to match in the lowercase model name.
    pub pattern: &'static str,
    pub field: OverrideField,
    pub value: f64,
}

/// Fields that can be overridden per model.
#[derive(Clone, Debug)]
pub enum OverrideField {
    Temperature,
}

/// Supported providers, in auto-detection priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    // OpenRouter — matched by key prefix "sk-or-"
    ProviderSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        default_api_base: "https://openrouter.ai/api/v1",
        detect_by_key_prefix: Some("sk-or-"),
        model_overrides: &[],
    },
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        detect_by_key_prefix: None,
        // reasoning models only accept the default temperature
        model_overrides: &[
            ModelOverride {
                pattern: "o1",
                field: OverrideField::Temperature,
                value: 1.0,
            },
            ModelOverride {
                pattern: "o3",
                field: OverrideField::Temperature,
                value: 1.0,
            },
        ],
    },
    ProviderSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        default_api_base: "https://api.deepseek.com/v1",
        detect_by_key_prefix: None,
        model_overrides: &[],
    },
    ProviderSpec {
        name: "groq",
        display_name: "Groq",
        default_api_base: "https://api.groq.com/openai/v1",
        detect_by_key_prefix: Some("gsk_"),
        model_overrides: &[],
    },
    ProviderSpec {
        name: "gemini",
        display_name: "Gemini",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
        detect_by_key_prefix: Some("AIza"),
        model_overrides: &[],
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let name = name.trim().to_lowercase();
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Auto-detect a provider from its API key prefix.
pub fn find_by_key(api_key: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|s| {
        s.detect_by_key_prefix
            .is_some_and(|pfx| api_key.starts_with(pfx))
    })
}

/// Pick the spec for a generation config.
///
/// 1. A key prefix that identifies a provider wins (an OpenRouter key never
///    goes to OpenAI).
/// 2. Otherwise the configured provider name.
/// 3. Otherwise OpenAI.
pub fn resolve_spec(config: &GenerationConfig) -> &'static ProviderSpec {
    find_by_key(&config.api_key)
        .or_else(|| find_by_name(&config.provider))
        .unwrap_or(&PROVIDERS[1])
}

/// Apply per-model overrides to the requested temperature.
pub fn apply_model_overrides(model: &str, spec: &ProviderSpec, temperature: f64) -> f64 {
    let model_lower = model.to_lowercase();
    let mut temp = temperature;

    for ovr in spec.model_overrides {
        if model_lower.starts_with(ovr.pattern) {
            match ovr.field {
                OverrideField::Temperature => temp = ovr.value,
            }
        }
    }

    temp
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, key: &str) -> GenerationConfig {
        GenerationConfig {
            provider: provider.to_string(),
            api_key: key.to_string(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("OpenAI").unwrap().display_name, "OpenAI");
        assert!(find_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_find_by_key_prefix() {
        assert_eq!(find_by_key("sk-or-v1-abc").unwrap().name, "openrouter");
        assert_eq!(find_by_key("gsk_123").unwrap().name, "groq");
        assert!(find_by_key("sk-proj-123").is_none());
    }

    #[test]
    fn test_resolve_spec_prefers_key_prefix() {
        assert_eq!(resolve_spec(&config("openai", "sk-or-v1-abc")).name, "openrouter");
        assert_eq!(resolve_spec(&config("deepseek", "sk-123")).name, "deepseek");
        assert_eq!(resolve_spec(&config("mystery", "sk-123")).name, "openai");
    }

    #[test]
    fn test_model_override_reasoning() {
        let spec = find_by_name("openai").unwrap();
        assert_eq!(apply_model_overrides("o3-mini", spec, 0.6), 1.0);
        assert_eq!(apply_model_overrides("gpt-4o-mini", spec, 0.6), 0.6);
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let mut names: Vec<&str> = PROVIDERS.iter().map(|p| p.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PROVIDERS.len());
    }
}
