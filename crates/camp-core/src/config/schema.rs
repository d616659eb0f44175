//! Configuration schema.
//!
//! Hierarchy: `Config` → `GenerationConfig`, `PublishConfig`, `ChannelsConfig`,
//! `DefaultsConfig`, `TokenStoreConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::ValidationError;
use crate::tone::Tone;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded once from `~/.camp/config.json` + env vars,
/// then passed by reference into the engine and publisher registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub publish: PublishConfig,
    pub channels: ChannelsConfig,
    pub defaults: DefaultsConfig,
    pub tokens: TokenStoreConfig,
}

// ─────────────────────────────────────────────
// Generation provider
// ─────────────────────────────────────────────

/// External generation provider settings.
///
/// An empty `api_key` means no provider: the deterministic composer is used.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Provider name from the provider registry (`openai`, `openrouter`, ...).
    pub provider: String,
    pub api_key: String,
    /// Custom API base URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub model: String,
    /// Sampling temperature for channel copy.
    pub temperature: f64,
    pub max_tokens: u32,
    /// Hard ceiling on a single provider call, in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: String::new(),
            api_base: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.6,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

impl GenerationConfig {
    /// Whether a provider credential is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ─────────────────────────────────────────────
// Publishing
// ─────────────────────────────────────────────

/// Whether publishing goes to local files only or to live transports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    #[default]
    Local,
    #[serde(alias = "sendgrid")]
    Live,
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PublishMode::Local => "local",
            PublishMode::Live => "live",
        })
    }
}

impl FromStr for PublishMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(PublishMode::Local),
            "live" | "sendgrid" => Ok(PublishMode::Live),
            _ => Err(ValidationError::UnknownPublishMode(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishConfig {
    pub mode: PublishMode,
    /// Root directory for local publish records.
    pub output_dir: String,
    /// Ceiling on a single transport call, in seconds.
    pub timeout_secs: u64,
    pub sendgrid: SendGridConfig,
    pub twilio: TwilioConfig,
    pub meta: MetaConfig,
    pub linkedin: LinkedInConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::Local,
            output_dir: "~/.camp/published".to_string(),
            timeout_secs: 30,
            sendgrid: SendGridConfig::default(),
            twilio: TwilioConfig::default(),
            meta: MetaConfig::default(),
            linkedin: LinkedInConfig::default(),
        }
    }
}

/// SendGrid email transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendGridConfig {
    pub api_key: String,
    /// Verified sender identity.
    pub from_email: String,
    /// Used when a publish call supplies no recipients.
    pub default_to: Vec<String>,
    pub api_base: String,
    pub timeout_secs: u64,
    pub sandbox_timeout_secs: u64,
    /// Advertisement tag prefixed once to every subject.
    pub subject_tag: String,
    /// Link used when the campaign has none and the body needs one.
    pub fallback_link: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_email: String::new(),
            default_to: Vec::new(),
            api_base: "https://api.sendgrid.com".to_string(),
            timeout_secs: 20,
            sandbox_timeout_secs: 15,
            subject_tag: "[Ad]".to_string(),
            fallback_link: "https://example.com".to_string(),
        }
    }
}

impl SendGridConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.from_email.trim().is_empty()
    }
}

/// Twilio SMS transport (planned).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Meta (Facebook/Instagram) page publishing (planned).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaConfig {
    pub page_id: String,
}

/// LinkedIn organization publishing (planned).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedInConfig {
    pub organization_id: String,
}

// ─────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────

/// Per-channel switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelToggle {
    /// Publishing to a disabled channel reports `failed`.
    pub enabled: bool,
    /// In live mode, route to the channel's live transport instead of local files.
    pub live: bool,
}

impl Default for ChannelToggle {
    fn default() -> Self {
        Self {
            enabled: true,
            live: false,
        }
    }
}

/// Which network handles the social channel in live mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    #[default]
    Meta,
    LinkedIn,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelsConfig {
    pub email: ChannelToggle,
    pub sms: ChannelToggle,
    pub social: ChannelToggle,
    pub ads: ChannelToggle,
    pub social_platform: SocialPlatform,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            email: ChannelToggle {
                enabled: true,
                live: true,
            },
            sms: ChannelToggle::default(),
            social: ChannelToggle::default(),
            ads: ChannelToggle::default(),
            social_platform: SocialPlatform::Meta,
        }
    }
}

impl ChannelsConfig {
    pub fn get(&self, channel: Channel) -> ChannelToggle {
        match channel {
            Channel::Email => self.email,
            Channel::Sms => self.sms,
            Channel::Social => self.social,
            Channel::Ads => self.ads,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut ChannelToggle {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Sms => &mut self.sms,
            Channel::Social => &mut self.social,
            Channel::Ads => &mut self.ads,
        }
    }
}

// ─────────────────────────────────────────────
// Defaults & token store
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultsConfig {
    /// Tone used when a call does not name one.
    pub tone: Tone,
    pub idea_count: usize,
    /// Link fallback for ideas when the campaign has no landing page.
    pub business_url: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tone: Tone::Professional,
            idea_count: 3,
            business_url: String::new(),
        }
    }
}

/// Integration token store location.
///
/// An empty `key_file` means social transports have no token store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenStoreConfig {
    pub store_path: String,
    pub key_file: String,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            store_path: "~/.camp/tokens.json".to_string(),
            key_file: String::new(),
        }
    }
}

impl TokenStoreConfig {
    pub fn is_configured(&self) -> bool {
        !self.key_file.trim().is_empty()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
