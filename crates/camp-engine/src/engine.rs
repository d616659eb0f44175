//! ContentEngine — brief and per-channel copy, provider first, composer on failure.
//!
//! Generation never fails the caller: any provider error (auth, quota,
//! timeout, empty or malformed output) is logged and the deterministic
//! composer answers instead. Both paths finish through `validate_and_shape`.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures_util::future::join_all;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use camp_core::config::Config;
use camp_core::{
    validate_and_shape, Brief, Campaign, Channel, Content, GenerationSource, PipelineError, Tone,
};
use camp_providers::{create_provider, GenerationProvider, GenerationRequest, ProviderError};

use crate::composer::{compose_sms, DeterministicComposer};
use crate::prompts::{brief_prompt, content_prompt, SYSTEM_PROMPT};

/// Placeholder tags such as `[Name]` or `[link]` that models sometimes emit.
static BRACKET_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\[[^\]\n]{1,40}\][ \t]*").unwrap());
static PUNCT_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+([,.!?;:])").unwrap());

// ─────────────────────────────────────────────
// Strategy & settings
// ─────────────────────────────────────────────

/// How text gets generated, chosen once at construction from credential presence.
#[derive(Clone)]
pub enum GenerationStrategy {
    ExternalProvider(Arc<dyn GenerationProvider>),
    DeterministicComposer,
}

impl std::fmt::Debug for GenerationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExternalProvider(p) => write!(f, "ExternalProvider({})", p.display_name()),
            Self::DeterministicComposer => f.write_str("DeterministicComposer"),
        }
    }
}

/// Sampling settings per task.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub brief_temperature: f64,
    pub content_temperature: f64,
    pub ideas_temperature: f64,
    pub max_tokens: u32,
    /// Hard ceiling on each provider call.
    pub timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            brief_temperature: 0.7,
            content_temperature: 0.6,
            ideas_temperature: 0.8,
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            content_temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
            timeout: Duration::from_secs(config.generation.timeout_secs.max(1)),
            ..Self::default()
        }
    }
}

/// Brief plus the content for every requested channel.
#[derive(Clone, Debug)]
pub struct CampaignContent {
    pub brief: Brief,
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BriefFields {
    problem: String,
    key_message: String,
    #[serde(alias = "cta")]
    call_to_action: String,
}

// ─────────────────────────────────────────────
// ContentEngine
// ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ContentEngine {
    strategy: GenerationStrategy,
    settings: EngineSettings,
    composer: DeterministicComposer,
}

impl ContentEngine {
    pub fn new(strategy: GenerationStrategy, settings: EngineSettings) -> Self {
        Self {
            strategy,
            settings,
            composer: DeterministicComposer,
        }
    }

    /// Engine that never calls out.
    pub fn composer_only() -> Self {
        Self::new(GenerationStrategy::DeterministicComposer, EngineSettings::default())
    }

    /// Provider when a credential is configured, composer otherwise.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let strategy = match create_provider(&config.generation)? {
            Some(provider) => {
                info!(
                    provider = provider.display_name(),
                    model = provider.model(),
                    "Content engine using external provider"
                );
                GenerationStrategy::ExternalProvider(Arc::new(provider))
            }
            None => {
                info!("Content engine using deterministic composer");
                GenerationStrategy::DeterministicComposer
            }
        };
        Ok(Self::new(strategy, EngineSettings::from_config(config)))
    }

    pub fn strategy(&self) -> &GenerationStrategy {
        &self.strategy
    }

    pub(crate) fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ────────────── Brief ──────────────

    /// Build a brief. Facts always come from the campaign; the provider only
    /// contributes problem, key message and call to action.
    pub async fn generate_brief(&self, campaign: &Campaign) -> Brief {
        let fallback = self.composer.brief(campaign);
        let GenerationStrategy::ExternalProvider(provider) = &self.strategy else {
            return fallback;
        };

        let request = GenerationRequest::new(brief_prompt(campaign))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.settings.brief_temperature)
            .with_max_tokens(self.settings.max_tokens);

        let fields = match self.call_provider(provider.as_ref(), &request).await {
            Ok(text) => parse_brief_fields(&text),
            Err(e) => {
                warn!(campaign = %campaign.id, error = %e, "Brief falling back to composer");
                return fallback;
            }
        };

        match fields {
            Some(fields) => {
                debug!(campaign = %campaign.id, "Brief generated by provider");
                Brief {
                    problem: fields.problem,
                    key_message: fields.key_message,
                    call_to_action: fields.call_to_action,
                    source: GenerationSource::Provider,
                    ..fallback
                }
            }
            None => {
                warn!(campaign = %campaign.id, "Provider brief was not valid JSON, using composer");
                fallback
            }
        }
    }

    // ────────────── Content ──────────────

    /// Generate copy for one channel. Always returns shaped content.
    pub async fn generate_content(
        &self,
        campaign: &Campaign,
        channel: Channel,
        tone: Tone,
        brief: Option<&Brief>,
    ) -> Content {
        if let GenerationStrategy::ExternalProvider(provider) = &self.strategy {
            let request = GenerationRequest::new(content_prompt(campaign, channel, tone, brief))
                .with_system(SYSTEM_PROMPT)
                .with_temperature(self.settings.content_temperature)
                .with_max_tokens(self.settings.max_tokens);

            match self.call_provider(provider.as_ref(), &request).await {
                Ok(text) => {
                    let text = post_process(campaign, channel, tone, &text);
                    if !text.trim().is_empty() {
                        return self.finish(channel, tone, &text, GenerationSource::Provider);
                    }
                    warn!(channel = %channel, "Provider copy empty after clean-up, using composer");
                }
                Err(e) => {
                    warn!(channel = %channel, tone = %tone, error = %e, "Content falling back to composer");
                }
            }
        }

        let text = self.composer.content_text(campaign, channel, tone);
        self.finish(channel, tone, &text, GenerationSource::Composer)
    }

    /// Brief first, then every channel concurrently.
    pub async fn generate_campaign(
        &self,
        campaign: &Campaign,
        channels: &[Channel],
        tone: Tone,
    ) -> CampaignContent {
        let brief = self.generate_brief(campaign).await;

        let jobs = channels
            .iter()
            .map(|&channel| self.generate_content(campaign, channel, tone, Some(&brief)));
        let contents = join_all(jobs).await;

        info!(
            campaign = %campaign.id,
            channels = contents.len(),
            "Campaign content generated"
        );
        CampaignContent { brief, contents }
    }

    /// Run one provider call under the engine's hard timeout.
    pub(crate) async fn call_provider(
        &self,
        provider: &dyn GenerationProvider,
        request: &GenerationRequest,
    ) -> Result<String, PipelineError> {
        let outcome = tokio::time::timeout(self.settings.timeout, provider.generate(request)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };
        result.map_err(|e| {
            debug!(provider = provider.display_name(), error = %e, "Provider call failed");
            PipelineError::ProviderUnavailable(e.to_string())
        })
    }

    fn finish(&self, channel: Channel, tone: Tone, text: &str, source: GenerationSource) -> Content {
        let shaped = validate_and_shape(channel, text);
        let mut content = Content::parse(channel, tone, &shaped.text, source);
        content.truncated = shaped.truncated;
        info!(
            channel = %channel,
            tone = %tone,
            source = ?source,
            truncated = content.truncated,
            "Content generated"
        );
        content
    }
}

// ─────────────────────────────────────────────
// Provider output clean-up
// ─────────────────────────────────────────────

/// Extract the three interpretive brief fields from a JSON reply.
fn parse_brief_fields(text: &str) -> Option<BriefFields> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let fields: BriefFields = serde_json::from_str(&text[start..=end]).ok()?;
    let complete = [&fields.problem, &fields.key_message, &fields.call_to_action]
        .iter()
        .all(|f| !f.trim().is_empty());
    complete.then_some(fields)
}

/// Strip placeholder tags, restore the landing link and force channel style.
fn post_process(campaign: &Campaign, channel: Channel, tone: Tone, raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = BRACKET_TAG_RE.replace_all(&text, " ");
    let text = PUNCT_GAP_RE.replace_all(&text, "$1");
    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    let link = campaign.landing_link();

    match channel {
        Channel::Sms => {
            let core = match link {
                Some(link) => text.replace(link, " "),
                None => text,
            };
            let core = core.split_whitespace().collect::<Vec<_>>().join(" ");
            if core.is_empty() {
                return String::new();
            }
            let max = Channel::Sms.spec().max_chars.unwrap_or(160);
            compose_sms(&core, tone, link, max)
        }
        Channel::Email => match link {
            Some(link) if !text.contains(link) => {
                format!("{text}\n\n{}: {link}", tone.profile().cta)
            }
            _ => text,
        },
        Channel::Ads => match link {
            Some(link) if !text.contains(link) => format!("{text}\nURL: {link}"),
            _ => text,
        },
        Channel::Social => match link {
            Some(link) if !text.contains(link) => insert_before_hashtags(&text, link),
            _ => text,
        },
    }
}

/// Put `line` just above a trailing hashtag line, or at the end.
fn insert_before_hashtags(text: &str, line: &str) -> String {
    match text.rsplit_once('\n') {
        Some((head, last)) if last.split_whitespace().all(|t| t.starts_with('#')) => {
            format!("{head}\n{line}\n{last}")
        }
        _ => format!("{text}\n{line}"),
    }
}
