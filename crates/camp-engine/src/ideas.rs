//! Idea generator — short hooks and angles for a channel.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use camp_core::config::Config;
use camp_core::{Campaign, Channel, GenerationSource, Idea, Tone};
use camp_providers::{GenerationRequest, ProviderError};

use crate::composer::DeterministicComposer;
use crate::engine::{ContentEngine, GenerationStrategy};
use crate::prompts::{ideas_prompt, SYSTEM_PROMPT};

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:[-•*]|\d+[.)])\s*").unwrap());
static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

const MIN_IDEA_WORDS: usize = 3;

/// Suggests reusable content fragments, sharing the engine's strategy.
#[derive(Clone, Debug)]
pub struct IdeaGenerator {
    engine: ContentEngine,
    /// Used when the campaign has no landing link.
    fallback_link: Option<String>,
}

impl IdeaGenerator {
    pub fn new(engine: ContentEngine, fallback_link: Option<String>) -> Self {
        let fallback_link = fallback_link.filter(|l| !l.trim().is_empty());
        Self {
            engine,
            fallback_link,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let engine = ContentEngine::from_config(config)?;
        Ok(Self::new(engine, Some(config.defaults.business_url.clone())))
    }

    /// Between 1 and `count` ideas; `count == 0` is treated as 1.
    pub async fn suggest_ideas(
        &self,
        campaign: &Campaign,
        channel: Channel,
        tone: Tone,
        count: usize,
    ) -> Vec<Idea> {
        let count = count.max(1);
        let link = campaign.landing_link().or(self.fallback_link.as_deref());

        let mut ideas: Vec<Idea> = Vec::with_capacity(count);
        if let GenerationStrategy::ExternalProvider(provider) = self.engine.strategy() {
            let settings = self.engine.settings();
            let request = GenerationRequest::new(ideas_prompt(campaign, channel, tone, count, link))
                .with_system(SYSTEM_PROMPT)
                .with_temperature(settings.ideas_temperature)
                .with_max_tokens(settings.max_tokens);

            match self.engine.call_provider(provider.as_ref(), &request).await {
                Ok(text) => {
                    ideas.extend(split_ideas(&text, count).into_iter().map(|text| Idea {
                        channel,
                        tone,
                        text,
                        source: GenerationSource::Provider,
                    }));
                    debug!(channel = %channel, parsed = ideas.len(), "Provider ideas parsed");
                }
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Ideas falling back to composer");
                }
            }
        }

        if ideas.len() < count {
            let canned = DeterministicComposer.ideas(campaign, channel, tone, link);
            let missing = count - ideas.len();
            ideas.extend(canned.into_iter().take(missing).map(|text| Idea {
                channel,
                tone,
                text,
                source: GenerationSource::Composer,
            }));
        }

        info!(channel = %channel, tone = %tone, count = ideas.len(), "Ideas suggested");
        ideas
    }
}

/// Split provider output into at most `count` clean ideas.
fn split_ideas(text: &str, count: usize) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace(['[', ']'], "");
    let mut parts: Vec<String> = BLANK_LINE_RE
        .split(text.trim())
        .map(str::to_string)
        .collect();
    if parts.len() < count {
        parts = text.lines().map(str::to_string).collect();
    }

    parts
        .iter()
        .filter_map(|part| clean_idea(part))
        .take(count)
        .collect()
}

fn clean_idea(part: &str) -> Option<String> {
    let lines: Vec<String> = part
        .lines()
        .map(|l| BULLET_RE.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    let idea = lines.join("\n");
    if idea.split_whitespace().count() < MIN_IDEA_WORDS {
        return None;
    }
    let ends_with_url = idea
        .split_whitespace()
        .last()
        .is_some_and(|t| t.starts_with("http://") || t.starts_with("https://") || t.starts_with("www."));
    if ends_with_url || idea.ends_with(['.', '!', '?', '…']) {
        Some(idea)
    } else {
        Some(format!("{idea}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;
    use async_trait::async_trait;
    use camp_providers::GenerationProvider;
    use std::sync::Arc;

    struct FixedProvider(Result<String, ()>);

    #[async_trait]
    impl GenerationProvider for FixedProvider {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            self.0.clone().map_err(|_| ProviderError::RateLimited)
        }

        fn model(&self) -> &str {
            "fixed"
        }

        fn display_name(&self) -> &str {
            "FixedProvider"
        }
    }

    fn generator(reply: Result<&str, ()>) -> IdeaGenerator {
        let provider = FixedProvider(reply.map(str::to_string));
        let engine = ContentEngine::new(
            GenerationStrategy::ExternalProvider(Arc::new(provider)),
            EngineSettings::default(),
        );
        IdeaGenerator::new(engine, Some("https://biz.example".into()))
    }

    fn campaign() -> Campaign {
        Campaign {
            name: "Spring Sale".into(),
            objective: "drive weekend purchases".into(),
            ..Campaign::default()
        }
    }

    #[test]
    fn test_split_ideas_strips_bullets_and_brackets() {
        let raw = "1. [Hook] Fresh bread every morning\n\n- Weekend bundles for busy families!\n\n* ok\n\n2) Free coffee with every loaf\nhttps://biz.example";
        let ideas = split_ideas(raw, 3);
        assert_eq!(
            ideas,
            vec![
                "Hook Fresh bread every morning.".to_string(),
                "Weekend bundles for busy families!".to_string(),
                "Free coffee with every loaf\nhttps://biz.example".to_string(),
            ]
        );
    }

    #[test]
    fn test_split_ideas_falls_back_to_lines() {
        let raw = "Fresh bread every morning\nWeekend bundles for families\nFree coffee with loaves";
        assert_eq!(split_ideas(raw, 3).len(), 3);
    }

    #[tokio::test]
    async fn test_zero_count_yields_one() {
        let ideas = IdeaGenerator::new(ContentEngine::composer_only(), None)
            .suggest_ideas(&campaign(), Channel::Sms, Tone::Friendly, 0)
            .await;
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].source, GenerationSource::Composer);
    }

    #[tokio::test]
    async fn test_composer_ideas_use_fallback_link() {
        let ideas = IdeaGenerator::new(ContentEngine::composer_only(), Some("https://biz.example".into()))
            .suggest_ideas(&campaign(), Channel::Social, Tone::Sharp, 3)
            .await;
        assert_eq!(ideas.len(), 3);
        assert!(ideas[0].text.contains("https://biz.example"));
        assert!(ideas.iter().all(|i| i.channel == Channel::Social && i.tone == Tone::Sharp));
    }

    #[tokio::test]
    async fn test_short_provider_reply_is_padded() {
        let ideas = generator(Ok("Fresh bread every single morning"))
            .suggest_ideas(&campaign(), Channel::Email, Tone::Professional, 3)
            .await;
        assert_eq!(ideas.len(), 3);
        assert_eq!(ideas[0].source, GenerationSource::Provider);
        assert_eq!(ideas[0].text, "Fresh bread every single morning.");
        assert_eq!(ideas[1].source, GenerationSource::Composer);
    }

    #[tokio::test]
    async fn test_provider_failure_uses_canned_ideas() {
        let ideas = generator(Err(()))
            .suggest_ideas(&campaign(), Channel::Ads, Tone::Formal, 2)
            .await;
        assert_eq!(ideas.len(), 2);
        assert!(ideas.iter().all(|i| i.source == GenerationSource::Composer));
    }

    #[tokio::test]
    async fn test_never_more_than_requested() {
        let reply = "One idea with words\n\nTwo idea with words\n\nThree idea with words\n\nFour idea with words";
        let ideas = generator(Ok(reply))
            .suggest_ideas(&campaign(), Channel::Sms, Tone::Humorous, 2)
            .await;
        assert_eq!(ideas.len(), 2);
    }
}
