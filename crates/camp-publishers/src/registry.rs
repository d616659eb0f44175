//! Publisher registry — routes each channel to one adapter.
//!
//! Routing is a pure function of (mode, channel, channel toggle, social
//! platform). `PublisherRegistry::from_config` builds the whole table up
//! front and fails if any enabled channel's adapter lacks credentials.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use camp_core::config::{ChannelToggle, ChannelsConfig, Config, PublishMode, SocialPlatform};
use camp_core::{
    Campaign, Channel, Content, PublishExtras, PublishResult, PublisherConfigError, Recipient,
};
use camp_tokens::TokenStore;

use crate::base::{Publisher, PublisherKind};
use crate::local::LocalFilePublisher;
use crate::planned::{LinkedInPublisher, MetaPublisher, TwilioSmsPublisher};
use crate::sendgrid::SendGridEmailPublisher;

/// Adapter for `channel`, or `None` when the channel is disabled.
pub fn resolve(
    mode: PublishMode,
    channel: Channel,
    toggle: ChannelToggle,
    platform: SocialPlatform,
) -> Option<PublisherKind> {
    if !toggle.enabled {
        return None;
    }
    if mode == PublishMode::Local || !toggle.live {
        return Some(PublisherKind::Local);
    }
    Some(match channel {
        Channel::Email => PublisherKind::SendGridEmail,
        Channel::Sms => PublisherKind::TwilioSms,
        Channel::Social => match platform {
            SocialPlatform::Meta => PublisherKind::MetaSocial,
            SocialPlatform::LinkedIn => PublisherKind::LinkedInSocial,
        },
        Channel::Ads => PublisherKind::Local,
    })
}

fn missing(channel: Channel, adapter: PublisherKind, fields: &[(&str, &str)]) -> Result<(), PublisherConfigError> {
    let absent: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if absent.is_empty() {
        Ok(())
    } else {
        Err(PublisherConfigError::MissingCredentials {
            channel,
            adapter: adapter.as_str(),
            missing: absent.join(", "),
        })
    }
}

pub struct PublisherRegistry {
    channels: ChannelsConfig,
    routes: BTreeMap<Channel, Arc<dyn Publisher>>,
}

impl std::fmt::Debug for PublisherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.routes.iter().map(|(c, p)| (c, p.name())))
            .finish()
    }
}

impl PublisherRegistry {
    /// Build and validate every route. Errors name the channel and adapter.
    pub fn from_config(
        config: &Config,
        tokens: Option<Arc<dyn TokenStore>>,
    ) -> Result<Self, PublisherConfigError> {
        let publish = &config.publish;
        let local: Arc<dyn Publisher> =
            Arc::new(LocalFilePublisher::from_config_dir(&publish.output_dir));
        let mut sendgrid: Option<Arc<dyn Publisher>> = None;
        let mut routes: BTreeMap<Channel, Arc<dyn Publisher>> = BTreeMap::new();

        for channel in Channel::ALL {
            let toggle = config.channels.get(channel);
            let Some(kind) = resolve(publish.mode, channel, toggle, config.channels.social_platform)
            else {
                continue;
            };

            let publisher: Arc<dyn Publisher> = match kind {
                PublisherKind::Local => local.clone(),
                PublisherKind::SendGridEmail => {
                    let sg = &publish.sendgrid;
                    missing(
                        channel,
                        kind,
                        &[
                            ("publish.sendgrid.apiKey", sg.api_key.as_str()),
                            ("publish.sendgrid.fromEmail", sg.from_email.as_str()),
                        ],
                    )?;
                    if Recipient::email(&sg.from_email).is_err() {
                        return Err(PublisherConfigError::InvalidSender(sg.from_email.trim().to_string()));
                    }
                    match &sendgrid {
                        Some(p) => p.clone(),
                        None => {
                            let p: Arc<dyn Publisher> = Arc::new(SendGridEmailPublisher::new(sg.clone())?);
                            sendgrid = Some(p.clone());
                            p
                        }
                    }
                }
                PublisherKind::TwilioSms => {
                    let tw = &publish.twilio;
                    missing(
                        channel,
                        kind,
                        &[
                            ("publish.twilio.accountSid", tw.account_sid.as_str()),
                            ("publish.twilio.authToken", tw.auth_token.as_str()),
                            ("publish.twilio.fromNumber", tw.from_number.as_str()),
                        ],
                    )?;
                    Arc::new(TwilioSmsPublisher::new(tw))
                }
                PublisherKind::MetaSocial => {
                    let page_id = &publish.meta.page_id;
                    missing(channel, kind, &[("publish.meta.pageId", page_id.as_str())])?;
                    let tokens = tokens.clone().ok_or(PublisherConfigError::TokenStoreMissing {
                        adapter: kind.as_str(),
                    })?;
                    Arc::new(MetaPublisher::new(page_id.trim(), tokens))
                }
                PublisherKind::LinkedInSocial => {
                    let org = &publish.linkedin.organization_id;
                    missing(channel, kind, &[("publish.linkedin.organizationId", org.as_str())])?;
                    let tokens = tokens.clone().ok_or(PublisherConfigError::TokenStoreMissing {
                        adapter: kind.as_str(),
                    })?;
                    Arc::new(LinkedInPublisher::new(org.trim(), tokens))
                }
            };
            routes.insert(channel, publisher);
        }

        info!(
            mode = %publish.mode,
            routes = ?routes.iter().map(|(c, p)| format!("{c}->{}", p.name())).collect::<Vec<_>>(),
            "Publisher registry ready"
        );
        Ok(Self {
            channels: config.channels.clone(),
            routes,
        })
    }

    /// Registry with explicit routes; channels without a route count as disabled.
    pub fn with_routes(routes: impl IntoIterator<Item = (Channel, Arc<dyn Publisher>)>) -> Self {
        let routes: BTreeMap<_, _> = routes.into_iter().collect();
        let mut channels = ChannelsConfig::default();
        for channel in Channel::ALL {
            channels.get_mut(channel).enabled = routes.contains_key(&channel);
        }
        Self { channels, routes }
    }

    /// The adapter kind serving `channel`, if enabled.
    pub fn route(&self, channel: Channel) -> Option<PublisherKind> {
        self.routes.get(&channel).map(|p| p.kind())
    }

    /// Publish every piece of content whose channel is enabled, concurrently.
    ///
    /// Email and SMS receive the recipients they can address; a channel with
    /// none gets `None` so the adapter's defaults apply. Social and ads go to
    /// an audience and never receive the list.
    pub async fn publish_campaign(
        &self,
        campaign: &Campaign,
        contents: &[Content],
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> Vec<(Channel, PublishResult)> {
        let jobs = contents
            .iter()
            .filter(|content| {
                let enabled = self.route(content.channel).is_some()
                    && self.channels.get(content.channel).enabled;
                if !enabled {
                    debug!(channel = %content.channel, "Skipping disabled channel");
                }
                enabled
            })
            .map(|content| async move {
                let channel = content.channel;
                let fitting: Vec<Recipient> = match channel {
                    Channel::Email | Channel::Sms => recipients
                        .unwrap_or_default()
                        .iter()
                        .filter(|r| r.fits(channel))
                        .cloned()
                        .collect(),
                    Channel::Social | Channel::Ads => Vec::new(),
                };
                let to = (!fitting.is_empty()).then_some(fitting.as_slice());
                let result = self.publish(campaign, channel, content, to, extras).await;
                (channel, result)
            });
        let results = join_all(jobs).await;

        info!(
            campaign = %campaign.id,
            channels = results.len(),
            failed = results.iter().filter(|(_, r)| !r.is_success()).count(),
            "Campaign published"
        );
        results
    }

    pub async fn publish(
        &self,
        campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> PublishResult {
        let publisher = match self.routes.get(&channel) {
            Some(p) if self.channels.get(channel).enabled => p,
            _ => {
                warn!(channel = %channel, "Publish to disabled channel");
                return PublishResult::failed(format!("{channel} publishing is disabled"));
            }
        };
        if content.channel != channel {
            return PublishResult::failed(format!(
                "content was shaped for {}, not {channel}",
                content.channel
            ));
        }

        let result = publisher
            .publish(campaign, channel, content, recipients, extras)
            .await;
        info!(
            channel = %channel,
            publisher = publisher.name(),
            status = %result.status,
            "Published"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camp_core::{GenerationSource, PublishStatus, Tone};
    use camp_tokens::EncryptedTokenStore;
    use tempfile::TempDir;

    fn toggle(enabled: bool, live: bool) -> ChannelToggle {
        ChannelToggle { enabled, live }
    }

    fn local_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.publish.output_dir = dir.path().display().to_string();
        config
    }

    #[test]
    fn test_resolve_table() {
        use PublishMode::{Live, Local};
        let meta = SocialPlatform::Meta;

        assert_eq!(resolve(Local, Channel::Email, toggle(true, true), meta), Some(PublisherKind::Local));
        assert_eq!(resolve(Live, Channel::Email, toggle(true, true), meta), Some(PublisherKind::SendGridEmail));
        assert_eq!(resolve(Live, Channel::Email, toggle(true, false), meta), Some(PublisherKind::Local));
        assert_eq!(resolve(Live, Channel::Sms, toggle(true, true), meta), Some(PublisherKind::TwilioSms));
        assert_eq!(resolve(Live, Channel::Social, toggle(true, true), meta), Some(PublisherKind::MetaSocial));
        assert_eq!(
            resolve(Live, Channel::Social, toggle(true, true), SocialPlatform::LinkedIn),
            Some(PublisherKind::LinkedInSocial)
        );
        assert_eq!(resolve(Live, Channel::Ads, toggle(true, true), meta), Some(PublisherKind::Local));
        assert_eq!(resolve(Live, Channel::Email, toggle(false, true), meta), None);
    }

    #[test]
    fn test_local_mode_routes_everything_locally() {
        let dir = TempDir::new().unwrap();
        let registry = PublisherRegistry::from_config(&local_config(&dir), None).unwrap();
        for channel in Channel::ALL {
            assert_eq!(registry.route(channel), Some(PublisherKind::Local));
        }
    }

    #[test]
    fn test_live_email_without_credentials_fails_fast() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.publish.mode = PublishMode::Live;

        let err = PublisherRegistry::from_config(&config, None).unwrap_err();
        assert_eq!(
            err,
            PublisherConfigError::MissingCredentials {
                channel: Channel::Email,
                adapter: "sendgrid-email",
                missing: "publish.sendgrid.apiKey, publish.sendgrid.fromEmail".into(),
            }
        );
    }

    #[test]
    fn test_live_email_invalid_sender() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.publish.mode = PublishMode::Live;
        config.publish.sendgrid.api_key = "SG.x".into();
        config.publish.sendgrid.from_email = "shop".into();

        let err = PublisherRegistry::from_config(&config, None).unwrap_err();
        assert_eq!(err, PublisherConfigError::InvalidSender("shop".into()));
    }

    #[test]
    fn test_live_social_needs_token_store() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.publish.mode = PublishMode::Live;
        config.channels.email.live = false;
        config.channels.social.live = true;
        config.publish.meta.page_id = "page-1".into();

        let err = PublisherRegistry::from_config(&config, None).unwrap_err();
        assert!(matches!(err, PublisherConfigError::TokenStoreMissing { adapter: "meta-social" }));

        let store: Arc<dyn TokenStore> =
            Arc::new(EncryptedTokenStore::in_memory(&EncryptedTokenStore::generate_key()).unwrap());
        let registry = PublisherRegistry::from_config(&config, Some(store)).unwrap();
        assert_eq!(registry.route(Channel::Social), Some(PublisherKind::MetaSocial));
        assert_eq!(registry.route(Channel::Email), Some(PublisherKind::Local));
    }

    #[test]
    fn test_disabled_channel_needs_no_credentials() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.publish.mode = PublishMode::Live;
        config.channels.email.enabled = false;
        config.channels.sms = toggle(false, true);

        let registry = PublisherRegistry::from_config(&config, None).unwrap();
        assert_eq!(registry.route(Channel::Email), None);
        assert_eq!(registry.route(Channel::Ads), Some(PublisherKind::Local));
    }

    #[tokio::test]
    async fn test_local_social_publish_delivered() {
        let dir = TempDir::new().unwrap();
        let registry = PublisherRegistry::from_config(&local_config(&dir), None).unwrap();
        let content = Content::parse(
            Channel::Social,
            Tone::Friendly,
            "Fresh bread 🙂\n#CornerBakery",
            GenerationSource::Composer,
        );
        let campaign = Campaign {
            id: "c-1".into(),
            name: "Spring Sale".into(),
            ..Campaign::default()
        };

        let result = registry
            .publish(&campaign, Channel::Social, &content, None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Delivered);
        assert!(dir.path().join("social").is_dir());
    }

    #[tokio::test]
    async fn test_disabled_channel_publish_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.channels.ads.enabled = false;
        let registry = PublisherRegistry::from_config(&config, None).unwrap();
        let content = Content::parse(Channel::Ads, Tone::Sharp, "Headline: Go", GenerationSource::Composer);

        let result = registry
            .publish(&Campaign::default(), Channel::Ads, &content, None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Failed);
        assert_eq!(result.message, "ads publishing is disabled");
    }

    #[tokio::test]
    async fn test_explicit_routes() {
        let dir = TempDir::new().unwrap();
        let local: Arc<dyn Publisher> = Arc::new(LocalFilePublisher::new(dir.path()));
        let registry = PublisherRegistry::with_routes([(Channel::Email, local)]);
        assert_eq!(registry.route(Channel::Email), Some(PublisherKind::Local));
        assert_eq!(registry.route(Channel::Sms), None);

        let content = Content::parse(Channel::Sms, Tone::Sharp, "Go now", GenerationSource::Composer);
        let result = registry
            .publish(&Campaign::default(), Channel::Sms, &content, None, None)
            .await;
        assert_eq!(result.message, "sms publishing is disabled");
    }

    #[tokio::test]
    async fn test_publish_campaign_local_mode() {
        let dir = TempDir::new().unwrap();
        let mut config = local_config(&dir);
        config.channels.ads.enabled = false;
        let registry = PublisherRegistry::from_config(&config, None).unwrap();

        let campaign = Campaign {
            id: "spring".into(),
            name: "Spring Sale".into(),
            ..Campaign::default()
        };
        let contents = vec![
            Content::parse(Channel::Email, Tone::Friendly, "Subject: Hi\n\nHello", GenerationSource::Composer),
            Content::parse(Channel::Sms, Tone::Sharp, "Sale today.", GenerationSource::Composer),
            Content::parse(Channel::Social, Tone::Friendly, "Fresh bread\n#CornerBakery", GenerationSource::Composer),
            Content::parse(Channel::Ads, Tone::Sharp, "Headline: Go", GenerationSource::Composer),
        ];
        let recipients = vec![
            Recipient::email("fan@example.com").unwrap(),
            Recipient::phone("+15551234567").unwrap(),
            Recipient::email("pal@example.com").unwrap(),
        ];

        let results = registry
            .publish_campaign(&campaign, &contents, Some(recipients.as_slice()), None)
            .await;

        let channels: Vec<Channel> = results.iter().map(|(c, _)| *c).collect();
        assert_eq!(channels, vec![Channel::Email, Channel::Sms, Channel::Social]);
        assert!(results.iter().all(|(_, r)| r.status == PublishStatus::Delivered));
        assert_eq!(results[0].1.recipients_count, 2);
        assert_eq!(results[1].1.recipients_count, 1);
        assert_eq!(results[2].1.recipients_count, 0);
        assert!(dir.path().join("sms").is_dir());
        assert!(!dir.path().join("ads").exists());
    }

    #[tokio::test]
    async fn test_mismatched_content_channel_fails() {
        let dir = TempDir::new().unwrap();
        let registry = PublisherRegistry::from_config(&local_config(&dir), None).unwrap();
        let content = Content::parse(Channel::Sms, Tone::Sharp, "Go now", GenerationSource::Composer);

        let result = registry
            .publish(&Campaign::default(), Channel::Email, &content, None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Failed);
    }
}
