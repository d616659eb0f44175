//! `camp publish` (one channel or `--all`) and `camp check-email`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::info;

use camp_core::config::{self, Config};
use camp_core::{
    parse_recipient_list, validate_and_shape, Campaign, Channel, Content, GenerationSource,
    PublishExtras, PublishResult, Recipient, Tone,
};
use camp_publishers::{PublisherRegistry, SendGridEmailPublisher};
use camp_tokens::{EncryptedTokenStore, TokenStore};

use crate::campaign_cmd::engine;
use crate::helpers::{
    check_mark, expand_tilde, load_campaign, print_content, print_header, print_publish_result,
    select_channels,
};

pub struct PublishArgs {
    pub campaign: PathBuf,
    /// `None` publishes every enabled channel.
    pub channel: Option<Channel>,
    pub tone: Option<Tone>,
    pub recipients: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub subject: Option<String>,
}

pub async fn run(args: PublishArgs) -> Result<()> {
    let config = config::load_config(None);
    let campaign = load_campaign(&args.campaign)?;
    let tone = args.tone.unwrap_or(config.defaults.tone);

    let tokens = open_token_store(&config).await?;
    let registry = PublisherRegistry::from_config(&config, tokens)
        .context("publisher configuration is invalid")?;

    let recipients = match &args.recipients {
        Some(path) => Some(read_recipients(path, args.channel)?),
        None => None,
    };

    let extras = args.subject.map(|subject| PublishExtras {
        subject: Some(subject),
        ..PublishExtras::default()
    });

    let Some(channel) = args.channel else {
        return publish_all(&config, &registry, &campaign, tone, recipients.as_deref(), extras.as_ref()).await;
    };

    let content = match &args.content {
        Some(path) => read_content(path, channel, tone)?,
        None => generate(&config, &campaign, channel, tone).await?,
    };

    print_header(&format!("Publish · {} · {}", campaign.name, channel.label()));
    print_content(&content);

    let result = registry
        .publish(
            &campaign,
            channel,
            &content,
            recipients.as_deref(),
            extras.as_ref(),
        )
        .await;
    print_publish_result(channel, &result);

    if !result.is_success() {
        bail!("publish failed: {}", result.message);
    }
    info!(channel = %channel, status = %result.status, "Publish finished");
    Ok(())
}

/// Generate copy for every campaign channel the registry has a route for,
/// publish it all and print one summary line per channel.
async fn publish_all(
    config: &Config,
    registry: &PublisherRegistry,
    campaign: &Campaign,
    tone: Tone,
    recipients: Option<&[Recipient]>,
    extras: Option<&PublishExtras>,
) -> Result<()> {
    let channels = enabled_channels(registry, campaign);
    if channels.is_empty() {
        bail!("no enabled channels to publish for {}", campaign.name);
    }

    let generated = engine(config)?
        .generate_campaign(campaign, &channels, tone)
        .await;
    let results = registry
        .publish_campaign(campaign, &generated.contents, recipients, extras)
        .await;

    print_header(&format!("Publish · {} · all channels", campaign.name));
    for line in summary_lines(&results) {
        println!("{line}");
    }
    println!();

    let failed: Vec<String> = results
        .iter()
        .filter(|(_, r)| !r.is_success())
        .map(|(c, _)| c.to_string())
        .collect();
    if !failed.is_empty() {
        bail!("publish failed for {}", failed.join(", "));
    }
    info!(channels = results.len(), "Publish finished");
    Ok(())
}

fn enabled_channels(registry: &PublisherRegistry, campaign: &Campaign) -> Vec<Channel> {
    select_channels(&[], campaign)
        .into_iter()
        .filter(|c| registry.route(*c).is_some())
        .collect()
}

/// `OK`/`FAIL` per channel, then the total recipient count.
fn summary_lines(results: &[(Channel, PublishResult)]) -> Vec<String> {
    let mut lines: Vec<String> = results
        .iter()
        .map(|(channel, result)| {
            let tag = if result.is_success() {
                "OK".green().bold()
            } else {
                "FAIL".red().bold()
            };
            format!("  {:<6} {:<20} {}", tag, channel.label(), result.message)
        })
        .collect();
    let total: usize = results.iter().map(|(_, r)| r.recipients_count).sum();
    lines.push(format!("  {:<27} {}", "Recipients:".bold(), total));
    lines
}

pub async fn check_email() -> Result<()> {
    let config = config::load_config(None);
    let publisher = SendGridEmailPublisher::new(config.publish.sendgrid.clone())
        .context("SendGrid is not configured")?;

    let check = publisher.check().await;
    println!("  {} {}", check_mark(check.ok), check.detail);
    if !check.ok {
        bail!("SendGrid credential check failed");
    }
    Ok(())
}

async fn open_token_store(config: &Config) -> Result<Option<Arc<dyn TokenStore>>> {
    let store = EncryptedTokenStore::from_config(&config.tokens)
        .await
        .context("failed to open the integration token store")?;
    Ok(store.map(|s| Arc::new(s) as Arc<dyn TokenStore>))
}

async fn generate(config: &Config, campaign: &Campaign, channel: Channel, tone: Tone) -> Result<Content> {
    let engine = engine(config)?;
    let brief = engine.generate_brief(campaign).await;
    Ok(engine
        .generate_content(campaign, channel, tone, Some(&brief))
        .await)
}

/// User-written copy still goes through channel shaping.
fn read_content(path: &std::path::Path, channel: Channel, tone: Tone) -> Result<Content> {
    let path = expand_tilde(path);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read content file {}", path.display()))?;
    if raw.trim().is_empty() {
        bail!("content file {} is empty", path.display());
    }
    Ok(shape_content(&raw, channel, tone))
}

fn shape_content(raw: &str, channel: Channel, tone: Tone) -> Content {
    let shaped = validate_and_shape(channel, raw);
    let mut content = Content::parse(channel, tone, &shaped.text, GenerationSource::Composer);
    content.truncated = shaped.truncated;
    content
}

fn read_recipients(path: &std::path::Path, channel: Option<Channel>) -> Result<Vec<Recipient>> {
    let path = expand_tilde(path);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read recipient file {}", path.display()))?;
    select_recipients(&raw, channel)
}

/// Parse a recipient list, warning about malformed entries. With a single
/// channel every entry must fit it; a mixed list is split per channel later.
fn select_recipients(raw: &str, channel: Option<Channel>) -> Result<Vec<Recipient>> {
    let list = parse_recipient_list(raw);
    for (entry, reason) in &list.rejected {
        eprintln!("  {} skipped '{}': {}", "!".yellow(), entry, reason);
    }
    match channel {
        Some(channel) => list.ensure_fits(channel)?,
        None if list.is_empty() => bail!("recipient file has no valid entries"),
        None => {}
    }
    Ok(list.accepted)
}
