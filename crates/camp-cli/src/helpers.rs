//! Shared CLI helpers — path expansion, campaign loading, result printing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use camp_core::utils::expand_home;
use camp_core::{Campaign, Channel, Content, GenerationSource, PublishResult, PublishStatus};

/// Expand a leading `~` in a command-line path; non-UTF-8 paths pass through.
pub fn expand_tilde(path: &Path) -> PathBuf {
    path.to_str()
        .map(expand_home)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Read a campaign JSON file. A missing id falls back to the file stem.
pub fn load_campaign(path: &Path) -> Result<Campaign> {
    let path = expand_tilde(path);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read campaign file {}", path.display()))?;
    let mut campaign: Campaign = serde_json::from_str(&raw)
        .with_context(|| format!("invalid campaign JSON in {}", path.display()))?;
    if campaign.id.trim().is_empty() {
        campaign.id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "campaign".to_string());
    }
    Ok(campaign)
}

/// Requested channels, else the campaign's own, else all of them.
pub fn select_channels(requested: &[Channel], campaign: &Campaign) -> Vec<Channel> {
    let mut channels = if !requested.is_empty() {
        requested.to_vec()
    } else if !campaign.channels.is_empty() {
        campaign.channels.clone()
    } else {
        Channel::ALL.to_vec()
    };
    channels.dedup();
    channels
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", format!("📣 {title}").cyan().bold());
    println!();
}

fn source_tag(source: GenerationSource) -> colored::ColoredString {
    match source {
        GenerationSource::Provider => "provider".green(),
        GenerationSource::Composer => "composer".yellow(),
    }
}

/// Print one channel's copy with a small header line.
pub fn print_content(content: &Content) {
    let mut header = format!("── {} · {} · {}", content.channel.label(), content.tone, source_tag(content.source));
    if content.truncated {
        header.push_str(&format!(" · {}", "truncated".dimmed()));
    }
    println!("{}", header.bold());
    println!("{}", content.render());
    println!();
}

pub fn print_publish_result(channel: Channel, result: &PublishResult) {
    let status = match result.status {
        PublishStatus::Delivered => "delivered".green().bold(),
        PublishStatus::Queued => "queued".cyan().bold(),
        PublishStatus::Failed => "failed".red().bold(),
    };
    println!("  {:<12} {}", "Channel:".bold(), channel.label());
    println!("  {:<12} {}", "Status:".bold(), status);
    println!("  {:<12} {}", "Message:".bold(), result.message);
    if let Some(id) = &result.provider_id {
        println!("  {:<12} {}", "Id:".bold(), id);
    }
    println!("  {:<12} {}", "Recipients:".bold(), result.recipients_count);
    println!("  {:<12} {}", "At:".bold(), result.timestamp.to_rfc3339().dimmed());
    println!();
}

pub fn check_mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
