//! `camp brief`, `camp generate`, `camp ideas`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use camp_core::config::{self, Config};
use camp_core::{Channel, Tone};
use camp_engine::{CampaignContent, ContentEngine, IdeaGenerator};

use crate::helpers::{expand_tilde, load_campaign, print_content, print_header, select_channels};

pub(crate) fn engine(config: &Config) -> Result<ContentEngine> {
    ContentEngine::from_config(config).context("failed to set up the generation provider")
}

pub async fn brief(campaign_path: &Path, json: bool) -> Result<()> {
    let config = config::load_config(None);
    let campaign = load_campaign(campaign_path)?;
    let brief = engine(&config)?.generate_brief(&campaign).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&brief)?);
    } else {
        print_header(&format!("Brief · {}", campaign.name));
        println!("{}", brief.render());
    }
    Ok(())
}

pub async fn generate(
    campaign_path: &Path,
    channels: &[Channel],
    tone: Option<Tone>,
    out: Option<&Path>,
) -> Result<()> {
    let config = config::load_config(None);
    let campaign = load_campaign(campaign_path)?;
    let tone = tone.unwrap_or(config.defaults.tone);
    let channels = select_channels(channels, &campaign);

    let result = engine(&config)?
        .generate_campaign(&campaign, &channels, tone)
        .await;

    print_header(&format!("{} · {}", campaign.name, tone));
    println!("{}", result.brief.render());
    println!();
    for content in &result.contents {
        print_content(content);
    }

    if let Some(dir) = out {
        let dir = expand_tilde(dir);
        write_outputs(&dir, &result)?;
        println!("  {} wrote copy to {}", "✓".green(), dir.display());
    }
    Ok(())
}

/// `brief.txt` plus one `<channel>.txt` per generated channel.
fn write_outputs(dir: &Path, result: &CampaignContent) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    std::fs::write(dir.join("brief.txt"), result.brief.render())?;
    for content in &result.contents {
        let file = dir.join(format!("{}.txt", content.channel));
        std::fs::write(&file, content.render())
            .with_context(|| format!("failed to write {}", file.display()))?;
    }
    Ok(())
}

pub async fn ideas(
    campaign_path: &Path,
    channel: Channel,
    tone: Option<Tone>,
    count: Option<usize>,
) -> Result<()> {
    let config = config::load_config(None);
    let campaign = load_campaign(campaign_path)?;
    let tone = tone.unwrap_or(config.defaults.tone);
    let count = count.unwrap_or(config.defaults.idea_count);

    let generator = IdeaGenerator::from_config(&config)
        .context("failed to set up the generation provider")?;
    let ideas = generator.suggest_ideas(&campaign, channel, tone, count).await;

    print_header(&format!("Ideas · {} · {}", channel.label(), tone));
    for (i, idea) in ideas.iter().enumerate() {
        println!("  {}. {}", i + 1, idea.text);
    }
    println!();
    Ok(())
}
