//! `camp status` — show configuration, provider and publisher routing.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use camp_core::config::{get_config_path, load_config, Config};
use camp_core::utils::expand_home;
use camp_core::Channel;
use camp_providers::registry::{resolve_spec, PROVIDERS};
use camp_publishers::{resolve, PublisherRegistry};
use camp_tokens::{EncryptedTokenStore, TokenStore};

fn found(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

pub async fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "📣 Camp Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found(config_path.exists())
    );

    // Generation
    let generation = &config.generation;
    let engine = if generation.is_configured() {
        format!("{} (key set)", resolve_spec(generation).display_name).green().to_string()
    } else {
        "deterministic composer".yellow().to_string()
    };
    println!("  {:<18} {}", "Generation:".bold(), engine);
    println!("  {:<18} {}", "Model:".bold(), generation.model);
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", generation.temperature).dimmed(),
        format!("{}", generation.max_tokens).dimmed(),
        generation.timeout_secs,
    );
    println!(
        "  {:<18} {}",
        "Known providers:".bold(),
        PROVIDERS
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(", ")
            .dimmed()
    );

    // Publishing
    println!();
    let publish = &config.publish;
    let output_dir = expand_home(&publish.output_dir);
    println!("  {:<18} {}", "Publish mode:".bold(), publish.mode);
    println!(
        "  {:<18} {} {}",
        "Records:".bold(),
        output_dir.display(),
        found(output_dir.exists())
    );
    println!("  {}", "Channels:".bold());
    for channel in Channel::ALL {
        let route = match resolve(
            publish.mode,
            channel,
            config.channels.get(channel),
            config.channels.social_platform,
        ) {
            Some(kind) => kind.to_string(),
            None => format!("{}", "· disabled".dimmed()),
        };
        println!("    {:<20} {}", channel.label(), route);
    }

    // Token store
    println!();
    print_token_store(&config).await;

    println!();
    Ok(())
}

/// Token store state, then a full registry validation that reuses it.
async fn print_token_store(config: &Config) {
    if !config.tokens.is_configured() {
        println!("  {:<18} {}", "Token store:".bold(), "· not configured".dimmed());
        print_registry(config, None);
        return;
    }
    match EncryptedTokenStore::from_config(&config.tokens).await {
        Ok(Some(store)) => {
            let entries = store.list().await;
            println!(
                "  {:<18} {} ({} token(s))",
                "Token store:".bold(),
                "✓".green(),
                entries.len()
            );
            for info in &entries {
                let expired = if info.is_expired_at(Utc::now()) {
                    " expired".red().to_string()
                } else {
                    String::new()
                };
                println!("    {:<20} {}{}", info.provider, info.account, expired);
            }
            print_registry(config, Some(Arc::new(store) as Arc<dyn TokenStore>));
        }
        Ok(None) => print_registry(config, None),
        Err(e) => {
            println!("  {:<18} {} {}", "Token store:".bold(), "✗".red(), e);
            print_registry(config, None);
        }
    }
}

fn print_registry(config: &Config, tokens: Option<Arc<dyn TokenStore>>) {
    match PublisherRegistry::from_config(config, tokens) {
        Ok(_) => println!("  {:<18} {}", "Publishers:".bold(), "✓ ready".green()),
        Err(e) => println!("  {:<18} {} {}", "Publishers:".bold(), "✗".red(), e),
    }
}
