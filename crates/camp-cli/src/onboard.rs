//! `camp onboard` — initialize configuration, the token key and a sample campaign.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use camp_core::config::{get_config_path, load_config, save_config};
use camp_core::utils::{expand_home, get_data_path};
use camp_tokens::EncryptedTokenStore;

const DEFAULT_KEY_FILE: &str = "~/.camp/token.key";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "📣 Camp — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    std::fs::create_dir_all(&data_dir)?;
    let config_path = get_config_path();

    // 1. Config
    let mut config = load_config(None);
    if config_path.exists() {
        println!("  {} config already exists at {}", "✓".green(), config_path.display());
    } else {
        if config.tokens.key_file.trim().is_empty() {
            config.tokens.key_file = DEFAULT_KEY_FILE.to_string();
        }
        save_config(&config, Some(&config_path))?;
        println!("  {} created config at {}", "✓".green(), config_path.display());
    }

    // 2. Token store key
    if config.tokens.is_configured() {
        let key_path = expand_home(&config.tokens.key_file);
        if key_path.exists() {
            println!("  {} token key already exists", "✓".green());
        } else {
            EncryptedTokenStore::create_key_file(&key_path)
                .with_context(|| format!("failed to create token key {}", key_path.display()))?;
            println!("  {} created token key at {}", "✓".green(), key_path.display());
        }
    }

    // 3. Publish records
    let published = expand_home(&config.publish.output_dir);
    std::fs::create_dir_all(&published)?;
    println!("  {} publish records at {}", "✓".green(), published.display());

    // 4. Sample campaign
    let campaigns = data_dir.join("campaigns");
    std::fs::create_dir_all(&campaigns)?;
    create_template(&campaigns.join("sample.json"), SAMPLE_CAMPAIGN)?;

    println!();
    println!(
        "{}",
        "  Setup complete! Try `camp generate -c ~/.camp/campaigns/sample.json`.".green()
    );
    println!();
    Ok(())
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

const SAMPLE_CAMPAIGN: &str = r#"{
  "id": "spring-sale",
  "name": "Spring Sale",
  "audience": "local families within 5 km",
  "objective": "drive weekend purchases",
  "channels": ["email", "sms", "social", "ads"],
  "budget": "$300",
  "businessDescription": "Corner Bakery, a neighborhood bakery with sourdough and pastries",
  "landingUrl": "https://bakery.example.com/spring"
}
"#;
