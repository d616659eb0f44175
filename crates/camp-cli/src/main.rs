//! Camp CLI — entry point.
//!
//! # Commands
//!
//! - `camp onboard` — write default config and a sample campaign
//! - `camp status` — show provider, publish mode and channel routing
//! - `camp brief -c FILE` — print the campaign brief
//! - `camp generate -c FILE` — brief plus copy for every selected channel
//! - `camp ideas -c FILE --channel C` — short hooks for one channel
//! - `camp publish -c FILE --channel C` — generate (or read) and publish
//! - `camp publish -c FILE --all` — generate and publish every enabled channel
//! - `camp check-email` — SendGrid sandbox credential check

mod campaign_cmd;
mod helpers;
mod onboard;
mod publish_cmd;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use camp_core::{Channel, Tone};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 📣 Camp — campaign copy for small businesses, from brief to publish
#[derive(Parser)]
#[command(name = "camp", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and a sample campaign
    Onboard,

    /// Show configuration, provider and publisher status
    Status,

    /// Print the campaign brief
    Brief {
        /// Campaign JSON file
        #[arg(short, long)]
        campaign: PathBuf,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Generate the brief and copy for each channel
    Generate {
        #[arg(short, long)]
        campaign: PathBuf,

        /// Channels to generate (repeatable). Defaults to the campaign's channels.
        #[arg(long = "channel")]
        channels: Vec<Channel>,

        #[arg(short, long)]
        tone: Option<Tone>,

        /// Also write brief and copy files into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Suggest short ideas for one channel
    Ideas {
        #[arg(short, long)]
        campaign: PathBuf,

        #[arg(long)]
        channel: Channel,

        #[arg(short, long)]
        tone: Option<Tone>,

        /// Number of ideas
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Generate (or read) content for one channel, or every channel, and publish it
    Publish {
        #[arg(short, long)]
        campaign: PathBuf,

        #[arg(long, required_unless_present = "all")]
        channel: Option<Channel>,

        /// Publish every enabled channel of the campaign
        #[arg(long, conflicts_with_all = ["channel", "content"])]
        all: bool,

        #[arg(short, long)]
        tone: Option<Tone>,

        /// Recipient list file (one per line, or comma/semicolon separated)
        #[arg(long)]
        recipients: Option<PathBuf>,

        /// Publish this text instead of generating it
        #[arg(long)]
        content: Option<PathBuf>,

        /// Override the email subject
        #[arg(long)]
        subject: Option<String>,
    },

    /// Verify SendGrid credentials with a sandbox send
    CheckEmail,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs, cli.log_json);

    match cli.command {
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run().await,
        Commands::Brief { campaign, json } => campaign_cmd::brief(&campaign, json).await,
        Commands::Generate {
            campaign,
            channels,
            tone,
            out,
        } => campaign_cmd::generate(&campaign, &channels, tone, out.as_deref()).await,
        Commands::Ideas {
            campaign,
            channel,
            tone,
            count,
        } => campaign_cmd::ideas(&campaign, channel, tone, count).await,
        Commands::Publish {
            campaign,
            channel,
            all: _,
            tone,
            recipients,
            content,
            subject,
        } => {
            let args = publish_cmd::PublishArgs {
                campaign,
                channel,
                tone,
                recipients,
                content,
                subject,
            };
            publish_cmd::run(args).await
        }
        Commands::CheckEmail => publish_cmd::check_email().await,
    }
}

/// Initialize tracing/logging. Logs go to stderr so stdout stays clean for `--json`.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("camp=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
