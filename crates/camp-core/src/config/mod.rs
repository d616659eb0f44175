//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use camp_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.generation.model);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, get_config_path, load_config, load_config_with_env, save_config};
pub use schema::{
    ChannelToggle, ChannelsConfig, Config, DefaultsConfig, GenerationConfig, LinkedInConfig,
    MetaConfig, PublishConfig, PublishMode, SendGridConfig, SocialPlatform, TokenStoreConfig,
    TwilioConfig,
};
