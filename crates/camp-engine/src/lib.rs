//! Camp Engine — campaign briefs, channel copy and ideas.
//!
//! This crate contains:
//! - **engine**: `ContentEngine`, provider first with composer fallback
//! - **ideas**: `IdeaGenerator` for short hooks per channel
//! - **composer**: deterministic templates used without a provider
//! - **prompts**: system and task prompts for the provider path

pub mod composer;
pub mod engine;
pub mod ideas;
pub mod prompts;

pub use composer::DeterministicComposer;
pub use engine::{CampaignContent, ContentEngine, EngineSettings, GenerationStrategy};
pub use ideas::IdeaGenerator;
