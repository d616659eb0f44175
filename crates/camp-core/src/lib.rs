//! Camp core — the data model shared by every pipeline crate.
//!
//! - [`types`]: campaign facts, briefs, generated content, publish results
//! - [`tone`]: the closed tone catalog and its stylistic descriptors
//! - [`channel`]: channels, their `ChannelSpec`, and `validate_and_shape`
//! - [`recipients`]: syntactic recipient validation and list parsing
//! - [`error`]: the pipeline error taxonomy
//! - [`config`]: typed configuration, loaded once at process start

pub mod channel;
pub mod config;
pub mod error;
pub mod recipients;
pub mod tone;
pub mod types;
pub mod utils;

pub use channel::{
    truncate_at_boundary, validate_and_shape, Channel, ChannelSpec, Shaped, Structure,
    TRUNCATION_MARKER,
};
pub use error::{PipelineError, PublisherConfigError, ValidationError};
pub use recipients::{parse_email_list, parse_recipient_list, Recipient, RecipientList};
pub use tone::{Tone, ToneProfile};
pub use types::{
    Brief, Campaign, Content, GenerationSource, Idea, PublishExtras, PublishResult, PublishStatus,
};
