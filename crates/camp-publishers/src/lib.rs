//! Camp Publishers — delivery of shaped content to a channel transport.
//!
//! This crate provides:
//! - **base**: the `Publisher` trait every adapter implements
//! - **registry**: `PublisherRegistry`, resolving (mode, channel) to an adapter
//! - **local**: JSON records on disk, the default and the test double
//! - **sendgrid**: live email through the SendGrid v3 API
//! - **planned**: Twilio, Meta and LinkedIn adapters without a transport yet
//! - **email_format**: subject and body normalisation before sending

pub mod base;
pub mod email_format;
pub mod local;
pub mod planned;
pub mod registry;
pub mod sendgrid;

pub use base::{Publisher, PublisherKind};
pub use local::LocalFilePublisher;
pub use planned::{LinkedInPublisher, MetaPublisher, TwilioSmsPublisher};
pub use registry::{resolve, PublisherRegistry};
pub use sendgrid::{CredentialCheck, SendGridEmailPublisher};
