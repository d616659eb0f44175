//! Publisher trait — the interface every delivery adapter implements.
//!
//! A publisher never returns `Err` at publish time: auth, quota, network and
//! recipient problems are reported as a [`PublishResult`] with status
//! `failed`. Configuration problems surface earlier, when the
//! `PublisherRegistry` is built.

use std::fmt;

use async_trait::async_trait;
use camp_core::{Campaign, Channel, Content, PublishExtras, PublishResult, Recipient};

/// Closed set of adapters the registry can route to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PublisherKind {
    Local,
    SendGridEmail,
    TwilioSms,
    MetaSocial,
    LinkedInSocial,
}

impl PublisherKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PublisherKind::Local => "local-file",
            PublisherKind::SendGridEmail => "sendgrid-email",
            PublisherKind::TwilioSms => "twilio-sms",
            PublisherKind::MetaSocial => "meta-social",
            PublisherKind::LinkedInSocial => "linkedin-social",
        }
    }

    /// Whether this adapter talks to a live network transport.
    pub fn is_live(self) -> bool {
        self != PublisherKind::Local
    }
}

impl fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every delivery adapter implements this trait.
///
/// The registry holds `Arc<dyn Publisher>` per channel and routes publish
/// calls to it.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Adapter name, as used in logs and status output.
    fn name(&self) -> &str;

    fn kind(&self) -> PublisherKind;

    /// Deliver `content` for `channel`.
    ///
    /// `recipients` are required for email and SMS (email falls back to the
    /// adapter's configured defaults); social and ads ignore them.
    async fn publish(
        &self,
        campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> PublishResult;
}
