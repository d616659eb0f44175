//! Error taxonomy for the generation and publishing pipeline.
//!
//! Only two kinds ever reach a caller as `Err`: [`PublisherConfigError`]
//! (at configuration-validation time) and [`ValidationError`] (at the input
//! edge). Provider failures are recovered by the fallback composer, and
//! transport failures travel inside a `PublishResult` with status `failed`.

use thiserror::Error;

use crate::channel::Channel;

/// Rejected input: a malformed recipient, an unknown tone or channel name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed email address '{0}'")]
    MalformedEmail(String),

    #[error("malformed phone number '{0}'")]
    MalformedPhone(String),

    #[error("no recipients supplied for {0}")]
    NoRecipients(Channel),

    #[error("recipient '{recipient}' cannot receive {channel} messages")]
    WrongRecipientKind { recipient: String, channel: Channel },

    #[error("unknown tone '{0}' (expected professional, friendly, sharp, humorous or formal)")]
    UnknownTone(String),

    #[error("unknown channel '{0}' (expected email, sms, social or ads)")]
    UnknownChannel(String),

    #[error("unknown publish mode '{0}' (expected local or live)")]
    UnknownPublishMode(String),
}

/// A channel is enabled for an adapter that cannot run with the current config.
///
/// Raised while the publisher registry is built, never at publish time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PublisherConfigError {
    #[error("{channel} is routed to {adapter}, which is missing {missing}")]
    MissingCredentials {
        channel: Channel,
        adapter: &'static str,
        missing: String,
    },

    #[error("sender identity '{0}' is not a valid email address")]
    InvalidSender(String),

    #[error("{adapter} needs the integration token store, but no key file is configured")]
    TokenStoreMissing { adapter: &'static str },

    #[error("publisher setup failed: {0}")]
    Setup(String),
}

/// Every failure the pipeline knows how to classify.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network, timeout, auth or quota problem talking to the generation provider.
    #[error("generation provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Shaping had to hard-cut because no word boundary fit the budget.
    #[error("content for {channel} exceeds {limit} characters even at the first word boundary")]
    ContentTooLong { channel: Channel, limit: usize },

    #[error(transparent)]
    PublisherConfig(#[from] PublisherConfigError),

    /// Adapter-level send failure (auth, rate limit, invalid recipient).
    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
