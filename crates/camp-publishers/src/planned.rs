//! Adapters whose transport is not wired yet.
//!
//! They accept the same calls as the live adapters and validate their inputs,
//! then report `failed`. Meta and LinkedIn also check the integration token
//! so a missing or expired credential is reported before anything else.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use camp_core::config::TwilioConfig;
use camp_core::{
    Campaign, Channel, Content, PublishExtras, PublishResult, Recipient, ValidationError,
};
use camp_tokens::{TokenStore, TokenStoreError};

use crate::base::{Publisher, PublisherKind};

const NOT_AVAILABLE: &str = "transport not available yet";

fn wrong_channel(adapter: &str, expected: Channel, got: Channel) -> PublishResult {
    PublishResult::failed(format!("{adapter} publishes {expected}, not {got}"))
}

// ─────────────────────────────────────────────
// Twilio SMS
// ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TwilioSmsPublisher {
    from_number: String,
}

impl TwilioSmsPublisher {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            from_number: config.from_number.trim().to_string(),
        }
    }

    fn validate(&self, content: &Content, recipients: Option<&[Recipient]>) -> Result<usize, String> {
        Recipient::phone(&self.from_number).map_err(|e| format!("invalid sender: {e}"))?;

        let recipients = recipients.unwrap_or_default();
        if recipients.is_empty() {
            return Err(ValidationError::NoRecipients(Channel::Sms).to_string());
        }
        if let Some(r) = recipients.iter().find(|r| !r.fits(Channel::Sms)) {
            return Err(ValidationError::WrongRecipientKind {
                recipient: r.address().to_string(),
                channel: Channel::Sms,
            }
            .to_string());
        }

        let limit = Channel::Sms.spec().max_chars.unwrap_or(160);
        if content.body.chars().count() > limit {
            return Err(format!("SMS body exceeds {limit} characters"));
        }
        Ok(recipients.len())
    }
}

#[async_trait]
impl Publisher for TwilioSmsPublisher {
    fn name(&self) -> &str {
        "twilio-sms"
    }

    fn kind(&self) -> PublisherKind {
        PublisherKind::TwilioSms
    }

    async fn publish(
        &self,
        _campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: Option<&[Recipient]>,
        _extras: Option<&PublishExtras>,
    ) -> PublishResult {
        if channel != Channel::Sms {
            return wrong_channel(self.name(), Channel::Sms, channel);
        }
        match self.validate(content, recipients) {
            Ok(count) => {
                debug!(recipients = count, "Twilio SMS validated");
                PublishResult::failed(format!("Twilio SMS: {NOT_AVAILABLE}"))
            }
            Err(msg) => PublishResult::failed(msg),
        }
    }
}

// ─────────────────────────────────────────────
// Token-gated social adapters
// ─────────────────────────────────────────────

/// Reports a missing or expired token as a distinct message.
async fn check_token(
    tokens: &dyn TokenStore,
    provider: &str,
    account: &str,
) -> Result<(), String> {
    match tokens.is_expired(provider, account).await {
        Ok(false) => Ok(()),
        Ok(true) => Err(format!(
            "{provider} token for {account} has expired; re-authorize the integration"
        )),
        Err(TokenStoreError::NotFound { .. }) => Err(format!(
            "no {provider} token stored for {account}; connect the integration first"
        )),
        Err(e) => Err(format!("{provider} token unavailable: {e}")),
    }
}

/// Facebook/Instagram page posts.
pub struct MetaPublisher {
    page_id: String,
    tokens: Arc<dyn TokenStore>,
}

impl MetaPublisher {
    pub fn new(page_id: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            page_id: page_id.into(),
            tokens,
        }
    }
}

#[async_trait]
impl Publisher for MetaPublisher {
    fn name(&self) -> &str {
        "meta-social"
    }

    fn kind(&self) -> PublisherKind {
        PublisherKind::MetaSocial
    }

    async fn publish(
        &self,
        _campaign: &Campaign,
        channel: Channel,
        content: &Content,
        _recipients: Option<&[Recipient]>,
        _extras: Option<&PublishExtras>,
    ) -> PublishResult {
        if channel != Channel::Social {
            return wrong_channel(self.name(), Channel::Social, channel);
        }
        if content.body.trim().is_empty() {
            return PublishResult::failed("empty post body");
        }
        if let Err(msg) = check_token(self.tokens.as_ref(), "meta", &self.page_id).await {
            return PublishResult::failed(msg);
        }
        PublishResult::failed(format!("Meta: {NOT_AVAILABLE}"))
    }
}

/// LinkedIn organization posts.
pub struct LinkedInPublisher {
    organization_id: String,
    tokens: Arc<dyn TokenStore>,
}

impl LinkedInPublisher {
    pub fn new(organization_id: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            organization_id: organization_id.into(),
            tokens,
        }
    }
}

#[async_trait]
impl Publisher for LinkedInPublisher {
    fn name(&self) -> &str {
        "linkedin-social"
    }

    fn kind(&self) -> PublisherKind {
        PublisherKind::LinkedInSocial
    }

    async fn publish(
        &self,
        _campaign: &Campaign,
        channel: Channel,
        content: &Content,
        _recipients: Option<&[Recipient]>,
        _extras: Option<&PublishExtras>,
    ) -> PublishResult {
        if channel != Channel::Social {
            return wrong_channel(self.name(), Channel::Social, channel);
        }
        if content.body.trim().is_empty() {
            return PublishResult::failed("empty post body");
        }
        if let Err(msg) = check_token(self.tokens.as_ref(), "linkedin", &self.organization_id).await {
            return PublishResult::failed(msg);
        }
        PublishResult::failed(format!("LinkedIn: {NOT_AVAILABLE}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camp_core::{GenerationSource, PublishStatus, Tone};
    use camp_tokens::{EncryptedTokenStore, TokenPair};
    use chrono::{Duration, Utc};

    fn sms(body: &str) -> Content {
        Content::parse(Channel::Sms, Tone::Sharp, body, GenerationSource::Composer)
    }

    fn post() -> Content {
        Content::parse(Channel::Social, Tone::Friendly, "Fresh bread!", GenerationSource::Composer)
    }

    fn twilio() -> TwilioSmsPublisher {
        TwilioSmsPublisher::new(&TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "tok".into(),
            from_number: "+15550001111".into(),
        })
    }

    fn token_store() -> Arc<EncryptedTokenStore> {
        Arc::new(EncryptedTokenStore::in_memory(&EncryptedTokenStore::generate_key()).unwrap())
    }

    #[tokio::test]
    async fn test_twilio_valid_input_reports_not_available() {
        let to = vec![Recipient::phone("+1 555 123 4567").unwrap()];
        let result = twilio()
            .publish(&Campaign::default(), Channel::Sms, &sms("Sale today."), Some(to.as_slice()), None)
            .await;
        assert_eq!(result.status, PublishStatus::Failed);
        assert!(result.message.contains(NOT_AVAILABLE));
    }

    #[tokio::test]
    async fn test_twilio_rejects_email_recipient_and_long_body() {
        let email = vec![Recipient::email("a@example.com").unwrap()];
        let result = twilio()
            .publish(&Campaign::default(), Channel::Sms, &sms("Sale."), Some(email.as_slice()), None)
            .await;
        assert!(result.message.contains("cannot receive sms"));

        let phone = vec![Recipient::phone("+15551234567").unwrap()];
        let result = twilio()
            .publish(&Campaign::default(), Channel::Sms, &sms(&"x".repeat(200)), Some(phone.as_slice()), None)
            .await;
        assert!(result.message.contains("exceeds 160"));

        let result = twilio()
            .publish(&Campaign::default(), Channel::Sms, &sms("Sale."), None, None)
            .await;
        assert!(result.message.contains("no recipients"));
    }

    #[tokio::test]
    async fn test_meta_missing_token() {
        let publisher = MetaPublisher::new("page-1", token_store());
        let result = publisher
            .publish(&Campaign::default(), Channel::Social, &post(), None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Failed);
        assert!(result.message.starts_with("no meta token stored for page-1"));
    }

    #[tokio::test]
    async fn test_linkedin_expired_token() {
        let store = token_store();
        store
            .store(
                "linkedin",
                "org-9",
                TokenPair::new("acc", None),
                Some(Utc::now() - Duration::minutes(1)),
            )
            .await
            .unwrap();
        let publisher = LinkedInPublisher::new("org-9", store);
        let result = publisher
            .publish(&Campaign::default(), Channel::Social, &post(), None, None)
            .await;
        assert!(result.message.contains("has expired"));
    }

    #[tokio::test]
    async fn test_meta_valid_token_reports_not_available() {
        let store = token_store();
        store
            .store("meta", "page-1", TokenPair::new("acc", None), None)
            .await
            .unwrap();
        let publisher = MetaPublisher::new("page-1", store);
        let result = publisher
            .publish(&Campaign::default(), Channel::Social, &post(), None, None)
            .await;
        assert_eq!(result.message, format!("Meta: {NOT_AVAILABLE}"));

        let wrong = publisher
            .publish(&Campaign::default(), Channel::Ads, &post(), None, None)
            .await;
        assert!(wrong.message.contains("publishes social, not ads"));
    }
}
