//! SendGrid email publisher — SendGrid v3 `mail/send` over HTTPS.
//!
//! The sender identity and recipients are validated before any network
//! call. Subject and body go through [`crate::email_format`] first.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use camp_core::config::SendGridConfig;
use camp_core::{
    truncate_at_boundary, Campaign, Channel, Content, PipelineError, PublishExtras, PublishResult,
    PublisherConfigError, Recipient, ValidationError,
};

use crate::base::{Publisher, PublisherKind};
use crate::email_format::{normalize_body, normalize_link, normalize_subject};

const ERROR_BODY_LIMIT: usize = 300;
const CHECK_SUBJECT: &str = "Camp – Email Integration Check (Sandbox)";
const CHECK_BODY: &str = "This is a sandbox verification. No email was delivered.";

/// Outcome of a sandbox credential check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialCheck {
    pub ok: bool,
    pub detail: String,
}

pub struct SendGridEmailPublisher {
    client: reqwest::Client,
    config: SendGridConfig,
}

impl std::fmt::Debug for SendGridEmailPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridEmailPublisher")
            .field("api_base", &self.config.api_base)
            .field("from_email", &self.config.from_email)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SendGridEmailPublisher {
    pub fn new(config: SendGridConfig) -> Result<Self, PublisherConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| PublisherConfigError::Setup(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.config.api_base.trim_end_matches('/'))
    }

    fn sender(&self) -> Result<Recipient, PipelineError> {
        let from = self.config.from_email.trim();
        if from.is_empty() {
            return Err(PublisherConfigError::MissingCredentials {
                channel: Channel::Email,
                adapter: "sendgrid-email",
                missing: "publish.sendgrid.fromEmail".into(),
            }
            .into());
        }
        Recipient::email(from)
            .map_err(|_| PublisherConfigError::InvalidSender(from.to_string()).into())
    }

    /// Supplied email recipients, or the configured defaults when none are given.
    fn recipients(&self, supplied: Option<&[Recipient]>) -> Result<Vec<String>, ValidationError> {
        let mut out: Vec<String> = Vec::new();
        match supplied.filter(|r| !r.is_empty()) {
            Some(list) => {
                for r in list {
                    if !r.fits(Channel::Email) {
                        return Err(ValidationError::WrongRecipientKind {
                            recipient: r.address().to_string(),
                            channel: Channel::Email,
                        });
                    }
                    out.push(r.address().to_string());
                }
            }
            None => {
                for raw in &self.config.default_to {
                    match Recipient::email(raw) {
                        Ok(r) => out.push(r.address().to_string()),
                        Err(e) => warn!(error = %e, "Skipping default recipient"),
                    }
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        out.retain(|a| seen.insert(a.to_lowercase()));
        if out.is_empty() {
            return Err(ValidationError::NoRecipients(Channel::Email));
        }
        Ok(out)
    }

    fn subject(&self, campaign: &Campaign, content: &Content, extras: Option<&PublishExtras>) -> String {
        let raw = extras
            .and_then(|e| e.subject.as_deref())
            .or(content.subject.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| match campaign.name.trim() {
                "" => "Camp",
                name => name,
            });
        let subject = normalize_subject(raw, &self.config.subject_tag);
        match Channel::Email.spec().subject_max_chars {
            Some(max) => truncate_at_boundary(&subject, max).text,
            None => subject,
        }
    }

    fn body(&self, campaign: &Campaign, content: &Content) -> String {
        let link = normalize_link(campaign.landing_link())
            .unwrap_or_else(|| self.config.fallback_link.clone());
        let mut body = content.body.trim().to_string();
        if let Some(preheader) = content.preheader.as_deref() {
            body = format!("{preheader}\n\n{body}");
        }
        if body.is_empty() {
            body = "(empty)".to_string();
        }
        normalize_body(&body, &link)
    }

    async fn send(&self, payload: serde_json::Value, recipients: usize) -> Result<PublishResult, PipelineError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::TransportFailure("SendGrid request timed out".into())
                } else {
                    PipelineError::TransportFailure(format!("network error: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        let message_id = response
            .headers()
            .get("X-Message-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match status {
            200 => Ok(PublishResult::delivered(message_id, "sent via SendGrid", recipients)),
            202 => Ok(PublishResult::queued(message_id, "accepted by SendGrid", recipients)),
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(PipelineError::TransportFailure(provider_message(status, &text)))
            }
        }
    }

    async fn try_publish(
        &self,
        campaign: &Campaign,
        content: &Content,
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> Result<PublishResult, PipelineError> {
        let sender = self.sender()?;
        let to = self.recipients(recipients)?;
        let subject = self.subject(campaign, content, extras);
        let body = self.body(campaign, content);

        debug!(recipients = to.len(), subject = %subject, "Sending email via SendGrid");
        let payload = json!({
            "personalizations": [{ "to": to.iter().map(|e| json!({ "email": e })).collect::<Vec<_>>() }],
            "from": { "email": sender.address() },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });
        self.send(payload, to.len()).await
    }

    /// Sandbox-mode send: verifies key, sender and recipients without delivering.
    pub async fn check(&self) -> CredentialCheck {
        let sender = match self.sender() {
            Ok(s) => s,
            Err(e) => {
                return CredentialCheck {
                    ok: false,
                    detail: e.to_string(),
                }
            }
        };
        let to = match self.recipients(None) {
            Ok(to) => to,
            Err(_) => vec![sender.address().to_string()],
        };

        let payload = json!({
            "personalizations": [{ "to": to.iter().map(|e| json!({ "email": e })).collect::<Vec<_>>() }],
            "from": { "email": sender.address() },
            "subject": CHECK_SUBJECT,
            "content": [{ "type": "text/plain", "value": CHECK_BODY }],
            "mail_settings": { "sandbox_mode": { "enable": true } },
        });

        let result = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(self.config.sandbox_timeout_secs.max(1)))
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(resp) if matches!(resp.status().as_u16(), 200 | 202) => CredentialCheck {
                ok: true,
                detail: format!("SendGrid sandbox OK. from={}, to={}", sender.address(), to.join(", ")),
            },
            Ok(resp) => {
                let status = resp.status().as_u16();
                let text = resp.text().await.unwrap_or_default();
                CredentialCheck {
                    ok: false,
                    detail: provider_message(status, &text),
                }
            }
            Err(e) => CredentialCheck {
                ok: false,
                detail: format!("network error: {e}"),
            },
        }
    }
}

/// `SendGrid <status>: <body>` with the body flattened and cut to 300 chars.
fn provider_message(status: u16, body: &str) -> String {
    let flat = body.trim().replace(['\r', '\n'], " ");
    let short: String = flat.chars().take(ERROR_BODY_LIMIT).collect();
    format!("SendGrid {status}: {short}")
}

#[async_trait]
impl Publisher for SendGridEmailPublisher {
    fn name(&self) -> &str {
        "sendgrid-email"
    }

    fn kind(&self) -> PublisherKind {
        PublisherKind::SendGridEmail
    }

    async fn publish(
        &self,
        campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> PublishResult {
        if channel != Channel::Email {
            return PublishResult::failed(format!("SendGrid only publishes email, not {channel}"));
        }
        if content.channel != Channel::Email {
            return PublishResult::failed(format!(
                "content was shaped for {}, not email",
                content.channel
            ));
        }
        match self.try_publish(campaign, content, recipients, extras).await {
            Ok(result) => {
                info!(
                    status = %result.status,
                    recipients = result.recipients_count,
                    message_id = result.provider_id.as_deref().unwrap_or("-"),
                    "SendGrid publish"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, "SendGrid publish failed");
                PublishResult::failed(e.to_string())
            }
        }
    }
}
