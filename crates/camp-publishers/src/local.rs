//! Local file publisher — writes each publish as a JSON record on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use camp_core::utils::{compact_timestamp, expand_home, safe_filename};
use camp_core::{Campaign, Channel, Content, PipelineError, PublishExtras, PublishResult, Recipient};

use crate::base::{Publisher, PublisherKind};

/// Writes `<output_dir>/<channel>/<campaign>_<channel>_<timestamp>_<suffix>.json`.
#[derive(Clone, Debug)]
pub struct LocalFilePublisher {
    output_dir: PathBuf,
}

impl LocalFilePublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Expands a leading `~/`.
    pub fn from_config_dir(output_dir: &str) -> Self {
        Self::new(expand_home(output_dir))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn record(
        campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: &[Recipient],
        extras: Option<&PublishExtras>,
    ) -> serde_json::Value {
        let subject = extras
            .and_then(|e| e.subject.clone())
            .or_else(|| content.subject.clone());
        json!({
            "campaignId": campaign.id,
            "campaignName": campaign.name,
            "channel": channel,
            "tone": content.tone,
            "source": content.source,
            "subject": subject,
            "content": content.render(),
            "truncated": content.truncated,
            "recipients": recipients.iter().map(Recipient::address).collect::<Vec<_>>(),
            "issuedAt": chrono::Utc::now().to_rfc3339(),
            "meta": {
                "audience": campaign.audience,
                "objective": campaign.objective,
                "budget": campaign.budget,
                "businessDescription": campaign.business_description,
                "landingUrl": campaign.landing_url,
            },
            "extras": extras.map(|e| &e.metadata),
        })
    }

    async fn write_record(
        &self,
        campaign: &Campaign,
        channel: Channel,
        record: &serde_json::Value,
    ) -> Result<PathBuf, PipelineError> {
        let dir = self.output_dir.join(channel.as_str());
        let id = if campaign.id.trim().is_empty() {
            "campaign".to_string()
        } else {
            safe_filename(campaign.id.trim())
        };
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let file = dir.join(format!(
            "{id}_{channel}_{}_{}.json",
            compact_timestamp(),
            &suffix[..8]
        ));

        let body = serde_json::to_string_pretty(record)
            .map_err(|e| PipelineError::TransportFailure(e.to_string()))?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            PipelineError::TransportFailure(format!("cannot create {}: {e}", dir.display()))
        })?;
        tokio::fs::write(&file, body).await.map_err(|e| {
            PipelineError::TransportFailure(format!("cannot write {}: {e}", file.display()))
        })?;
        Ok(file)
    }
}

#[async_trait]
impl Publisher for LocalFilePublisher {
    fn name(&self) -> &str {
        "local-file"
    }

    fn kind(&self) -> PublisherKind {
        PublisherKind::Local
    }

    async fn publish(
        &self,
        campaign: &Campaign,
        channel: Channel,
        content: &Content,
        recipients: Option<&[Recipient]>,
        extras: Option<&PublishExtras>,
    ) -> PublishResult {
        let recipients = recipients.unwrap_or_default();
        let record = Self::record(campaign, channel, content, recipients, extras);

        match self.write_record(campaign, channel, &record).await {
            Ok(path) => {
                debug!(channel = %channel, path = %path.display(), "Publish record written");
                PublishResult::delivered(
                    Some(path.display().to_string()),
                    format!("saved to {}", path.display()),
                    recipients.len(),
                )
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Local publish failed");
                PublishResult::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camp_core::{GenerationSource, PublishStatus, Tone};
    use tempfile::TempDir;

    fn campaign() -> Campaign {
        Campaign {
            id: "spring/01".into(),
            name: "Spring Sale".into(),
            audience: "local families".into(),
            objective: "drive weekend purchases".into(),
            landing_url: Some("https://bakery.example.com".into()),
            ..Campaign::default()
        }
    }

    fn social_content() -> Content {
        Content::parse(
            Channel::Social,
            Tone::Friendly,
            "Fresh bread 🙂\nhttps://bakery.example.com\n#CornerBakery",
            GenerationSource::Composer,
        )
    }

    #[tokio::test]
    async fn test_social_publish_writes_record() {
        let dir = TempDir::new().unwrap();
        let publisher = LocalFilePublisher::new(dir.path());

        let result = publisher
            .publish(&campaign(), Channel::Social, &social_content(), None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Delivered);

        let path = PathBuf::from(result.provider_id.unwrap());
        assert!(path.starts_with(dir.path().join("social")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("spring_01_social_"));

        let record: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(record["campaignName"], "Spring Sale");
        assert_eq!(record["channel"], "social");
        assert_eq!(record["tone"], "friendly");
        assert_eq!(record["meta"]["objective"], "drive weekend purchases");
        assert!(record["content"].as_str().unwrap().contains("#CornerBakery"));
    }

    #[tokio::test]
    async fn test_recipients_and_extras_recorded() {
        let dir = TempDir::new().unwrap();
        let publisher = LocalFilePublisher::new(dir.path());
        let content = Content::parse(
            Channel::Email,
            Tone::Formal,
            "Subject: Hello\n\nBody text",
            GenerationSource::Composer,
        );
        let recipients = vec![
            Recipient::email("a@example.com").unwrap(),
            Recipient::email("b@example.com").unwrap(),
        ];
        let mut extras = PublishExtras {
            subject: Some("Override".into()),
            ..PublishExtras::default()
        };
        extras.metadata.insert("batch".into(), "7".into());

        let result = publisher
            .publish(&campaign(), Channel::Email, &content, Some(recipients.as_slice()), Some(&extras))
            .await;
        assert_eq!(result.recipients_count, 2);

        let raw = std::fs::read_to_string(result.provider_id.unwrap()).unwrap();
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["subject"], "Override");
        assert_eq!(record["recipients"][1], "b@example.com");
        assert_eq!(record["extras"]["batch"], "7");
    }

    #[tokio::test]
    async fn test_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let publisher = LocalFilePublisher::new(&blocker);
        let result = publisher
            .publish(&campaign(), Channel::Social, &social_content(), None, None)
            .await;
        assert_eq!(result.status, PublishStatus::Failed);
        assert!(result.message.contains("cannot create"));
    }

    #[tokio::test]
    async fn test_repeated_publishes_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let publisher = LocalFilePublisher::new(dir.path());
        let a = publisher
            .publish(&campaign(), Channel::Social, &social_content(), None, None)
            .await;
        let b = publisher
            .publish(&campaign(), Channel::Social, &social_content(), None, None)
            .await;
        assert_ne!(a.provider_id, b.provider_id);
    }
}
