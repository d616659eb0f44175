//! Core data model: campaign facts in, briefs / content / ideas / publish results out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::tone::Tone;

// ─────────────────────────────────────────────
// Campaign facts
// ─────────────────────────────────────────────

/// Immutable campaign facts supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub audience: String,
    #[serde(alias = "goal")]
    pub objective: String,
    pub channels: Vec<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(alias = "businessDesc", alias = "business_desc")]
    pub business_description: String,
    #[serde(alias = "landing_url", skip_serializing_if = "Option::is_none")]
    pub landing_url: Option<String>,
}

impl Campaign {
    /// The landing link, if one was given.
    pub fn landing_link(&self) -> Option<&str> {
        self.landing_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Business description, falling back to the campaign name.
    pub fn business_or_name(&self) -> &str {
        let biz = self.business_description.trim();
        if biz.is_empty() {
            self.name.trim()
        } else {
            biz
        }
    }

    pub fn budget_or_na(&self) -> &str {
        self.budget
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A")
    }
}

/// Where a piece of generated text came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Provider,
    #[default]
    Composer,
}

// ─────────────────────────────────────────────
// Brief
// ─────────────────────────────────────────────

/// Structured campaign summary. Regenerated wholesale, never merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub campaign_id: String,
    pub name: String,
    pub objective: String,
    pub audience: String,
    pub channels: Vec<Channel>,
    pub budget: Option<String>,
    pub landing_url: Option<String>,
    pub problem: String,
    pub key_message: String,
    pub call_to_action: String,
    pub channel_strategy: Vec<String>,
    pub metrics: Vec<String>,
    pub source: GenerationSource,
}

impl Brief {
    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let channels = self
            .channels
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        let or_na = |s: &str| if s.trim().is_empty() { "N/A".to_string() } else { s.to_string() };

        let mut out = String::new();
        out.push_str("Campaign Brief\n");
        out.push_str("===============================\n");
        out.push_str(&format!("Campaign Name: {}\n", self.name));
        out.push_str(&format!("Primary Goal: {}\n", or_na(&self.objective)));
        out.push_str(&format!("Target Audience: {}\n", or_na(&self.audience)));
        out.push_str(&format!("Channels: {}\n", or_na(&channels)));
        out.push_str(&format!(
            "Budget: {}\n",
            or_na(self.budget.as_deref().unwrap_or_default())
        ));
        out.push_str(&format!(
            "Landing Page: {}\n",
            or_na(self.landing_url.as_deref().unwrap_or_default())
        ));
        out.push_str(&format!("\nProblem:\n- {}\n", self.problem));
        out.push_str(&format!("\nKey Message:\n- {}\n", self.key_message));
        out.push_str(&format!("\nCall to Action:\n- {}\n", self.call_to_action));
        out.push_str("\nChannel Strategy:\n");
        for line in &self.channel_strategy {
            out.push_str(&format!("- {line}\n"));
        }
        out.push_str("\nMetrics:\n");
        for line in &self.metrics {
            out.push_str(&format!("- {line}\n"));
        }
        out
    }
}

// ─────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────

/// Shaped copy for one (campaign, channel, tone).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub channel: Channel,
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    pub body: String,
    pub source: GenerationSource,
    #[serde(default)]
    pub truncated: bool,
}

impl Content {
    /// Split rendered copy into header fields and body.
    ///
    /// Only email carries `Subject:` / `Preheader:` headers; they are looked
    /// for among the leading lines, and a `Body:` marker line is dropped.
    pub fn parse(channel: Channel, tone: Tone, text: &str, source: GenerationSource) -> Self {
        let mut subject = None;
        let mut preheader = None;
        let mut body_lines = Vec::new();
        let mut in_header = channel == Channel::Email;

        for line in text.lines() {
            let trimmed = line.trim();
            if in_header {
                if let Some(v) = strip_label(trimmed, "Subject:") {
                    subject = Some(v.to_string()).filter(|s| !s.is_empty());
                    continue;
                }
                if let Some(v) = strip_label(trimmed, "Preheader:") {
                    preheader = Some(v.to_string()).filter(|s| !s.is_empty());
                    continue;
                }
                if let Some(v) = strip_label(trimmed, "Body:") {
                    in_header = false;
                    if !v.is_empty() {
                        body_lines.push(v);
                    }
                    continue;
                }
                if trimmed.is_empty() {
                    continue;
                }
                in_header = false;
            }
            body_lines.push(line.trim_end());
        }

        Self {
            channel,
            tone,
            subject,
            preheader,
            body: body_lines.join("\n").trim().to_string(),
            source,
            truncated: false,
        }
    }

    /// Rendered copy: header lines (email) followed by the body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(subject) = &self.subject {
            out.push_str(&format!("Subject: {subject}\n"));
        }
        if let Some(preheader) = &self.preheader {
            out.push_str(&format!("Preheader: {preheader}\n"));
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.get(..label.len())
        .filter(|p| p.eq_ignore_ascii_case(label))
        .map(|_| line[label.len()..].trim())
}

/// A short, reusable content fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub channel: Channel,
    pub tone: Tone,
    pub text: String,
    pub source: GenerationSource,
}

// ─────────────────────────────────────────────
// Publishing
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Delivered,
    Queued,
    Failed,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PublishStatus::Delivered => "delivered",
            PublishStatus::Queued => "queued",
            PublishStatus::Failed => "failed",
        })
    }
}

/// Outcome of one publish call. Never retried internally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub recipients_count: usize,
}

impl PublishResult {
    pub fn delivered(
        provider_id: Option<String>,
        message: impl Into<String>,
        recipients_count: usize,
    ) -> Self {
        Self::new(PublishStatus::Delivered, provider_id, message, recipients_count)
    }

    pub fn queued(
        provider_id: Option<String>,
        message: impl Into<String>,
        recipients_count: usize,
    ) -> Self {
        Self::new(PublishStatus::Queued, provider_id, message, recipients_count)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PublishStatus::Failed, None, message, 0)
    }

    fn new(
        status: PublishStatus,
        provider_id: Option<String>,
        message: impl Into<String>,
        recipients_count: usize,
    ) -> Self {
        Self {
            status,
            provider_id,
            message: message.into(),
            timestamp: Utc::now(),
            recipients_count,
        }
    }

    /// Delivered or queued.
    pub fn is_success(&self) -> bool {
        self.status != PublishStatus::Failed
    }
}

/// Optional per-call publish parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishExtras {
    /// Overrides the subject carried by the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}
