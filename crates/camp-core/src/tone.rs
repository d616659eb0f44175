//! Tone catalog — the closed set of writing tones and their phrasing kits.
//!
//! A tone only selects connector phrases, greetings, sign-offs and call-to-action
//! verbs. Campaign facts (audience, objective, link) never pass through it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ─────────────────────────────────────────────
// Tone
// ─────────────────────────────────────────────

/// Writing tone for generated copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Sharp,
    Humorous,
    Formal,
}

impl Tone {
    /// Every tone, in catalog order.
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Sharp,
        Tone::Humorous,
        Tone::Formal,
    ];

    /// Lowercase identifier used in config and on the command line.
    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    /// The phrasing kit for this tone.
    pub fn profile(self) -> &'static ToneProfile {
        match self {
            Tone::Professional => &TONES[0],
            Tone::Friendly => &TONES[1],
            Tone::Sharp => &TONES[2],
            Tone::Humorous => &TONES[3],
            Tone::Formal => &TONES[4],
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownTone(s.trim().to_string()))
    }
}

// ─────────────────────────────────────────────
// ToneProfile — static phrasing data
// ─────────────────────────────────────────────

/// Stylistic descriptor for one tone.
#[derive(Clone, Debug)]
pub struct ToneProfile {
    pub tone: Tone,
    /// Lowercase identifier.
    pub name: &'static str,
    /// Description handed to the generation provider.
    pub descriptor: &'static str,
    /// Email/social salutation.
    pub greeting: &'static str,
    /// Connector introducing the campaign objective in email bodies.
    pub invitation: &'static str,
    /// Lead-in for the audience bullet.
    pub audience_lead: &'static str,
    /// Lead-in for the benefit bullet.
    pub urgency_lead: &'static str,
    /// Verb phrase placed before the landing link.
    pub cta: &'static str,
    /// CTA used when the campaign has no landing link.
    pub reply_cta: &'static str,
    /// Email sign-off, followed by the campaign name.
    pub sign_off: &'static str,
    /// Appended to short single-block copy (SMS).
    pub short_suffix: Option<&'static str>,
}

impl ToneProfile {
    /// Apply the tone's closing flourish to short single-block copy.
    ///
    /// Only appends; the incoming text is never rewritten.
    pub fn style_short(&self, text: &str) -> String {
        let base = text.trim();
        match self.tone {
            Tone::Sharp => {
                let mut out = base.to_string();
                if !out.ends_with(['.', '!', '?']) {
                    out.push('.');
                }
                match self.short_suffix {
                    Some(suffix) => format!("{out} {suffix}"),
                    None => out,
                }
            }
            _ => match self.short_suffix {
                Some(suffix) => format!("{base} {suffix}"),
                None => base.to_string(),
            },
        }
    }
}

/// The tone catalog, indexed in [`Tone::ALL`] order.
pub static TONES: [ToneProfile; 5] = [
    ToneProfile {
        tone: Tone::Professional,
        name: "professional",
        descriptor: "professional: clear, credible and concise",
        greeting: "Hello,",
        invitation: "invites you to",
        audience_lead: "Who is it for?",
        urgency_lead: "Why now?",
        cta: "Details and registration",
        reply_cta: "Reply to this message and we will get back to you shortly.",
        sign_off: "Thank you, the team at",
        short_suffix: None,
    },
    ToneProfile {
        tone: Tone::Friendly,
        name: "friendly",
        descriptor: "friendly: warm, welcoming and conversational",
        greeting: "Hi there,",
        invitation: "would love for you to",
        audience_lead: "Who will love it?",
        urgency_lead: "Why now?",
        cta: "Come take a look",
        reply_cta: "Just hit reply and we will be in touch soon.",
        sign_off: "Cheers, your friends at",
        short_suffix: Some("🙂"),
    },
    ToneProfile {
        tone: Tone::Sharp,
        name: "sharp",
        descriptor: "sharp: direct, punchy and to the point",
        greeting: "Straight to it:",
        invitation: "wants you to",
        audience_lead: "Built for:",
        urgency_lead: "The edge:",
        cta: "Act now",
        reply_cta: "Reply now to claim your spot.",
        sign_off: "The team at",
        short_suffix: Some("Act now."),
    },
    ToneProfile {
        tone: Tone::Humorous,
        name: "humorous",
        descriptor: "humorous: light, playful and gently witty",
        greeting: "Hey, you look like someone with great taste.",
        invitation: "is (politely) begging you to",
        audience_lead: "Who is this for? Possibly you:",
        urgency_lead: "Why now? Because later is overrated:",
        cta: "Go on, click it",
        reply_cta: "Reply to this message, we answer faster than a cat video loads.",
        sign_off: "With a grin, the team at",
        short_suffix: Some("😉"),
    },
    ToneProfile {
        tone: Tone::Formal,
        name: "formal",
        descriptor: "formal: courteous, polished and respectful",
        greeting: "Dear reader,",
        invitation: "cordially invites you to",
        audience_lead: "Intended for:",
        urgency_lead: "Of particular note:",
        cta: "For further details",
        reply_cta: "Kindly reply to this message and we will respond promptly.",
        sign_off: "Respectfully, the team at",
        short_suffix: None,
    },
];
