//! Channels and their shaping rules.
//!
//! Each [`Channel`] maps to exactly one static [`ChannelSpec`]. All generated
//! text passes through [`validate_and_shape`] before it leaves the engine.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PipelineError, ValidationError};

/// Appended when text is cut mid-content. Counts against the budget.
pub const TRUNCATION_MARKER: char = '…';

/// Sentence cuts are preferred only when they keep at least this share of the budget.
const SENTENCE_CUT_MIN_PERCENT: usize = 60;

// ─────────────────────────────────────────────
// Channel
// ─────────────────────────────────────────────

/// A delivery channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Social,
    Ads,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Email, Channel::Sms, Channel::Social, Channel::Ads];

    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    /// Capitalised label used in prompts and rendered headers.
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn spec(self) -> &'static ChannelSpec {
        match self {
            Channel::Email => &CHANNEL_SPECS[0],
            Channel::Sms => &CHANNEL_SPECS[1],
            Channel::Social => &CHANNEL_SPECS[2],
            Channel::Ads => &CHANNEL_SPECS[3],
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" | "e-mail" | "mail" => Ok(Channel::Email),
            "sms" | "text" => Ok(Channel::Sms),
            "social" | "facebook" | "instagram" | "tiktok" | "x" | "twitter" | "linkedin" => {
                Ok(Channel::Social)
            }
            "ads" | "ad" => Ok(Channel::Ads),
            _ => Err(ValidationError::UnknownChannel(s.trim().to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// ChannelSpec — static constraints
// ─────────────────────────────────────────────

/// Required layout of a channel's copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    /// `Subject:` / `Preheader:` header lines, then a free-form body.
    SubjectAndBody,
    /// One short block, no header lines.
    SingleBlock,
    /// Caption lines followed by an optional hashtag line.
    Post,
    /// `Headline:` / `Body:` / `CTA:` / optional `URL:` lines.
    HeadlineBodyCta,
}

/// Per-channel shaping rules.
#[derive(Clone, Debug)]
pub struct ChannelSpec {
    pub channel: Channel,
    pub name: &'static str,
    pub label: &'static str,
    /// Body budget in characters; `None` means uncapped.
    pub max_chars: Option<usize>,
    /// A soft cap keeps the trailing decoration line intact and shapes the rest.
    pub soft_cap: bool,
    pub structure: Structure,
    pub allows_emoji: bool,
    pub allows_hashtags: bool,
    pub max_hashtags: usize,
    pub subject_max_chars: Option<usize>,
}

pub static CHANNEL_SPECS: [ChannelSpec; 4] = [
    ChannelSpec {
        channel: Channel::Email,
        name: "email",
        label: "Email",
        max_chars: None,
        soft_cap: false,
        structure: Structure::SubjectAndBody,
        allows_emoji: false,
        allows_hashtags: false,
        max_hashtags: 0,
        subject_max_chars: Some(150),
    },
    ChannelSpec {
        channel: Channel::Sms,
        name: "sms",
        label: "SMS",
        max_chars: Some(160),
        soft_cap: false,
        structure: Structure::SingleBlock,
        allows_emoji: true,
        allows_hashtags: false,
        max_hashtags: 0,
        subject_max_chars: None,
    },
    ChannelSpec {
        channel: Channel::Social,
        name: "social",
        label: "Social",
        max_chars: Some(280),
        soft_cap: true,
        structure: Structure::Post,
        allows_emoji: true,
        allows_hashtags: true,
        max_hashtags: 3,
        subject_max_chars: None,
    },
    ChannelSpec {
        channel: Channel::Ads,
        name: "ads",
        label: "Ads",
        max_chars: Some(300),
        soft_cap: false,
        structure: Structure::HeadlineBodyCta,
        allows_emoji: false,
        allows_hashtags: false,
        max_hashtags: 0,
        subject_max_chars: None,
    },
];

// ─────────────────────────────────────────────
// Shaping
// ─────────────────────────────────────────────

/// Result of fitting text into a channel budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shaped {
    pub text: String,
    /// Content was dropped.
    pub truncated: bool,
    /// No word boundary fit, so the first token itself was cut.
    pub hard_cut: bool,
}

impl Shaped {
    fn intact(text: String) -> Self {
        Self {
            text,
            truncated: false,
            hard_cut: false,
        }
    }
}

static MULTI_BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Fit `text` to the channel's structure and budget.
///
/// Never cuts inside a word, hashtag or link unless a single token is longer
/// than the whole budget; that case is logged as [`PipelineError::ContentTooLong`].
pub fn validate_and_shape(channel: Channel, text: &str) -> Shaped {
    let spec = channel.spec();
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let normalized = normalized.trim();

    let shaped = match spec.structure {
        Structure::SubjectAndBody => shape_email(spec, normalized),
        Structure::SingleBlock => {
            let block: Vec<&str> = normalized
                .lines()
                .filter(|l| !is_header_line(l, "Subject:") && !is_header_line(l, "Preheader:"))
                .collect();
            let block = WHITESPACE_RE.replace_all(&block.join(" "), " ").trim().to_string();
            fit(spec, &block)
        }
        Structure::Post | Structure::HeadlineBodyCta => {
            let tidy = tidy_lines(normalized);
            fit_keeping_tail(spec, &tidy)
        }
    };

    if shaped.hard_cut {
        let err = PipelineError::ContentTooLong {
            channel,
            limit: spec.max_chars.unwrap_or_default(),
        };
        warn!(channel = %channel, "{err}; hard-truncated");
    }
    shaped
}

/// Truncate to at most `max_chars` characters at the nearest boundary.
///
/// Whenever content is dropped [`TRUNCATION_MARKER`] is appended and counts
/// against the budget. A sentence end that keeps most of the budget wins;
/// otherwise the cut falls on the last whole word.
pub fn truncate_at_boundary(text: &str, max_chars: usize) -> Shaped {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return Shaped::intact(text.to_string());
    }
    if max_chars == 0 {
        return Shaped {
            text: String::new(),
            truncated: true,
            hard_cut: true,
        };
    }

    let marker_limit = byte_offset(text, max_chars - 1);
    if let Some(end) = last_sentence_end(text, marker_limit) {
        let head = text[..end].trim_end();
        if head.chars().count() * 100 >= max_chars * SENTENCE_CUT_MIN_PERCENT {
            let mut out = head.to_string();
            out.push(TRUNCATION_MARKER);
            return Shaped {
                text: out,
                truncated: true,
                hard_cut: false,
            };
        }
    }

    let next_is_break = text[marker_limit..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace);
    let cut = if next_is_break {
        Some(marker_limit)
    } else {
        text[..marker_limit].rfind(char::is_whitespace)
    };

    let head = cut.map(|c| trim_dangling(text[..c].trim_end())).unwrap_or("");
    if head.is_empty() {
        let mut out: String = text.chars().take(max_chars - 1).collect();
        out.push(TRUNCATION_MARKER);
        return Shaped {
            text: out,
            truncated: true,
            hard_cut: true,
        };
    }

    let mut out = head.to_string();
    out.push(TRUNCATION_MARKER);
    Shaped {
        text: out,
        truncated: true,
        hard_cut: false,
    }
}

fn shape_email(spec: &ChannelSpec, text: &str) -> Shaped {
    let text = MULTI_BLANK_RE.replace_all(text, "\n\n");
    let mut truncated = false;
    let mut hard_cut = false;
    let mut lines = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        match (spec.subject_max_chars, strip_header(line, "Subject:")) {
            (Some(max), Some(subject)) => {
                let shaped = truncate_at_boundary(subject, max);
                truncated |= shaped.truncated;
                hard_cut |= shaped.hard_cut;
                lines.push(format!("Subject: {}", shaped.text));
            }
            _ => lines.push(line.to_string()),
        }
    }
    Shaped {
        text: lines.join("\n"),
        truncated,
        hard_cut,
    }
}

fn fit(spec: &ChannelSpec, text: &str) -> Shaped {
    match spec.max_chars {
        Some(max) => truncate_at_boundary(text, max),
        None => Shaped::intact(text.to_string()),
    }
}

/// Shape multi-line copy, keeping the trailing protected lines whole.
///
/// Protected lines are hashtag lines, `CTA:` / `URL:` lines and lines that
/// carry a link. Only the lines above them are shortened.
fn fit_keeping_tail(spec: &ChannelSpec, text: &str) -> Shaped {
    let Some(max) = spec.max_chars else {
        return Shaped::intact(text.to_string());
    };
    if text.chars().count() <= max {
        return Shaped::intact(text.to_string());
    }

    let lines: Vec<&str> = text.lines().collect();
    let split = lines
        .iter()
        .rposition(|l| !is_protected_line(l))
        .map_or(0, |i| i + 1);
    if split > 0 && split < lines.len() {
        let head = lines[..split].join("\n");
        let tail = lines[split..].join("\n");
        let tail_len = tail.chars().count() + 1;
        if tail_len < max {
            let mut shaped = truncate_at_boundary(&head, max - tail_len);
            if !shaped.text.is_empty() {
                shaped.text.push('\n');
                shaped.text.push_str(&tail);
                return shaped;
            }
        }
    }
    truncate_at_boundary(text, max)
}

fn is_protected_line(line: &str) -> bool {
    is_hashtag_line(line)
        || is_header_line(line, "URL:")
        || is_header_line(line, "CTA:")
        || line.split_whitespace().any(|t| t.contains("://") || t.starts_with("www."))
}

fn tidy_lines(text: &str) -> String {
    let text = MULTI_BLANK_RE.replace_all(text, "\n\n");
    text.lines()
        .map(|l| SPACES_RE.replace_all(l.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value after a case-insensitive `header` label, ignoring leading whitespace.
fn strip_header<'a>(line: &'a str, header: &str) -> Option<&'a str> {
    let line = line.trim_start();
    line.get(..header.len())
        .filter(|p| p.eq_ignore_ascii_case(header))
        .map(|_| line[header.len()..].trim())
}

fn is_header_line(line: &str, header: &str) -> bool {
    line.trim_start()
        .get(..header.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(header))
}

fn is_hashtag_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| t.starts_with('#') && t.len() > 1)
}

/// Byte offset of the `n`-th character, or the string length.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// End (exclusive, in bytes) of the last complete sentence within `text[..limit]`.
fn last_sentence_end(text: &str, limit: usize) -> Option<usize> {
    let window = &text[..limit];
    window
        .char_indices()
        .filter(|(_, c)| matches!(c, '.' | '!' | '?'))
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&end| text[end..].chars().next().is_none_or(char::is_whitespace))
        .last()
}

/// Drop connector punctuation left hanging before the marker.
fn trim_dangling(head: &str) -> &str {
    let last_token = head.rsplit(char::is_whitespace).next().unwrap_or("");
    if is_protected_token(last_token) {
        return head;
    }
    head.trim_end_matches([',', ';', ':', '-', '–', '—', '(', ' '])
        .trim_end()
}

fn is_protected_token(token: &str) -> bool {
    token.starts_with('#')
        || token.starts_with('@')
        || token.contains("://")
        || token.starts_with("www.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_split_tokens(original: &str, shaped: &str) {
        let body = shaped.trim_end_matches(TRUNCATION_MARKER);
        let words: Vec<&str> = original.split_whitespace().collect();
        for token in body.split_whitespace() {
            assert!(words.contains(&token), "token '{token}' was split");
        }
    }

    #[test]
    fn test_channel_aliases() {
        assert_eq!("E-Mail".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("instagram".parse::<Channel>().unwrap(), Channel::Social);
        assert_eq!("X".parse::<Channel>().unwrap(), Channel::Social);
        assert_eq!("ad".parse::<Channel>().unwrap(), Channel::Ads);
        assert!(matches!(
            "fax".parse::<Channel>(),
            Err(ValidationError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_every_channel_has_its_own_spec() {
        for channel in Channel::ALL {
            assert_eq!(channel.spec().channel, channel);
            assert_eq!(channel.to_string(), channel.spec().name);
        }
        assert_eq!(Channel::Sms.spec().max_chars, Some(160));
        assert_eq!(Channel::Email.spec().max_chars, None);
    }

    #[test]
    fn test_short_text_untouched() {
        let shaped = truncate_at_boundary("Spring Sale starts today", 160);
        assert_eq!(shaped.text, "Spring Sale starts today");
        assert!(!shaped.truncated);
    }

    #[test]
    fn test_sms_300_chars_cut_at_word_with_marker() {
        let text = "Spring Sale members get early access to every discounted item in the store \
                    and free shipping on orders over fifty dollars plus a surprise gift with \
                    purchase while supplies last so tell your friends and family and come \
                    visit us this weekend for live music snacks demos and many more great \
                    reasons to stop by";
        assert!(text.chars().count() >= 300);
        let shaped = validate_and_shape(Channel::Sms, text);
        assert!(shaped.text.chars().count() <= 160);
        assert!(shaped.text.ends_with(TRUNCATION_MARKER));
        assert!(shaped.truncated);
        assert!(!shaped.hard_cut);
        assert_no_split_tokens(text, &shaped.text);
    }

    #[test]
    fn test_prefers_sentence_end_with_marker() {
        let text = "Our spring sale is here with deals on everything you love. \
                    Come early because the best items always go first and we cannot restock them";
        let shaped = truncate_at_boundary(text, 80);
        assert_eq!(
            shaped.text,
            "Our spring sale is here with deals on everything you love.…"
        );
        assert!(shaped.truncated);
    }

    #[test]
    fn test_sms_several_sentences_cut_with_marker() {
        let text = "Spring Sale starts Friday at the Corner Bakery with fresh sourdough. \
                    Every pastry is half off for members and their families all day long. \
                    Bring a friend and both of you get a free coffee for the whole weekend. \
                    Doors open at seven.";
        assert!(text.chars().count() > 200);
        let shaped = validate_and_shape(Channel::Sms, text);
        assert!(shaped.text.chars().count() <= 160);
        assert!(shaped.truncated);
        assert!(shaped.text.ends_with(TRUNCATION_MARKER));
        assert!(shaped.text.starts_with("Spring Sale starts Friday"));
        assert_no_split_tokens(text, &shaped.text);
    }

    #[test]
    fn test_exact_sentence_at_budget_still_marked() {
        let text = "Fresh bread. More bread";
        let shaped = truncate_at_boundary(text, 12);
        assert!(shaped.text.chars().count() <= 12);
        assert!(shaped.text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_never_cuts_inside_link() {
        let text = "Grab the deal at https://example.com/spring-sale/offers/today before it ends";
        let shaped = truncate_at_boundary(text, 40);
        assert!(shaped.text.chars().count() <= 40);
        assert!(!shaped.text.contains("https"));
        assert_no_split_tokens(text, &shaped.text);
    }

    #[test]
    fn test_trims_dangling_connector() {
        let shaped = truncate_at_boundary("Fresh bread, pastries, coffee and more", 23);
        assert_eq!(shaped.text, "Fresh bread, pastries…");
    }

    #[test]
    fn test_single_oversized_token_hard_cut() {
        let text = "a".repeat(50);
        let shaped = truncate_at_boundary(&text, 10);
        assert!(shaped.hard_cut);
        assert_eq!(shaped.text.chars().count(), 10);
        assert!(shaped.text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "שלום ".repeat(50);
        let shaped = truncate_at_boundary(&text, 30);
        assert!(shaped.text.chars().count() <= 30);
    }

    #[test]
    fn test_sms_strips_subject_and_joins_lines() {
        let shaped = validate_and_shape(Channel::Sms, "Subject: Hi\nSpring Sale:\r\nhalf off");
        assert_eq!(shaped.text, "Spring Sale: half off");
    }

    #[test]
    fn test_email_body_uncapped_subject_capped() {
        let body = "word ".repeat(400);
        let long_subject = "Big ".repeat(60);
        let text = format!("Subject: {long_subject}\n\n\n\n{body}");
        let shaped = validate_and_shape(Channel::Email, &text);
        let first = shaped.text.lines().next().unwrap();
        assert!(first.chars().count() <= "Subject: ".len() + 150);
        assert!(shaped.text.contains(body.trim()));
        assert!(!shaped.text.contains("\n\n\n"));
    }

    #[test]
    fn test_social_keeps_hashtag_line() {
        let caption = "Spring Sale is on with fresh deals every single day ".repeat(8);
        let text = format!("{caption}\n#CornerBakery #SpringSale");
        let shaped = validate_and_shape(Channel::Social, &text);
        assert!(shaped.text.chars().count() <= 280);
        assert!(shaped.text.ends_with("\n#CornerBakery #SpringSale"));
        assert!(shaped.truncated);
    }

    #[test]
    fn test_email_subject_label_any_case_is_capped() {
        let long_subject = "Big ".repeat(80);
        let text = format!("  subject: {long_subject}\n\nHello there.");
        let shaped = validate_and_shape(Channel::Email, &text);
        let first = shaped.text.lines().next().unwrap();
        assert!(first.starts_with("Subject: "));
        assert!(first.chars().count() <= "Subject: ".len() + 150);
        assert!(shaped.truncated);
        assert!(shaped.text.ends_with("Hello there."));
    }

    #[test]
    fn test_social_keeps_link_line_and_hashtags() {
        let caption = "Spring Sale is on with fresh deals every single day ".repeat(8);
        let text = format!(
            "{caption}\nCome take a look: https://bakery.example.com/spring\n#CornerBakery #SpringSale"
        );
        let shaped = validate_and_shape(Channel::Social, &text);
        assert!(shaped.text.chars().count() <= 280);
        assert!(shaped.text.ends_with(
            "\nCome take a look: https://bakery.example.com/spring\n#CornerBakery #SpringSale"
        ));
    }

    #[test]
    fn test_ads_keep_cta_line_without_url() {
        let body = "Body: ".to_string() + &"great value for the whole family ".repeat(12);
        let text = format!("Headline: Spring Sale\n{body}\nCTA: Shop now");
        let shaped = validate_and_shape(Channel::Ads, &text);
        assert!(shaped.text.chars().count() <= 300);
        assert!(shaped.text.starts_with("Headline: Spring Sale\nBody: great value"));
        assert!(shaped.text.ends_with("\nCTA: Shop now"));
    }

    #[test]
    fn test_ads_keep_url_line() {
        let body = "Body: ".to_string() + &"great value for the whole family ".repeat(12);
        let text = format!("Headline: Spring Sale\n{body}\nCTA: Shop now\nURL: https://shop.example.com");
        let shaped = validate_and_shape(Channel::Ads, &text);
        assert!(shaped.text.chars().count() <= 300);
        assert!(shaped.text.ends_with("URL: https://shop.example.com"));
    }
}
