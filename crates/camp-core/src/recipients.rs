//! Recipient parsing and validation.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::ValidationError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{6,14}$").unwrap());

/// A syntactically valid delivery address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "lowercase")]
pub enum Recipient {
    Email(String),
    /// E.164-style number, digits only apart from a leading `+`.
    Phone(String),
}

impl Recipient {
    pub fn email(raw: &str) -> Result<Self, ValidationError> {
        let cleaned = strip_wrapping(raw);
        if EMAIL_RE.is_match(cleaned) {
            Ok(Recipient::Email(cleaned.to_string()))
        } else {
            Err(ValidationError::MalformedEmail(raw.trim().to_string()))
        }
    }

    pub fn phone(raw: &str) -> Result<Self, ValidationError> {
        let cleaned: String = strip_wrapping(raw)
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();
        if PHONE_RE.is_match(&cleaned) {
            Ok(Recipient::Phone(cleaned))
        } else {
            Err(ValidationError::MalformedPhone(raw.trim().to_string()))
        }
    }

    /// Classify by shape: anything with an `@` is treated as an email.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.contains('@') {
            Self::email(raw)
        } else {
            Self::phone(raw)
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Recipient::Email(a) | Recipient::Phone(a) => a,
        }
    }

    /// Whether this recipient can be addressed on `channel`.
    ///
    /// Social and ads publish to an audience, not to recipients, so they
    /// accept any recipient for bookkeeping.
    pub fn fits(&self, channel: Channel) -> bool {
        match (self, channel) {
            (Recipient::Email(_), Channel::Email) => true,
            (Recipient::Phone(_), Channel::Sms) => true,
            (_, Channel::Social | Channel::Ads) => true,
            _ => false,
        }
    }

    fn dedup_key(&self) -> String {
        match self {
            Recipient::Email(a) => a.to_lowercase(),
            Recipient::Phone(a) => a.clone(),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

/// Outcome of parsing a free-text recipient list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipientList {
    pub accepted: Vec<Recipient>,
    /// Rejected entries with the raw input and the reason.
    pub rejected: Vec<(String, ValidationError)>,
}

impl RecipientList {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Check that every accepted recipient can receive `channel` messages.
    pub fn ensure_fits(&self, channel: Channel) -> Result<(), ValidationError> {
        if self.accepted.is_empty() {
            return Err(ValidationError::NoRecipients(channel));
        }
        match self.accepted.iter().find(|r| !r.fits(channel)) {
            Some(r) => Err(ValidationError::WrongRecipientKind {
                recipient: r.address().to_string(),
                channel,
            }),
            None => Ok(()),
        }
    }
}

/// Parse a recipient list: one entry per line, commas, semicolons and tabs
/// also separate. Quotes and angle brackets are stripped, duplicates are
/// dropped keeping first-seen order, malformed entries are rejected one by one.
pub fn parse_recipient_list(text: &str) -> RecipientList {
    let mut seen = HashSet::new();
    let mut list = RecipientList::default();

    for raw in text.split(['\n', '\r', ',', ';', '\t']) {
        if strip_wrapping(raw).is_empty() {
            continue;
        }
        match Recipient::parse(raw) {
            Ok(recipient) => {
                if seen.insert(recipient.dedup_key()) {
                    list.accepted.push(recipient);
                }
            }
            Err(err) => list.rejected.push((raw.trim().to_string(), err)),
        }
    }
    list
}

/// Parse a comma-separated list of email addresses, silently skipping bad ones.
pub fn parse_email_list(text: &str) -> Vec<String> {
    parse_recipient_list(text)
        .accepted
        .into_iter()
        .filter_map(|r| match r {
            Recipient::Email(a) => Some(a),
            Recipient::Phone(_) => None,
        })
        .collect()
}

fn strip_wrapping(raw: &str) -> &str {
    raw.trim().trim_matches(['<', '>', '"', '\'', ' '])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators_and_dedup() {
        let list = parse_recipient_list(
            "ana@example.com, <bo@example.org>\n\"ana@example.com\"; cy@example.net\tANA@example.com",
        );
        let addrs: Vec<&str> = list.accepted.iter().map(|r| r.address()).collect();
        assert_eq!(addrs, vec!["ana@example.com", "bo@example.org", "cy@example.net"]);
        assert!(list.rejected.is_empty());
    }

    #[test]
    fn test_malformed_rejected_individually() {
        let list = parse_recipient_list("good@example.com\nbad@nowhere\n\nalso-bad@");
        assert_eq!(list.accepted.len(), 1);
        assert_eq!(list.rejected.len(), 2);
        assert_eq!(
            list.rejected[0],
            (
                "bad@nowhere".to_string(),
                ValidationError::MalformedEmail("bad@nowhere".into())
            )
        );
    }

    #[test]
    fn test_phone_numbers_normalized() {
        let r = Recipient::parse("+1 (555) 010-9999").unwrap();
        assert_eq!(r, Recipient::Phone("+15550109999".into()));
        assert!(matches!(
            Recipient::parse("12"),
            Err(ValidationError::MalformedPhone(_))
        ));
    }

    #[test]
    fn test_ensure_fits() {
        let list = parse_recipient_list("+15550109999");
        assert!(list.ensure_fits(Channel::Sms).is_ok());
        assert_eq!(
            list.ensure_fits(Channel::Email),
            Err(ValidationError::WrongRecipientKind {
                recipient: "+15550109999".into(),
                channel: Channel::Email,
            })
        );
        assert_eq!(
            RecipientList::default().ensure_fits(Channel::Email),
            Err(ValidationError::NoRecipients(Channel::Email))
        );
    }

    #[test]
    fn test_parse_email_list_skips_phones() {
        let emails = parse_email_list("a@b.io,+15550109999,  ,c@d.io");
        assert_eq!(emails, vec!["a@b.io", "c@d.io"]);
    }
}
