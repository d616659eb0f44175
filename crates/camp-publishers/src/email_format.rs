//! Email normalisation applied right before a live send.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

static SUBJECT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[[^\]]{1,30}\]\s*").unwrap());
static BODY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]\n]{1,30}\]").unwrap());
static LINK_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[link\]|<short link>|<link>").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://").unwrap());
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());
static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static MULTI_SPACE_ANY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static MULTI_BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip every bracket tag and prefix `tag` exactly once.
pub fn normalize_subject(raw: &str, tag: &str) -> String {
    let cleaned = SUBJECT_TAG_RE.replace_all(raw, " ");
    let cleaned = MULTI_SPACE_ANY_RE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();
    let tag = tag.trim();
    if tag.is_empty() || cleaned.starts_with(tag) {
        cleaned.to_string()
    } else if cleaned.is_empty() {
        tag.to_string()
    } else {
        format!("{tag} {cleaned}")
    }
}

/// Add `https://` when the scheme is missing. Blank input gives `None`.
pub fn normalize_link(raw: Option<&str>) -> Option<String> {
    let link = raw?.trim();
    if link.is_empty() {
        None
    } else if SCHEME_RE.is_match(link) {
        Some(link.to_string())
    } else {
        Some(format!("https://{link}"))
    }
}

/// Substitute link placeholders, drop bracket tags, ensure a link is present
/// and collapse runs of whitespace.
pub fn normalize_body(raw: &str, link: &str) -> String {
    let body = raw.replace("\r\n", "\n");
    let body = LINK_PLACEHOLDER_RE.replace_all(&body, NoExpand(link));
    let body = BODY_TAG_RE.replace_all(&body, "");
    let mut body = body.into_owned();

    if !URL_RE.is_match(&body) {
        body = format!("{}\n\nLink: {link}", body.trim_end());
    }

    let body = MULTI_SPACE_RE.replace_all(&body, " ");
    let body = MULTI_BLANK_RE.replace_all(&body, "\n\n");
    body.trim().to_string()
}
