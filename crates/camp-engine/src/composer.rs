//! Deterministic template composer — the no-provider path.
//!
//! Output depends only on the campaign facts, channel and tone, so the same
//! inputs always produce byte-identical text. Tone picks connectors, greetings
//! and CTA verbs; audience, objective and landing link are copied verbatim.

use std::sync::LazyLock;

use regex::Regex;

use camp_core::{truncate_at_boundary, Brief, Campaign, Channel, GenerationSource, Tone};

static NON_TAG_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());

const DEFAULT_HASHTAGS: &[&str] = &["#SmallBiz", "#CampaignLaunch"];
const DEFAULT_OBJECTIVE: &str = "join, register or buy";

/// Template-based generator used when no provider is configured or a call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicComposer;

impl DeterministicComposer {
    /// Brief built from the campaign facts alone.
    pub fn brief(&self, campaign: &Campaign) -> Brief {
        let audience = non_empty(&campaign.audience).unwrap_or("the target audience");
        let objective = objective(campaign);
        let benefit = short_benefit(campaign);

        let call_to_action = match campaign.landing_link() {
            Some(link) => format!("Act now: {objective} at {link}"),
            None => format!("Act now: {objective}, reply or get in touch"),
        };

        let mut channel_strategy: Vec<String> = campaign
            .channels
            .iter()
            .map(|c| channel_strategy_line(*c).to_string())
            .collect();
        if channel_strategy.is_empty() {
            channel_strategy.push("Pick at least one channel (email, sms, social or ads).".into());
        }
        channel_strategy.push("Schedule: launch, then a reminder, then a last call.".into());

        let mut metrics = vec![
            format!("Primary: conversions toward \"{objective}\""),
            "Supporting: CTR, opens, clicks, cost per conversion".to_string(),
        ];
        if let Some(budget) = campaign.budget.as_deref().and_then(non_empty) {
            metrics.push(format!("Spend tracked against the budget of {budget}"));
        }

        Brief {
            campaign_id: campaign.id.clone(),
            name: campaign.name.clone(),
            objective: campaign.objective.clone(),
            audience: campaign.audience.clone(),
            channels: campaign.channels.clone(),
            budget: campaign.budget.clone(),
            landing_url: campaign.landing_link().map(str::to_string),
            problem: format!(
                "{} need a short, clear reason to {objective} now.",
                capitalize(audience)
            ),
            key_message: format!(
                "{}: {benefit}, in words that speak to {audience}.",
                campaign.business_or_name()
            ),
            call_to_action,
            channel_strategy,
            metrics,
            source: GenerationSource::Composer,
        }
    }

    /// Rendered copy for one channel. Email carries `Subject:` / `Preheader:` lines.
    pub fn content_text(&self, campaign: &Campaign, channel: Channel, tone: Tone) -> String {
        let profile = tone.profile();
        let title = title(campaign);
        let benefit = short_benefit(campaign);
        let objective = objective(campaign);
        let link = campaign.landing_link();
        let cta_line = match link {
            Some(link) => format!("{}: {link}", profile.cta),
            None => profile.reply_cta.to_string(),
        };

        match channel {
            Channel::Email => {
                let subject = format!("{title} — {benefit}");
                let preheader = if benefit.to_lowercase().contains("spots") {
                    "Last spots • Quick registration"
                } else {
                    "Limited-time offer • Quick sign-up"
                };
                let audience = match non_empty(&campaign.audience) {
                    Some(a) => format!("• {a}"),
                    None => "• Everyone this offer was made for".to_string(),
                };
                let body = [
                    profile.greeting.to_string(),
                    format!(
                        "{} {} {}",
                        campaign.business_or_name(),
                        profile.invitation,
                        sentence(objective)
                    ),
                    profile.audience_lead.to_string(),
                    audience,
                    profile.urgency_lead.to_string(),
                    format!("• {benefit}"),
                    String::new(),
                    cta_line,
                    String::new(),
                    format!("{} {}", profile.sign_off, non_empty(&campaign.name).unwrap_or("Camp")),
                ]
                .join("\n");
                format!("Subject: {subject}\nPreheader: {preheader}\n\n{body}")
            }
            Channel::Sms => {
                let max = Channel::Sms.spec().max_chars.unwrap_or(160);
                compose_sms(&format!("{title}: {benefit}"), tone, link, max)
            }
            Channel::Social => {
                let headline = profile.style_short(&format!("{title} — {benefit}"));
                let body = format!("{}: {}", campaign.business_or_name(), sentence(objective));
                let tail = [
                    cta_line,
                    hashtags(campaign, Channel::Social.spec().max_hashtags).join(" "),
                ]
                .join("\n");
                with_fixed_tail(&headline, &body, &tail, Channel::Social)
            }
            Channel::Ads => {
                let headline = format!("Headline: {title} — {benefit}");
                let body = format!(
                    "Body: {}: {} Short, simple and focused.",
                    campaign.business_or_name(),
                    sentence(objective)
                );
                let mut tail = vec![format!("CTA: {}", profile.cta)];
                if let Some(link) = link {
                    tail.push(format!("URL: {link}"));
                }
                with_fixed_tail(&headline, &body, &tail.join("\n"), Channel::Ads)
            }
        }
    }

    /// Canned idea fragments, in a fixed order.
    pub fn ideas(&self, campaign: &Campaign, channel: Channel, tone: Tone, link: Option<&str>) -> Vec<String> {
        let title = title(campaign);
        let close = match link {
            Some(link) => format!("then a CTA to {link}."),
            None => "then a CTA.".to_string(),
        };
        vec![
            format!("{title}: one sharp benefit angle plus short proof (experience or a result), {close}"),
            format!(
                "A one-line customer story for {} and what they got out of it, then a CTA.",
                channel.label()
            ),
            "A limited-time offer (no hard dates unless given) with one simple action, then a CTA."
                .to_string(),
            format!(
                "Defuse a common objection in one {} sentence, promise a short fix, then a CTA.",
                tone.as_str()
            ),
        ]
    }
}

// ─────────────────────────────────────────────
// Shared helpers (also used on the provider path)
// ─────────────────────────────────────────────

/// One-line benefit derived from keywords in the business description and objective.
pub fn short_benefit(campaign: &Campaign) -> String {
    let biz = campaign.business_description.to_lowercase();
    let goal = campaign.objective.to_lowercase();
    let name = campaign.name.to_lowercase();

    if contains_any(&biz, &["workshop", "class", "course", "crafts", "studio", "camp"]) {
        if name.contains("holiday") || goal.contains("holiday") {
            return "Last spots for the holidays".to_string();
        }
        return "A hands-on workshop with quick registration".to_string();
    }
    if goal.contains("webinar") {
        return "Free webinar, register now".to_string();
    }
    if contains_any(&goal, &["register", "registration", "sign up", "sign-up", "join"]) {
        return "Join in one click".to_string();
    }
    if contains_any(&goal, &["sale", "purchase", "buy", "order", "shop"]) {
        return "Limited-time offer".to_string();
    }
    non_empty(&campaign.objective)
        .map(str::to_string)
        .unwrap_or_else(|| "An offer you won't want to miss".to_string())
}

/// Up to `max` hashtags from the business description and campaign name.
pub fn hashtags(campaign: &Campaign, max: usize) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for source in [&campaign.business_description, &campaign.name] {
        let cleaned = NON_TAG_CHARS_RE.replace_all(source, "");
        let tag: String = cleaned.split_whitespace().take(3).map(capitalize).collect();
        if !tag.is_empty() {
            let tag = format!("#{tag}");
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    if tags.is_empty() {
        tags = DEFAULT_HASHTAGS.iter().map(|t| t.to_string()).collect();
    }
    tags.truncate(max);
    tags
}

/// Tone-styled SMS line with the link kept whole at the end.
pub fn compose_sms(core: &str, tone: Tone, link: Option<&str>, max: usize) -> String {
    let styled = tone.profile().style_short(core);
    match link {
        Some(link) => {
            let reserved = link.chars().count() + 1;
            if reserved >= max {
                return truncate_at_boundary(&format!("{styled} {link}"), max).text;
            }
            let head = truncate_at_boundary(&styled, max - reserved).text;
            format!("{head} {link}")
        }
        None => truncate_at_boundary(&styled, max).text,
    }
}

/// Headline and body shortened so that `tail` (CTA, link, hashtags) always
/// fits unchanged within the channel budget.
fn with_fixed_tail(headline: &str, body: &str, tail: &str, channel: Channel) -> String {
    let full = format!("{headline}\n{body}\n{tail}");
    let Some(max) = channel.spec().max_chars else {
        return full;
    };
    let tail_len = tail.chars().count() + 1;
    if full.chars().count() <= max || tail_len >= max {
        return full;
    }

    let budget = max - tail_len;
    let headline = if headline.chars().count() > budget / 2 {
        truncate_at_boundary(headline, budget / 2).text
    } else {
        headline.to_string()
    };
    let rest = budget.saturating_sub(headline.chars().count() + 1);
    let body = truncate_at_boundary(body, rest).text;
    if body.is_empty() {
        format!("{headline}\n{tail}")
    } else {
        format!("{headline}\n{body}\n{tail}")
    }
}

fn channel_strategy_line(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "Email: a catchy subject line, a short body and one prominent CTA.",
        Channel::Sms => "SMS: one clear sentence under 160 characters plus the link.",
        Channel::Social => "Social: a 2-4 line post with up to 3 hashtags and a short CTA.",
        Channel::Ads => "Ads: headline, body and CTA tuned for clicks.",
    }
}

fn title(campaign: &Campaign) -> &str {
    non_empty(&campaign.name).unwrap_or_else(|| campaign.business_or_name())
}

fn objective(campaign: &Campaign) -> &str {
    non_empty(&campaign.objective).unwrap_or(DEFAULT_OBJECTIVE)
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Terminate with a period unless the text already ends in punctuation.
pub(crate) fn sentence(text: &str) -> String {
    let text = text.trim();
    if text.ends_with(['.', '!', '?', '…']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spring_sale() -> Campaign {
        Campaign {
            id: "c-1".into(),
            name: "Spring Sale".into(),
            audience: "local families".into(),
            objective: "drive weekend purchases".into(),
            channels: vec![Channel::Email, Channel::Sms],
            budget: Some("500".into()),
            business_description: "Corner bakery".into(),
            landing_url: Some("https://bakery.example.com/spring".into()),
        }
    }

    #[test]
    fn test_short_benefit_keywords() {
        let mut c = spring_sale();
        assert_eq!(short_benefit(&c), "Limited-time offer");

        c.objective = "Webinar sign-ups".into();
        assert_eq!(short_benefit(&c), "Free webinar, register now");

        c.objective = "Registration for members".into();
        assert_eq!(short_benefit(&c), "Join in one click");

        c.business_description = "Pottery workshop".into();
        assert_eq!(short_benefit(&c), "A hands-on workshop with quick registration");

        c.name = "Holiday clay".into();
        assert_eq!(short_benefit(&c), "Last spots for the holidays");

        let plain = Campaign {
            objective: "Grow awareness".into(),
            ..Campaign::default()
        };
        assert_eq!(short_benefit(&plain), "Grow awareness");
    }

    #[test]
    fn test_hashtags() {
        let c = spring_sale();
        assert_eq!(hashtags(&c, 3), vec!["#CornerBakery", "#SpringSale"]);
        assert_eq!(hashtags(&c, 1), vec!["#CornerBakery"]);
        assert_eq!(hashtags(&Campaign::default(), 3), vec!["#SmallBiz", "#CampaignLaunch"]);

        let punctuated = Campaign {
            name: "Mom & Pop's 50% off!".into(),
            ..Campaign::default()
        };
        assert_eq!(hashtags(&punctuated, 3), vec!["#MomPops50"]);
    }

    #[test]
    fn test_email_template_structure() {
        let text = DeterministicComposer.content_text(&spring_sale(), Channel::Email, Tone::Professional);
        assert!(text.starts_with("Subject: Spring Sale — Limited-time offer\nPreheader: "));
        assert!(text.contains("Corner bakery invites you to drive weekend purchases."));
        assert!(text.contains("• local families"));
        assert!(text.contains("Details and registration: https://bakery.example.com/spring"));
        assert!(text.ends_with("Thank you, the team at Spring Sale"));
    }

    #[test]
    fn test_email_without_link_uses_reply_cta() {
        let mut c = spring_sale();
        c.landing_url = None;
        let text = DeterministicComposer.content_text(&c, Channel::Email, Tone::Formal);
        assert!(text.contains(Tone::Formal.profile().reply_cta));
    }

    #[test]
    fn test_sms_keeps_link_whole() {
        let mut c = spring_sale();
        c.name = "Spring Sale ".repeat(20);
        let text = DeterministicComposer.content_text(&c, Channel::Sms, Tone::Friendly);
        assert!(text.chars().count() <= 160);
        assert!(text.ends_with(" https://bakery.example.com/spring"));
    }

    #[test]
    fn test_sms_sharp_style() {
        let text = DeterministicComposer.content_text(&spring_sale(), Channel::Sms, Tone::Sharp);
        assert_eq!(
            text,
            "Spring Sale: Limited-time offer. Act now. https://bakery.example.com/spring"
        );
    }

    #[test]
    fn test_social_and_ads_templates() {
        let c = spring_sale();
        let social = DeterministicComposer.content_text(&c, Channel::Social, Tone::Humorous);
        assert!(social.starts_with("Spring Sale — Limited-time offer 😉\n"));
        assert!(social.ends_with("#CornerBakery #SpringSale"));

        let ads = DeterministicComposer.content_text(&c, Channel::Ads, Tone::Sharp);
        assert!(ads.contains("CTA: Act now"));
        assert!(ads.ends_with("URL: https://bakery.example.com/spring"));
    }

    #[test]
    fn test_long_objective_keeps_cta_and_link() {
        let mut c = spring_sale();
        c.objective = "bring neighbors in for fresh sourdough, seasonal pastries, ".repeat(6);
        let link = "https://bakery.example.com/spring";

        let social = DeterministicComposer.content_text(&c, Channel::Social, Tone::Friendly);
        assert!(social.chars().count() <= 280);
        assert!(social.contains(&format!("Come take a look: {link}")));
        assert!(social.ends_with("#CornerBakery #SpringSale"));
        assert!(social.contains("Corner bakery: bring neighbors in"));

        let ads = DeterministicComposer.content_text(&c, Channel::Ads, Tone::Friendly);
        assert!(ads.chars().count() <= 300);
        assert!(ads.contains("\nBody: Corner bakery: bring neighbors in"));
        assert!(ads.contains("\nCTA: "));
        assert!(ads.ends_with(&format!("URL: {link}")));
    }

    #[test]
    fn test_brief_from_facts() {
        let brief = DeterministicComposer.brief(&spring_sale());
        assert_eq!(brief.source, GenerationSource::Composer);
        assert_eq!(brief.objective, "drive weekend purchases");
        assert!(brief.call_to_action.contains("https://bakery.example.com/spring"));
        assert_eq!(brief.channel_strategy.len(), 3);
        assert!(brief.metrics.iter().any(|m| m.contains("500")));
        assert!(brief.problem.starts_with("Local families"));
    }

    #[test]
    fn test_ideas_fixed_and_linked() {
        let ideas = DeterministicComposer.ideas(
            &spring_sale(),
            Channel::Social,
            Tone::Friendly,
            Some("https://bakery.example.com"),
        );
        assert_eq!(ideas.len(), 4);
        assert!(ideas[0].ends_with("then a CTA to https://bakery.example.com."));
        assert!(ideas.iter().all(|i| i.split_whitespace().count() >= 3));
    }
}
