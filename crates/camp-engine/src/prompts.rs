//! Prompt builder — system instruction and per-task prompts for the provider path.

use camp_core::{Brief, Campaign, Channel, Tone};

/// Shared system instruction for every generation call.
pub const SYSTEM_PROMPT: &str = "You write marketing copy for small businesses. \
     Write short, clear and natural text. \
     Never use square brackets, placeholders or artificial tags. \
     Treat the target audience as a persona to write for, never greet readers by segment name. \
     Use facts exactly as given: do not invent prices, dates or links.";

fn or_dash(s: &str) -> &str {
    let s = s.trim();
    if s.is_empty() {
        "—"
    } else {
        s
    }
}

fn facts_block(campaign: &Campaign) -> String {
    format!(
        "Campaign name: {name}\n\
         Business: {biz}\n\
         Target audience: {audience}\n\
         Objective: {objective}\n\
         Landing URL: {url}\n",
        name = or_dash(&campaign.name),
        biz = or_dash(&campaign.business_description),
        audience = or_dash(&campaign.audience),
        objective = or_dash(&campaign.objective),
        url = campaign.landing_link().unwrap_or("—"),
    )
}

/// Asks for the interpretive part of a brief only, as JSON.
pub fn brief_prompt(campaign: &Campaign) -> String {
    let channels = campaign
        .channels
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Summarise this campaign for the team that will write its copy.\n\
         Reply with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"problem\": \"...\", \"keyMessage\": \"...\", \"callToAction\": \"...\"}}\n\
         Each value is one sentence.\n\n\
         {facts}\
         Channels: {channels}\n\
         Budget: {budget}\n",
        facts = facts_block(campaign),
        channels = or_dash(&channels),
        budget = campaign.budget_or_na(),
    )
}

fn channel_rules(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => {
            "Format: a 'Subject:' line, then a 'Preheader:' line, then a 'Body:' line followed by \
             a short, factual body with one call to action. Work the URL in naturally if there is one."
        }
        Channel::Sms => {
            "Format: one clear sentence of at most 150 characters, plus the URL if there is one. \
             No subject line."
        }
        Channel::Social => {
            "Format: a short post of 2-4 lines, 1-3 relevant hashtags on the last line, \
             a short call to action and the URL if there is one."
        }
        Channel::Ads => {
            "Format: three lines 'Headline:', 'Body:', 'CTA:' and, if there is a URL, \
             a final 'URL:' line."
        }
    }
}

/// Channel copy prompt.
pub fn content_prompt(campaign: &Campaign, channel: Channel, tone: Tone, brief: Option<&Brief>) -> String {
    let mut prompt = format!(
        "Write {label} copy for this campaign.\n\
         {rules}\n\
         Tone: {tone}.\n\n\
         {facts}",
        label = channel.label(),
        rules = channel_rules(channel),
        tone = tone.profile().descriptor,
        facts = facts_block(campaign),
    );
    if let Some(brief) = brief {
        prompt.push_str(&format!(
            "Key message: {}\nCall to action: {}\n",
            brief.key_message, brief.call_to_action
        ));
    }
    prompt
}

/// Idea prompt: `count` short hooks separated by blank lines.
pub fn ideas_prompt(
    campaign: &Campaign,
    channel: Channel,
    tone: Tone,
    count: usize,
    link: Option<&str>,
) -> String {
    format!(
        "Give {count} short hooks or angles for {label} copy, 1-3 lines each, \
         separated by blank lines.\n\
         Each idea must stand on its own and be practical; a gentle call to action is fine. \
         If there is a URL it may go on its own line.\n\
         Tone: {tone}.\n\n\
         Campaign name: {name}\n\
         Business: {biz}\n\
         Objective: {objective}\n\
         URL: {url}\n",
        label = channel.label(),
        tone = tone.profile().descriptor,
        name = or_dash(&campaign.name),
        biz = or_dash(&campaign.business_description),
        objective = or_dash(&campaign.objective),
        url = link.unwrap_or("—"),
    )
}
