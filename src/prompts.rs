//! Prompt template registry
//!
//! Composes the system prompt for ad generation from two independent axes:
//! a base template keyed by [`AdType`] (structure, length ceiling, output
//! format) and a tone block keyed by [`AdTone`] (voice, emoji density,
//! formality). Only N base templates and M tone blocks are authored;
//! composition substitutes the tone block into the base template's single
//! placeholder.

use crate::models::{AdType, AdTone};
use crate::{Error, Result};

pub const SOCIAL_MEDIA: &str = include_str!("../data/prompts/social_media.txt");
pub const EMAIL: &str = include_str!("../data/prompts/email.txt");
pub const PRODUCT_DESCRIPTION: &str = include_str!("../data/prompts/product_description.txt");

pub const TONE_FRIENDLY: &str = include_str!("../data/prompts/tone_friendly.txt");
pub const TONE_PROFESSIONAL: &str = include_str!("../data/prompts/tone_professional.txt");
pub const TONE_URGENT: &str = include_str!("../data/prompts/tone_urgent.txt");
pub const TONE_PLAYFUL: &str = include_str!("../data/prompts/tone_playful.txt");
pub const TONE_LUXURIOUS: &str = include_str!("../data/prompts/tone_luxurious.txt");
pub const TONE_MINIMALIST: &str = include_str!("../data/prompts/tone_minimalist.txt");
pub const TONE_BOLD: &str = include_str!("../data/prompts/tone_bold.txt");
pub const TONE_CONVERSATIONAL: &str = include_str!("../data/prompts/tone_conversational.txt");

pub const IMAGE_PROMPT: &str = include_str!("../data/prompts/image_prompt.txt");

const AD_TYPES: [AdType; 3] = [AdType::SocialMedia, AdType::Email, AdType::ProductDescription];

const AD_TONES: [AdTone; 8] = [
    AdTone::Friendly,
    AdTone::Professional,
    AdTone::Urgent,
    AdTone::Playful,
    AdTone::Luxurious,
    AdTone::Minimalist,
    AdTone::Bold,
    AdTone::Conversational,
];

fn base_template(ad_type: AdType) -> &'static str {
    match ad_type {
        AdType::SocialMedia => SOCIAL_MEDIA,
        AdType::Email => EMAIL,
        AdType::ProductDescription => PRODUCT_DESCRIPTION,
    }
}

fn tone_block(ad_tone: AdTone) -> &'static str {
    match ad_tone {
        AdTone::Friendly => TONE_FRIENDLY,
        AdTone::Professional => TONE_PROFESSIONAL,
        AdTone::Urgent => TONE_URGENT,
        AdTone::Playful => TONE_PLAYFUL,
        AdTone::Luxurious => TONE_LUXURIOUS,
        AdTone::Minimalist => TONE_MINIMALIST,
        AdTone::Bold => TONE_BOLD,
        AdTone::Conversational => TONE_CONVERSATIONAL,
    }
}

/// Compose the full system prompt for an (ad type, tone) pair.
///
/// Pure and deterministic. Fails when either axis resolves to an empty
/// template; no default type or tone is substituted here.
pub fn compose(ad_type: AdType, ad_tone: AdTone) -> Result<String> {
    let base = base_template(ad_type);
    if base.trim().is_empty() {
        return Err(Error::TemplateNotFound(format!(
            "no base template for ad type '{}'",
            ad_type.as_str()
        )));
    }

    let tone = tone_block(ad_tone);
    if tone.trim().is_empty() {
        return Err(Error::TemplateNotFound(format!(
            "no tone block for ad tone '{}'",
            ad_tone.as_str()
        )));
    }

    Ok(render(base, &[("tone_instructions", tone.trim_end())]))
}

/// All ad types with a registered base template.
pub fn available_ad_types() -> &'static [AdType] {
    &AD_TYPES
}

/// All tones with a registered tone block.
pub fn available_ad_tones() -> &'static [AdTone] {
    &AD_TONES
}

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
