//! Fixed natural-language rule templates.
//!
//! Only two phrasings are recognised; everything else is rejected.

use super::NewRule;
use crate::error::ValidationError;

/// Example phrases presented to users.
pub const EXAMPLES: [&str; 4] = [
    "조도가 200 lux 이하일 때 LED 켜줘",
    "온도가 30도 이상이면 팬 켜줘",
    "조도가 400 lux 이상이면 LED 꺼줘",
    "습도가 40% 이하로 떨어지면 알림 보내줘",
];

struct Template {
    subject: &'static [&'static str],
    comparison: &'static [&'static str],
    condition: &'static str,
    action: &'static str,
}

const TEMPLATES: [Template; 2] = [
    Template {
        subject: &["조도", "illuminance", "light level"],
        comparison: &["이하", "at or below", "below"],
        condition: "light < 200",
        action: "led on",
    },
    Template {
        subject: &["온도", "temperature"],
        comparison: &["이상", "at or above", "above"],
        condition: "temp > 30",
        action: "fan on",
    },
];

/// Translate `text` into one of the fixed rules.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedNaturalLanguage`] when no template matches.
pub fn translate(text: &str) -> Result<NewRule, ValidationError> {
    let lowered = text.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));
    TEMPLATES
        .iter()
        .find(|t| contains_any(t.subject) && contains_any(t.comparison))
        .map(|t| NewRule::new(t.condition, t.action))
        .ok_or_else(|| ValidationError::UnsupportedNaturalLanguage(text.to_string()))
}
