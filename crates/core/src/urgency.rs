use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Language, Urgency};

// Severity indicator sets are deliberately independent from the service
// keyword tables: "unconscious" is a severity cue, not a category cue.

#[rustfmt::skip]
const URDU_CRITICAL: &[&str] = &[
    "بے ہوش", "سانس نہیں", "دل کی دھڑکن رک گئی", "شدید خون",
    "بندوق", "فائرنگ", "آگ", "دھماکہ", "پھنس گیا", "فوری خطرہ",
];

#[rustfmt::skip]
const URDU_SERIOUS: &[&str] = &[
    "فریکچر", "ٹوٹا ہوا", "ٹوٹ", "شدید درد", "ڈکیتی", "حملہ", "خطرہ",
    "سیلاب", "گر گیا", "زلزلہ", "پہاڑی تودہ", "چوری",
];

#[rustfmt::skip]
const ROMAN_CRITICAL: &[&str] = &[
    "be hosh", "behosh", "saans nahin", "dil ki dhadkan ruk gayi", "shadeed khoon",
    "banduq", "firing", "aag", "dhamaka", "phans gaya", "fori khatra",
];

#[rustfmt::skip]
const ROMAN_SERIOUS: &[&str] = &[
    "fracture", "tuta", "shadeed dard", "dakaiti", "hamla", "khatra",
    "sailab", "gir gaya", "zalzala", "pahari toda", "chori",
];

#[rustfmt::skip]
const ENGLISH_CRITICAL: &[&str] = &[
    "not breathing", "can't breathe", "unconscious", "cardiac arrest", "heart attack",
    "heavy bleeding", "bleeding heavily", "gun", "shooting", "fire", "explosion",
    "trapped", "immediate danger", "choking", "drowning", "seizure", "fits",
    "convulsions", "stroke", "severe allergic reaction",
];

#[rustfmt::skip]
const ENGLISH_SERIOUS: &[&str] = &[
    "fracture", "broken", "severe pain", "robbery", "assault", "threat",
    "flood", "collapse", "landslide", "earthquake", "theft", "stolen",
];

static BROKE_LIMB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"broke (my )?(leg|arm|foot|hand)").expect("valid phrase pattern"));

/// A reported crime happening right now is a life-safety signal, not a
/// report after the fact.
static CRIME_IN_PROGRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(robbery|robbed|dakaiti|assault|hamla)\b.*\b(now|just|abhi)")
        .expect("valid phrase pattern")
});

/// Score a message into one of three severity tiers.
///
/// Critical indicators are scanned first and fix the result regardless of
/// any co-occurring serious indicators. The result is always in 1..=3.
pub fn score_urgency(text: &str, language: Language) -> Urgency {
    let normalized = text.to_lowercase();
    let scan_urdu = matches!(language, Language::Urdu | Language::Mixed);
    let scan_latin = matches!(
        language,
        Language::RomanUrdu | Language::Mixed | Language::English
    );

    let critical = (scan_urdu && contains_any(&normalized, URDU_CRITICAL))
        || (scan_latin
            && (contains_any(&normalized, ROMAN_CRITICAL)
                || contains_any(&normalized, ENGLISH_CRITICAL)
                || CRIME_IN_PROGRESS.is_match(&normalized)));
    if critical {
        return Urgency::Critical;
    }

    let serious = (scan_urdu && contains_any(&normalized, URDU_SERIOUS))
        || (scan_latin
            && (contains_any(&normalized, ROMAN_SERIOUS)
                || contains_any(&normalized, ENGLISH_SERIOUS)
                || BROKE_LIMB.is_match(&normalized)));
    if serious {
        return Urgency::Serious;
    }

    Urgency::Routine
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urdu_critical_indicator_wins() {
        assert_eq!(
            score_urgency("ایمبولینس چاہیے، مریض بے ہوش ہے", Language::Urdu),
            Urgency::Critical
        );
    }

    #[test]
    fn roman_robbery_is_serious() {
        assert_eq!(
            score_urgency("dakaiti ho rahi hai, police bulao jaldi", Language::RomanUrdu),
            Urgency::Serious
        );
    }

    #[test]
    fn critical_beats_cooccurring_serious() {
        assert_eq!(
            score_urgency("robbery, attacked, bleeding heavily", Language::English),
            Urgency::Critical
        );
    }

    #[test]
    fn crime_in_progress_escalates() {
        assert_eq!(
            score_urgency("we are being robbed right now", Language::English),
            Urgency::Critical
        );
    }

    #[test]
    fn broke_limb_phrase_is_serious() {
        assert_eq!(
            score_urgency("I broke my leg at the park", Language::English),
            Urgency::Serious
        );
    }

    #[test]
    fn no_indicator_defaults_to_routine() {
        assert_eq!(
            score_urgency("what are the visiting hours", Language::English),
            Urgency::Routine
        );
    }
}
