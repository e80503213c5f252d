use unicode_segmentation::UnicodeSegmentation;

use crate::models::Language;
use crate::translit;

/// Share of alphabetic characters that must come from the Urdu script blocks
/// before a message counts as script-dominant.
const SCRIPT_RATIO_PERCENT: usize = 30;

/// Tokens that exist in the Roman Urdu vocabulary but are ordinary English
/// words; counting them would misread plain English as Roman Urdu.
const AMBIGUOUS_ENGLISH: &[&str] = &[
    "help", "need", "please", "yes", "no", "pain", "fire", "police", "gun", "knife", "storm",
    "flood", "attack", "broken", "bleeding", "breathing", "unconscious", "hospital", "doctor",
    "nurse", "ambulance", "emergency", "urgent", "quickly", "theft", "thief", "robbery",
    "violence", "firing", "earthquake", "landslide", "evacuate", "shelter", "call", "ok",
];

/// Romanized Urdu function words. They carry no emergency meaning, so they
/// live outside the transliteration vocabulary, but they are the strongest
/// signal that latin text is Roman Urdu rather than English.
const ROMAN_MARKERS: &[&str] = &[
    "hai", "hain", "ho", "rahi", "raha", "rahe", "chahiye", "bulao", "karo", "kya", "mein",
    "mera", "meri", "gaya", "gayi", "nahi", "wala", "apna",
];

pub fn is_urdu_char(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF
    )
}

/// Classify raw text as Urdu script, Roman Urdu, English, or a mix.
///
/// Both-signals-present favors `Mixed` so downstream rendering keeps every
/// language cue. Never fails; the worst case is `English`.
pub fn detect_language(text: &str) -> Language {
    let mut script_chars = 0usize;
    let mut alphabetic = 0usize;

    for ch in text.chars() {
        if is_urdu_char(ch) {
            script_chars += 1;
            alphabetic += 1;
        } else if ch.is_alphabetic() {
            alphabetic += 1;
        }
    }

    let roman_hits = text
        .unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| {
            ROMAN_MARKERS.contains(&w.as_str())
                || (translit::is_roman_term(w) && !AMBIGUOUS_ENGLISH.contains(&w.as_str()))
        })
        .count();

    let script_dominant =
        alphabetic > 0 && script_chars * 100 >= alphabetic * SCRIPT_RATIO_PERCENT;

    if script_chars > 0 && roman_hits > 0 {
        Language::Mixed
    } else if script_dominant {
        Language::Urdu
    } else if roman_hits > 0 {
        Language::RomanUrdu
    } else {
        Language::English
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_script_is_urdu() {
        assert_eq!(detect_language("ایمبولینس چاہیے، مریض بے ہوش ہے"), Language::Urdu);
    }

    #[test]
    fn roman_vocabulary_is_roman_urdu() {
        assert_eq!(
            detect_language("dakaiti ho rahi hai, police bulao jaldi"),
            Language::RomanUrdu
        );
    }

    #[test]
    fn both_signals_are_mixed() {
        assert_eq!(
            detect_language("Fire لگ گئی ہے، آگ emergency hai"),
            Language::Mixed
        );
    }

    #[test]
    fn common_english_stays_english() {
        assert_eq!(
            detect_language("please help, I need an ambulance and a doctor"),
            Language::English
        );
        assert_eq!(detect_language("!!!"), Language::English);
    }
}
