use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Roman Urdu to Urdu script display forms. Closed vocabulary: correctness is
/// only guaranteed for the curated terms; everything else passes through.
static ROMAN_TO_URDU: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Medical
        ("ambulance", "ایمبولینس"),
        ("ambulens", "ایمبولینس"),
        ("hospital", "ہسپتال"),
        ("haspatal", "ہسپتال"),
        ("doctor", "ڈاکٹر"),
        ("daktar", "ڈاکٹر"),
        ("nurse", "نرس"),
        ("pain", "درد"),
        ("dard", "درد"),
        ("bleeding", "خون بہنا"),
        ("khoon", "خون"),
        ("khoon bahna", "خون بہنا"),
        ("broken", "ٹوٹا ہوا"),
        ("tuta", "ٹوٹا ہوا"),
        ("fracture", "فریکچر"),
        ("unconscious", "بے ہوش"),
        ("be hosh", "بے ہوش"),
        ("behosh", "بے ہوش"),
        ("breathing", "سانس"),
        ("saans", "سانس"),
        ("emergency", "ایمرجنسی"),
        ("mareez", "مریض"),
        ("ilaj", "علاج"),
        ("dawa", "دوا"),
        // Police
        ("police", "پولیس"),
        ("robbery", "ڈکیتی"),
        ("dakaiti", "ڈکیتی"),
        ("theft", "چوری"),
        ("chori", "چوری"),
        ("thief", "چور"),
        ("chor", "چور"),
        ("attack", "حملہ"),
        ("hamla", "حملہ"),
        ("violence", "تشدد"),
        ("tashaddud", "تشدد"),
        ("gun", "بندوق"),
        ("banduq", "بندوق"),
        ("knife", "چاقو"),
        ("chaqoo", "چاقو"),
        ("firing", "فائرنگ"),
        // Disaster
        ("fire", "آگ"),
        ("aag", "آگ"),
        ("flood", "سیلاب"),
        ("sailab", "سیلاب"),
        ("earthquake", "زلزلہ"),
        ("zalzala", "زلزلہ"),
        ("landslide", "پہاڑی تودہ"),
        ("pahari toda", "پہاڑی تودہ"),
        ("storm", "طوفان"),
        ("toofan", "طوفان"),
        ("evacuate", "خالی کرو"),
        ("khali karo", "خالی کرو"),
        ("shelter", "پناہ گاہ"),
        ("panah gah", "پناہ گاہ"),
        ("dhamaka", "دھماکہ"),
        // Common
        ("help", "مدد"),
        ("madad", "مدد"),
        ("need", "ضرورت"),
        ("zaroorat", "ضرورت"),
        ("yes", "ہاں"),
        ("haan", "ہاں"),
        ("no", "نہیں"),
        ("nahin", "نہیں"),
        ("urgent", "فوری"),
        ("fori", "فوری"),
        ("quickly", "جلدی"),
        ("jaldi", "جلدی"),
        ("mehfooz", "محفوظ"),
        ("khatra", "خطرہ"),
        // Greetings
        ("salam", "سلام"),
        ("salaam", "سلام"),
        ("salam alaikum", "سلام علیکم"),
        ("salaam alaikum", "سلام علیکم"),
        ("assalamualaikum", "السلام علیکم"),
        ("assalamu alaikum", "السلام علیکم"),
        ("adaab", "آداب"),
        ("khuda hafiz", "خدا حافظ"),
        ("allah hafiz", "اللہ حافظ"),
    ])
});

/// Whether a lowercased token belongs to the curated Roman Urdu vocabulary.
pub fn is_roman_term(token: &str) -> bool {
    ROMAN_TO_URDU.contains_key(token)
}

pub fn script_form(term: &str) -> Option<&'static str> {
    ROMAN_TO_URDU.get(term.trim().to_lowercase().as_str()).copied()
}

/// Best-effort conversion of known Roman Urdu terms to Urdu script. Two-word
/// phrases are tried first so "be hosh" maps as a unit; unknown tokens are
/// preserved verbatim.
pub fn transliterate(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        if i + 1 < words.len() {
            let bigram = format!(
                "{} {}",
                words[i].to_lowercase().trim_matches(|c: char| c.is_ascii_punctuation()),
                words[i + 1]
                    .to_lowercase()
                    .trim_matches(|c: char| c.is_ascii_punctuation())
            );
            if let Some(urdu) = ROMAN_TO_URDU.get(bigram.as_str()) {
                out.push((*urdu).to_string());
                i += 2;
                continue;
            }
        }

        let bare = words[i]
            .to_lowercase()
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .to_string();
        match ROMAN_TO_URDU.get(bare.as_str()) {
            Some(urdu) => out.push((*urdu).to_string()),
            None => out.push(words[i].to_string()),
        }
        i += 1;
    }

    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_terms_and_keeps_the_rest() {
        assert_eq!(transliterate("ambulance bulao"), "ایمبولینس bulao");
        assert_eq!(transliterate("xyz abc"), "xyz abc");
    }

    #[test]
    fn bigram_phrases_map_as_units() {
        assert_eq!(transliterate("mareez be hosh hai"), "مریض بے ہوش hai");
    }

    #[test]
    fn unknown_input_passes_through_unchanged() {
        assert_eq!(transliterate(""), "");
        assert_eq!(transliterate("hello there"), "hello there");
    }
}
