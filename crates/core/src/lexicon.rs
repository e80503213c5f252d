use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::models::Service;
use crate::translit;

/// Language a keyword is written in. The same surface term may map to
/// different services only across languages, never within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermLang {
    Urdu,
    Roman,
    Shared,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordEntry {
    pub term: &'static str,
    pub lang: TermLang,
    pub service: Service,
    pub subservice: Option<&'static str>,
}

const fn entry(
    term: &'static str,
    lang: TermLang,
    service: Service,
    subservice: &'static str,
) -> KeywordEntry {
    KeywordEntry {
        term,
        lang,
        service,
        subservice: Some(subservice),
    }
}

#[rustfmt::skip]
const ENTRIES: &[KeywordEntry] = &[
    // Medical, Urdu script
    entry("ایمبولینس", TermLang::Urdu, Service::Medical, "ambulance"),
    entry("ہسپتال", TermLang::Urdu, Service::Medical, "hospital"),
    entry("ڈاکٹر", TermLang::Urdu, Service::Medical, "hospital"),
    entry("نرس", TermLang::Urdu, Service::Medical, "hospital"),
    entry("درد", TermLang::Urdu, Service::Medical, "clinic"),
    entry("خون بہنا", TermLang::Urdu, Service::Medical, "trauma"),
    entry("خون", TermLang::Urdu, Service::Medical, "trauma"),
    entry("ٹوٹا ہوا", TermLang::Urdu, Service::Medical, "trauma"),
    entry("فریکچر", TermLang::Urdu, Service::Medical, "trauma"),
    entry("زخمی", TermLang::Urdu, Service::Medical, "trauma"),
    entry("بے ہوش", TermLang::Urdu, Service::Medical, "resuscitation"),
    entry("سانس", TermLang::Urdu, Service::Medical, "resuscitation"),
    entry("مریض", TermLang::Urdu, Service::Medical, "ambulance"),
    entry("علاج", TermLang::Urdu, Service::Medical, "clinic"),
    entry("دوا", TermLang::Urdu, Service::Medical, "clinic"),
    // Medical, Roman Urdu / English
    entry("ambulance", TermLang::Shared, Service::Medical, "ambulance"),
    entry("ambulens", TermLang::Roman, Service::Medical, "ambulance"),
    entry("hospital", TermLang::Shared, Service::Medical, "hospital"),
    entry("haspatal", TermLang::Roman, Service::Medical, "hospital"),
    entry("doctor", TermLang::Shared, Service::Medical, "hospital"),
    entry("daktar", TermLang::Roman, Service::Medical, "hospital"),
    entry("nurse", TermLang::Shared, Service::Medical, "hospital"),
    entry("dard", TermLang::Roman, Service::Medical, "clinic"),
    entry("pain", TermLang::Shared, Service::Medical, "clinic"),
    entry("khoon", TermLang::Roman, Service::Medical, "trauma"),
    entry("bleeding", TermLang::Shared, Service::Medical, "trauma"),
    entry("injured", TermLang::Shared, Service::Medical, "trauma"),
    entry("fracture", TermLang::Shared, Service::Medical, "trauma"),
    entry("broken", TermLang::Shared, Service::Medical, "trauma"),
    entry("tuta", TermLang::Roman, Service::Medical, "trauma"),
    entry("accident", TermLang::Shared, Service::Medical, "trauma"),
    entry("crash", TermLang::Shared, Service::Medical, "trauma"),
    entry("behosh", TermLang::Roman, Service::Medical, "resuscitation"),
    entry("be hosh", TermLang::Roman, Service::Medical, "resuscitation"),
    entry("unconscious", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("saans", TermLang::Roman, Service::Medical, "resuscitation"),
    entry("breathing", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("choking", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("seizure", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("fits", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("stroke", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("heart attack", TermLang::Shared, Service::Medical, "resuscitation"),
    entry("mareez", TermLang::Roman, Service::Medical, "ambulance"),
    entry("ilaj", TermLang::Roman, Service::Medical, "clinic"),
    entry("dawa", TermLang::Roman, Service::Medical, "clinic"),
    entry("fever", TermLang::Shared, Service::Medical, "clinic"),
    entry("sick", TermLang::Shared, Service::Medical, "clinic"),
    // Police, Urdu script
    entry("پولیس", TermLang::Urdu, Service::Police, "patrol"),
    entry("ڈکیتی", TermLang::Urdu, Service::Police, "robbery"),
    entry("چوری", TermLang::Urdu, Service::Police, "theft"),
    entry("چور", TermLang::Urdu, Service::Police, "theft"),
    entry("حملہ", TermLang::Urdu, Service::Police, "assault"),
    entry("تشدد", TermLang::Urdu, Service::Police, "assault"),
    entry("بندوق", TermLang::Urdu, Service::Police, "weapons"),
    entry("چاقو", TermLang::Urdu, Service::Police, "weapons"),
    entry("فائرنگ", TermLang::Urdu, Service::Police, "weapons"),
    entry("جرم", TermLang::Urdu, Service::Police, "patrol"),
    // Police, Roman Urdu / English
    entry("police", TermLang::Shared, Service::Police, "patrol"),
    entry("robbery", TermLang::Shared, Service::Police, "robbery"),
    entry("robbed", TermLang::Shared, Service::Police, "robbery"),
    entry("dakaiti", TermLang::Roman, Service::Police, "robbery"),
    entry("theft", TermLang::Shared, Service::Police, "theft"),
    entry("chori", TermLang::Roman, Service::Police, "theft"),
    entry("stolen", TermLang::Shared, Service::Police, "theft"),
    entry("stole", TermLang::Shared, Service::Police, "theft"),
    entry("thief", TermLang::Shared, Service::Police, "theft"),
    entry("chor", TermLang::Roman, Service::Police, "theft"),
    entry("burglary", TermLang::Shared, Service::Police, "theft"),
    entry("attack", TermLang::Shared, Service::Police, "assault"),
    entry("hamla", TermLang::Roman, Service::Police, "assault"),
    entry("assault", TermLang::Shared, Service::Police, "assault"),
    entry("violence", TermLang::Shared, Service::Police, "assault"),
    entry("tashaddud", TermLang::Roman, Service::Police, "assault"),
    entry("gun", TermLang::Shared, Service::Police, "weapons"),
    entry("banduq", TermLang::Roman, Service::Police, "weapons"),
    entry("knife", TermLang::Shared, Service::Police, "weapons"),
    entry("chaqoo", TermLang::Roman, Service::Police, "weapons"),
    entry("shooting", TermLang::Shared, Service::Police, "weapons"),
    entry("firing", TermLang::Shared, Service::Police, "weapons"),
    entry("crime", TermLang::Shared, Service::Police, "patrol"),
    entry("suspect", TermLang::Shared, Service::Police, "patrol"),
    // Disaster, Urdu script
    entry("آگ", TermLang::Urdu, Service::Disaster, "fire"),
    entry("سیلاب", TermLang::Urdu, Service::Disaster, "flood"),
    entry("زلزلہ", TermLang::Urdu, Service::Disaster, "earthquake"),
    entry("پہاڑی تودہ", TermLang::Urdu, Service::Disaster, "landslide"),
    entry("طوفان", TermLang::Urdu, Service::Disaster, "storm"),
    entry("خالی کرو", TermLang::Urdu, Service::Disaster, "evacuation"),
    entry("پناہ گاہ", TermLang::Urdu, Service::Disaster, "evacuation"),
    entry("بچاؤ", TermLang::Urdu, Service::Disaster, "rescue"),
    entry("دھماکہ", TermLang::Urdu, Service::Disaster, "fire"),
    // Disaster, Roman Urdu / English
    entry("fire", TermLang::Shared, Service::Disaster, "fire"),
    entry("aag", TermLang::Roman, Service::Disaster, "fire"),
    entry("wildfire", TermLang::Shared, Service::Disaster, "fire"),
    entry("dhamaka", TermLang::Roman, Service::Disaster, "fire"),
    entry("explosion", TermLang::Shared, Service::Disaster, "fire"),
    entry("flood", TermLang::Shared, Service::Disaster, "flood"),
    entry("sailab", TermLang::Roman, Service::Disaster, "flood"),
    entry("flooded", TermLang::Shared, Service::Disaster, "flood"),
    entry("tsunami", TermLang::Shared, Service::Disaster, "flood"),
    entry("earthquake", TermLang::Shared, Service::Disaster, "earthquake"),
    entry("zalzala", TermLang::Roman, Service::Disaster, "earthquake"),
    entry("landslide", TermLang::Shared, Service::Disaster, "landslide"),
    entry("pahari toda", TermLang::Roman, Service::Disaster, "landslide"),
    entry("storm", TermLang::Shared, Service::Disaster, "storm"),
    entry("toofan", TermLang::Roman, Service::Disaster, "storm"),
    entry("cyclone", TermLang::Shared, Service::Disaster, "storm"),
    entry("hurricane", TermLang::Shared, Service::Disaster, "storm"),
    entry("evacuate", TermLang::Shared, Service::Disaster, "evacuation"),
    entry("evacuation", TermLang::Shared, Service::Disaster, "evacuation"),
    entry("khali karo", TermLang::Roman, Service::Disaster, "evacuation"),
    entry("shelter", TermLang::Shared, Service::Disaster, "evacuation"),
    entry("collapse", TermLang::Shared, Service::Disaster, "rescue"),
    // General assistance terms. Lowest priority so a concrete service signal
    // in the same message always wins.
    entry("مدد", TermLang::Urdu, Service::General, "assistance"),
    entry("ضرورت", TermLang::Urdu, Service::General, "assistance"),
    entry("ایمرجنسی", TermLang::Urdu, Service::General, "assistance"),
    entry("فوری", TermLang::Urdu, Service::General, "assistance"),
    entry("help", TermLang::Shared, Service::General, "assistance"),
    entry("madad", TermLang::Roman, Service::General, "assistance"),
    entry("need", TermLang::Shared, Service::General, "assistance"),
    entry("zaroorat", TermLang::Roman, Service::General, "assistance"),
    entry("emergency", TermLang::Shared, Service::General, "assistance"),
    entry("urgent", TermLang::Shared, Service::General, "assistance"),
    entry("fori", TermLang::Roman, Service::General, "assistance"),
];

const URDU_GREETINGS: &[&str] = &[
    "سلام",
    "سلام علیکم",
    "السلام علیکم",
    "آداب",
    "خدا حافظ",
    "اللہ حافظ",
    "صبح بخیر",
    "شام بخیر",
];

const LATIN_GREETINGS: &[&str] = &[
    "salam",
    "salaam",
    "salam alaikum",
    "salaam alaikum",
    "assalamualaikum",
    "assalamu alaikum",
    "adaab",
    "khuda hafiz",
    "allah hafiz",
    "subah bakhair",
    "hi",
    "hello",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

pub const DEFAULT_SUBSERVICE: &str = "inquiry";
pub const GREETING_SUBSERVICE: &str = "greeting";

/// What the lexical classifier produced for one message. Urgency is scored
/// separately; the agent combines both into the final triage result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub service: Service,
    pub subservice: String,
    pub keywords: Vec<String>,
    pub greeting: bool,
}

/// Immutable keyword table built once at startup and shared by reference.
pub struct Lexicon {
    entries: Vec<KeywordEntry>,
    exact: HashMap<&'static str, Vec<usize>>,
}

impl Lexicon {
    pub fn standard() -> Self {
        let entries: Vec<KeywordEntry> = ENTRIES.to_vec();
        let mut exact: HashMap<&'static str, Vec<usize>> = HashMap::new();
        for (idx, e) in entries.iter().enumerate() {
            exact.entry(e.term).or_default().push(idx);
        }
        Self { entries, exact }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    /// Classify a message into a service, subservice, and matched keywords.
    ///
    /// The greeting check runs before any keyword scan: a message whose
    /// dominant clause is a greeting stays `general` no matter what else
    /// appears in it.
    pub fn classify(&self, text: &str) -> Classification {
        if is_greeting(text) {
            return Classification {
                service: Service::General,
                subservice: GREETING_SUBSERVICE.to_string(),
                keywords: Vec::new(),
                greeting: true,
            };
        }

        let normalized = text.to_lowercase();

        // (first byte offset, entry index). Exact token matches run first
        // through the term map, with Roman Urdu tokens normalized to their
        // script form so they also hit the Urdu entries, then a substring
        // pass covers the remaining entries; terms too short to
        // substring-match safely only match as tokens.
        let mut matched: Vec<(usize, usize)> = Vec::new();
        let mut seen = vec![false; self.entries.len()];

        for (at, token) in normalized.unicode_word_indices() {
            let direct = self.exact.get(token);
            let via_translit = direct
                .is_none()
                .then(|| translit::script_form(token))
                .flatten()
                .and_then(|script_term| self.exact.get(script_term));

            if let Some(indices) = direct.or(via_translit) {
                for &idx in indices {
                    if !seen[idx] {
                        seen[idx] = true;
                        matched.push((at, idx));
                    }
                }
            }
        }

        for (idx, e) in self.entries.iter().enumerate() {
            if seen[idx] || e.term.chars().count() <= 2 {
                continue;
            }
            if let Some(at) = normalized.find(e.term) {
                matched.push((at, idx));
            }
        }
        matched.sort();

        let mut keywords: Vec<String> = Vec::new();
        for (_, idx) in &matched {
            let term = self.entries[*idx].term.to_string();
            if !keywords.contains(&term) {
                keywords.push(term);
            }
        }

        let service = Service::BY_PRIORITY
            .iter()
            .copied()
            .find(|svc| matched.iter().any(|(_, idx)| self.entries[*idx].service == *svc))
            .unwrap_or(Service::General);

        let subservice = matched
            .iter()
            .filter(|(_, idx)| self.entries[*idx].service == service)
            .find_map(|(_, idx)| self.entries[*idx].subservice)
            .unwrap_or(DEFAULT_SUBSERVICE)
            .to_string();

        Classification {
            service,
            subservice,
            keywords,
            greeting: false,
        }
    }
}

/// A message short-circuits as a greeting when the whole trimmed text is a
/// curated greeting, or the first clause is one and the trailing remainder
/// has no more tokens than the greeting itself. The exact boundary between
/// "greeting with trailing chatter" and "incident framed as a greeting" is a
/// policy choice pending product confirmation.
pub fn is_greeting(text: &str) -> bool {
    let whole = normalize_clause(text);
    if whole.is_empty() {
        return false;
    }
    if in_greeting_set(&whole) {
        return true;
    }

    let first_clause = text
        .split([',', '.', '!', '?', ';', '،', '؟', '۔', '\n'])
        .next()
        .unwrap_or("");
    let clause = normalize_clause(first_clause);
    if clause.is_empty() || !in_greeting_set(&clause) {
        return false;
    }

    let greeting_tokens = clause.unicode_words().count();
    let total_tokens = whole.unicode_words().count();
    total_tokens - greeting_tokens <= greeting_tokens
}

fn in_greeting_set(clause: &str) -> bool {
    URDU_GREETINGS.contains(&clause) || LATIN_GREETINGS.contains(&clause)
}

fn normalize_clause(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}
