use crate::models::{FacilityCandidate, Language, NetworkQuality, Service, TriageResult, Urgency};
use crate::translit;

/// Minimal replies go out whenever the connection is slow or unreported, and
/// on medium connections when the urgency calls for the fastest turnaround.
/// `Unknown` fails toward conservatism.
pub fn should_use_minimal(network: NetworkQuality, urgency: Urgency) -> bool {
    match network {
        NetworkQuality::Slow | NetworkQuality::Unknown => true,
        NetworkQuality::Medium => urgency.level() <= 2,
        NetworkQuality::Fast => false,
    }
}

/// Render the display reply. Returns the text plus whether minimal mode was
/// chosen; the structured triage/facility data travels alongside untouched.
pub fn compose_reply(
    triage: &TriageResult,
    facilities: &[FacilityCandidate],
    network: NetworkQuality,
) -> (String, bool) {
    let minimal = should_use_minimal(network, triage.urgency);
    let text = if minimal {
        minimal_line(triage, facilities)
    } else {
        standard_message(triage, facilities)
    };
    (text, minimal)
}

/// Mixed input renders with the script templates so every language cue the
/// requester used is preserved.
fn render_language(language: Language) -> Language {
    match language {
        Language::Mixed => Language::Urdu,
        other => other,
    }
}

fn service_emoji(service: Service) -> &'static str {
    match service {
        Service::Medical => "🏥",
        Service::Police => "🚔",
        Service::Disaster => "🌪️",
        Service::General => "📞",
    }
}

pub fn service_tag(language: Language, service: Service) -> &'static str {
    match (render_language(language), service) {
        (Language::Urdu, Service::Medical) => "طبی",
        (Language::Urdu, Service::Police) => "پولیس",
        (Language::Urdu, Service::Disaster) => "آفت",
        (Language::Urdu, Service::General) => "عمومی",
        (_, Service::Medical) => "MEDICAL",
        (_, Service::Police) => "POLICE",
        (_, Service::Disaster) => "DISASTER",
        (_, Service::General) => "GENERAL",
    }
}

pub fn urgency_tag(language: Language, urgency: Urgency) -> &'static str {
    match (render_language(language), urgency) {
        (Language::Urdu, Urgency::Critical) => "🔴 فوری",
        (Language::Urdu, Urgency::Serious) => "🟡 ضروری",
        (Language::Urdu, Urgency::Routine) => "🟢 عام",
        (Language::RomanUrdu, Urgency::Critical) => "🔴 Zaroori",
        (Language::RomanUrdu, Urgency::Serious) => "🟡 Important",
        (Language::RomanUrdu, Urgency::Routine) => "🟢 Normal",
        (_, Urgency::Critical) => "🔴 U1",
        (_, Urgency::Serious) => "🟡 U2",
        (_, Urgency::Routine) => "🟢 U3",
    }
}

fn short_follow_up(language: Language, service: Service) -> Option<&'static str> {
    match (render_language(language), service) {
        (Language::Urdu, Service::Medical) => Some("ہوش میں؟"),
        (Language::Urdu, Service::Police) => Some("محفوظ؟"),
        (Language::Urdu, Service::Disaster) => Some("کہاں؟"),
        (Language::RomanUrdu, Service::Medical) => Some("Hosh mein?"),
        (Language::RomanUrdu, Service::Police) => Some("Mehfooz?"),
        (Language::RomanUrdu, Service::Disaster) => Some("Kahan?"),
        (_, Service::Medical) => Some("Conscious?"),
        (_, Service::Police) => Some("Safe?"),
        (_, Service::Disaster) => Some("Where?"),
        (_, Service::General) => None,
    }
}

fn full_follow_up(language: Language, service: Service) -> &'static str {
    match (render_language(language), service) {
        (Language::Urdu, Service::Medical) => "کیا مریض ہوش میں ہے اور سانس لے رہا ہے؟",
        (Language::Urdu, Service::Police) => "کیا آپ اس وقت محفوظ جگہ پر ہیں؟",
        (Language::Urdu, Service::Disaster) => "آپ اس وقت بالکل کہاں موجود ہیں؟",
        (Language::Urdu, Service::General) => "برائے کرم اپنی ایمرجنسی کی تفصیل بتائیں",
        (Language::RomanUrdu, Service::Medical) => "Kya mareez hosh mein hai aur saans le raha hai?",
        (Language::RomanUrdu, Service::Police) => "Kya aap abhi mehfooz jagah par hain?",
        (Language::RomanUrdu, Service::Disaster) => "Aap abhi bilkul kahan maujood hain?",
        (Language::RomanUrdu, Service::General) => "Barae karam apni emergency ki tafseel batayen",
        (_, Service::Medical) => "Is the patient conscious and breathing?",
        (_, Service::Police) => "Are you in a safe place right now?",
        (_, Service::Disaster) => "Where exactly are you located?",
        (_, Service::General) => "Could you describe the emergency or how I can assist you today?",
    }
}

/// One fixed-width, symbol-prefixed line for constrained connections.
fn minimal_line(triage: &TriageResult, facilities: &[FacilityCandidate]) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "{} {}",
        service_emoji(triage.service),
        service_tag(triage.language, triage.service)
    ));
    parts.push(urgency_tag(triage.language, triage.urgency).to_string());

    if let Some(top) = facilities.first() {
        match &top.phone {
            Some(phone) => parts.push(format!("➤ {} ☎ {}", top.name, phone)),
            None => parts.push(format!("➤ {}", top.name)),
        }
    }

    if triage.urgency.level() <= 2 {
        if let Some(question) = short_follow_up(triage.language, triage.service) {
            parts.push(format!("? {question}"));
        }
    }

    parts.join(" | ")
}

fn acknowledgement(language: Language, urgency: Urgency, greeting: bool) -> &'static str {
    let language = render_language(language);
    if greeting {
        return match language {
            Language::Urdu => "📞 وعلیکم السلام! میں مدد کے لیے حاضر ہوں۔",
            Language::RomanUrdu => "📞 Walaikum salaam! Main madad ke liye hazir hoon.",
            _ => "📞 Hello! I'm here to help. Let me know what you need.",
        };
    }
    match (language, urgency) {
        (Language::Urdu, Urgency::Critical) => {
            "🚨 یہ جان لیوا ایمرجنسی ہے، فوری مدد کا بندوبست کیا جا رہا ہے۔"
        }
        (Language::Urdu, Urgency::Serious) => {
            "⚠️ صورتحال سنگین ہے، آپ کو درست سروس سے جوڑا جا رہا ہے۔"
        }
        (Language::Urdu, Urgency::Routine) => "ℹ️ آپ کی درخواست نوٹ کر لی گئی ہے۔",
        (Language::RomanUrdu, Urgency::Critical) => {
            "🚨 Yeh life-threatening emergency hai, fori madad ka bandobast ho raha hai."
        }
        (Language::RomanUrdu, Urgency::Serious) => {
            "⚠️ Surat-e-haal sangeen hai, aap ko durust service se joda ja raha hai."
        }
        (Language::RomanUrdu, Urgency::Routine) => "ℹ️ Aap ki request note kar li gayi hai.",
        (_, Urgency::Critical) => {
            "🚨 I understand this is a life-threatening emergency. Help is being arranged immediately."
        }
        (_, Urgency::Serious) => {
            "⚠️ I can see this is a serious situation. I'm connecting you with the right service."
        }
        (_, Urgency::Routine) => "ℹ️ I've noted your request and I'm here to help.",
    }
}

fn routed_section(language: Language, service: Service, facility: &FacilityCandidate) -> String {
    let language = render_language(language);
    let header = match (language, service) {
        (Language::Urdu, _) => "آپ کو قریب ترین مرکز سے جوڑ دیا گیا ہے۔",
        (Language::RomanUrdu, _) => "Aap ko qareeb tareen markaz se joda gaya hai.",
        (_, Service::Medical) => "I've connected you with MEDICAL services.",
        (_, Service::Police) => "I've connected you with POLICE services.",
        (_, Service::Disaster) => "I've connected you with DISASTER services.",
        (_, Service::General) => "I've routed your request to the helpline.",
    };

    let mut lines = vec![header.to_string(), format!("🏢 {}", facility.name)];
    if let Some(phone) = &facility.phone {
        lines.push(format!("📞 {phone}"));
    }
    lines.push(format!("📍 {:.1} km", facility.distance_km));
    lines.push(format!("⏱️ ETA: {} min", facility.eta_minutes));
    lines.join("\n")
}

fn action_line(language: Language, urgency: Urgency) -> &'static str {
    match (render_language(language), urgency) {
        (Language::Urdu, Urgency::Critical | Urgency::Serious) => {
            "✅ ایمرجنسی یونٹس کو اطلاع دے دی گئی ہے۔"
        }
        (Language::Urdu, Urgency::Routine) => "✅ آپ کی درخواست درج کر لی گئی ہے۔",
        (Language::RomanUrdu, Urgency::Critical | Urgency::Serious) => {
            "✅ Emergency units ko ittila de di gayi hai."
        }
        (Language::RomanUrdu, Urgency::Routine) => "✅ Aap ki request darj kar li gayi hai.",
        (_, Urgency::Critical | Urgency::Serious) => "✅ Emergency units have been notified.",
        (_, Urgency::Routine) => "✅ I've logged your request.",
    }
}

/// Multi-section message for good connections: acknowledgement,
/// classification summary, routed facility, action taken, follow-up.
fn standard_message(triage: &TriageResult, facilities: &[FacilityCandidate]) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(acknowledgement(triage.language, triage.urgency, triage.greeting).to_string());
    sections.push(format!(
        "{} {} | {}",
        service_emoji(triage.service),
        service_tag(triage.language, triage.service),
        urgency_tag(triage.language, triage.urgency)
    ));

    if !triage.keywords.is_empty() {
        // Script renderings display keywords in their script form.
        let script = render_language(triage.language) == Language::Urdu;
        let shown: Vec<String> = triage
            .keywords
            .iter()
            .map(|keyword| {
                if script {
                    translit::script_form(keyword)
                        .unwrap_or(keyword.as_str())
                        .to_string()
                } else {
                    keyword.clone()
                }
            })
            .collect();
        sections.push(format!("🔎 {}", shown.join(if script { "، " } else { ", " })));
    }

    if !triage.greeting {
        if let Some(top) = facilities.first() {
            sections.push(routed_section(triage.language, triage.service, top));
        }
        sections.push(action_line(triage.language, triage.urgency).to_string());
    }

    sections.push(format!(
        "❓ {}",
        full_follow_up(triage.language, triage.service)
    ));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn triage(language: Language, service: Service, urgency: Urgency) -> TriageResult {
        TriageResult {
            language,
            service,
            subservice: "ambulance".to_string(),
            keywords: vec!["ambulance".to_string()],
            urgency,
            greeting: false,
        }
    }

    fn facility() -> FacilityCandidate {
        FacilityCandidate {
            name: "Karachi General Hospital".to_string(),
            lat: 24.8615,
            lon: 67.0099,
            phone: Some("+92-21-1234567".to_string()),
            distance_km: 2.4,
            eta_minutes: 8,
            rating: None,
            source_tier: Tier::Static,
        }
    }

    #[test]
    fn slow_and_unknown_networks_get_minimal_replies() {
        assert!(should_use_minimal(NetworkQuality::Slow, Urgency::Routine));
        assert!(should_use_minimal(NetworkQuality::Unknown, Urgency::Routine));
        assert!(should_use_minimal(NetworkQuality::Medium, Urgency::Serious));
        assert!(!should_use_minimal(NetworkQuality::Medium, Urgency::Routine));
        assert!(!should_use_minimal(NetworkQuality::Fast, Urgency::Critical));
    }

    #[test]
    fn minimal_is_strictly_shorter_with_same_markers() {
        let t = triage(Language::English, Service::Medical, Urgency::Critical);
        let facilities = vec![facility()];

        let (minimal, was_minimal) = compose_reply(&t, &facilities, NetworkQuality::Slow);
        let (standard, was_standard) = compose_reply(&t, &facilities, NetworkQuality::Fast);

        assert!(was_minimal);
        assert!(!was_standard);
        assert!(minimal.len() < standard.len());
        for text in [&minimal, &standard] {
            assert!(text.contains("🔴"));
            assert!(text.contains("MEDICAL"));
        }
    }

    #[test]
    fn urdu_reply_uses_script_templates() {
        let t = triage(Language::Urdu, Service::Medical, Urgency::Critical);
        let (text, _) = compose_reply(&t, &[facility()], NetworkQuality::Fast);
        assert!(text.contains("طبی"));
        assert!(text.contains("🔴 فوری"));
    }

    #[test]
    fn mixed_input_renders_with_script_templates() {
        let t = triage(Language::Mixed, Service::Disaster, Urgency::Critical);
        let (text, _) = compose_reply(&t, &[facility()], NetworkQuality::Slow);
        assert!(text.contains("آفت"));
    }
}
