use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use madadgar_core::{
    compose_reply, detect_language, score_urgency, CaseRecord, DispatchReply, DispatchRequest,
    FacilityCandidate, Language, Lexicon, NetworkQuality, Service, Tier, TriageResult, Urgency,
};
use madadgar_observability::AppMetrics;
use madadgar_resolver::{FacilityResolver, ResolveError};
use madadgar_storage::CaseRepository;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Empty or whitespace-only text is rejected before the pipeline runs.
    #[error("dispatch text is empty")]
    EmptyText,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Downstream notify/dispatch boundary. The surrounding system wires a real
/// dispatcher here; the pipeline only needs an acknowledgement or a failure.
pub trait DispatchNotifier: Send + Sync {
    async fn notify(
        &self,
        case_id: &str,
        service: Service,
        facility: &FacilityCandidate,
    ) -> anyhow::Result<()>;
}

/// Default notifier: records the handoff in the log stream.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl DispatchNotifier for LogNotifier {
    async fn notify(
        &self,
        case_id: &str,
        service: Service,
        facility: &FacilityCandidate,
    ) -> anyhow::Result<()> {
        info!(
            case_id = %case_id,
            service = service.as_code(),
            facility = %facility.name,
            "dispatch notification sent"
        );
        Ok(())
    }
}

/// Boundary for an external reasoning path that may pre-empt the heuristic
/// pipeline. It either returns the same classification shape or declines
/// with `None`; nothing here depends on what sits behind it.
pub trait TriageOverride: Send + Sync {
    fn triage(&self, text: &str, language: Language) -> Option<TriageResult>;
}

#[derive(Clone)]
pub struct DispatchAgent<S, N>
where
    S: CaseRepository,
    N: DispatchNotifier,
{
    lexicon: Arc<Lexicon>,
    resolver: Arc<FacilityResolver>,
    notifier: N,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    override_path: Option<Arc<dyn TriageOverride>>,
}

impl<S, N> DispatchAgent<S, N>
where
    S: CaseRepository,
    N: DispatchNotifier,
{
    pub fn new(
        lexicon: Arc<Lexicon>,
        resolver: Arc<FacilityResolver>,
        notifier: N,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            lexicon,
            resolver,
            notifier,
            store,
            metrics,
            override_path: None,
        }
    }

    pub fn with_override(mut self, override_path: Arc<dyn TriageOverride>) -> Self {
        self.override_path = Some(override_path);
        self
    }

    pub fn resolver(&self) -> &FacilityResolver {
        &self.resolver
    }

    pub async fn recent_cases(&self, limit: usize) -> anyhow::Result<Vec<CaseRecord>> {
        self.store.recent_cases(limit).await
    }

    pub async fn purge_stale_cases(&self, older_than_days: i64) -> anyhow::Result<u64> {
        self.store
            .purge_older_than(Utc::now() - chrono::Duration::days(older_than_days))
            .await
    }

    /// Triage a message without touching the resolver. Pure: identical input
    /// yields an identical result.
    pub fn triage(&self, text: &str) -> TriageResult {
        let language = detect_language(text);

        if let Some(override_path) = &self.override_path {
            if let Some(result) = override_path.triage(text, language) {
                return result;
            }
        }

        let classification = self.lexicon.classify(text);
        // Greetings are conversation, not incident reports.
        let urgency = if classification.greeting {
            Urgency::Routine
        } else {
            score_urgency(text, language)
        };

        TriageResult {
            language,
            service: classification.service,
            subservice: classification.subservice,
            keywords: classification.keywords,
            urgency,
            greeting: classification.greeting,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn handle(&self, request: DispatchRequest) -> Result<DispatchReply, DispatchError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let text = request.text.trim();
        if text.is_empty() {
            return Err(DispatchError::EmptyText);
        }

        let triage = self.triage(text);
        if triage.urgency == Urgency::Critical {
            self.metrics.inc_critical();
        }

        let facilities = self
            .resolver
            .resolve(triage.service, request.lat, request.lon, request.radius_km)
            .await?;
        if facilities
            .first()
            .is_some_and(|top| top.source_tier == Tier::Static)
        {
            self.metrics.inc_static_fallback();
        }

        let network = NetworkQuality::detect(
            request.network_quality.as_deref(),
            request.connection_type.as_deref(),
        );
        let (reply_text, minimal) = compose_reply(&triage, &facilities, network);
        if minimal {
            self.metrics.inc_minimal_reply();
        }

        let case_id = Uuid::new_v4().to_string();
        if let Some(top) = facilities.first() {
            if let Err(error) = self.notifier.notify(&case_id, triage.service, top).await {
                warn!(case_id = %case_id, %error, "dispatch notification failed");
            }
        }

        let case = CaseRecord {
            case_id: case_id.clone(),
            created_at: Utc::now(),
            text: text.to_string(),
            language: triage.language,
            service: triage.service,
            subservice: triage.subservice.clone(),
            urgency: triage.urgency,
            facility_name: facilities.first().map(|f| f.name.clone()),
            facility_tier: facilities.first().map(|f| f.source_tier),
        };
        if let Err(error) = self.store.record_case(&case).await {
            warn!(case_id = %case_id, %error, "failed to persist case record");
        }

        self.metrics.observe_latency(started.elapsed());
        info!(
            case_id = %case_id,
            language = triage.language.as_code(),
            service = triage.service.as_code(),
            urgency = triage.urgency.level(),
            tier = facilities.first().map(|f| f.source_tier.as_code()).unwrap_or("none"),
            minimal,
            "dispatch handled"
        );

        Ok(DispatchReply {
            reply_text,
            minimal,
            triage,
            facilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use madadgar_resolver::{FacilityDataset, StaticDirectory, TierSource};
    use madadgar_storage::{MemoryStore, Store};

    fn agent() -> DispatchAgent<Store, LogNotifier> {
        let resolver = FacilityResolver::new(
            vec![TierSource::Local(FacilityDataset::from_records(Vec::new()))],
            StaticDirectory::default(),
        );
        DispatchAgent::new(
            Arc::new(Lexicon::standard()),
            Arc::new(resolver),
            LogNotifier,
            Arc::new(Store::Memory(MemoryStore::new())),
            AppMetrics::shared(),
        )
    }

    fn request(text: &str, network: Option<&str>) -> DispatchRequest {
        DispatchRequest {
            text: text.to_string(),
            lat: 24.8607,
            lon: 67.0011,
            radius_km: None,
            network_quality: network.map(str::to_string),
            connection_type: None,
        }
    }

    #[tokio::test]
    async fn urdu_medical_message_is_critical() {
        let reply = agent()
            .handle(request("ایمبولینس چاہیے، مریض بے ہوش ہے", Some("fast")))
            .await
            .unwrap();

        assert_eq!(reply.triage.language, Language::Urdu);
        assert_eq!(reply.triage.service, Service::Medical);
        assert_eq!(reply.triage.urgency, Urgency::Critical);
        assert!(!reply.facilities.is_empty());
    }

    #[tokio::test]
    async fn roman_urdu_robbery_is_serious_police() {
        let reply = agent()
            .handle(request("dakaiti ho rahi hai, police bulao jaldi", Some("fast")))
            .await
            .unwrap();

        assert_eq!(reply.triage.language, Language::RomanUrdu);
        assert_eq!(reply.triage.service, Service::Police);
        assert_eq!(reply.triage.urgency, Urgency::Serious);
    }

    #[tokio::test]
    async fn mixed_fire_message_is_critical_disaster() {
        let reply = agent()
            .handle(request("Fire لگ گئی ہے، آگ emergency hai", Some("fast")))
            .await
            .unwrap();

        assert_eq!(reply.triage.language, Language::Mixed);
        assert_eq!(reply.triage.service, Service::Disaster);
        assert_eq!(reply.triage.urgency, Urgency::Critical);
    }

    #[tokio::test]
    async fn greeting_short_circuits_to_general_routine() {
        let reply = agent().handle(request("سلام علیکم", Some("fast"))).await.unwrap();

        assert!(reply.triage.greeting);
        assert_eq!(reply.triage.service, Service::General);
        assert_eq!(reply.triage.urgency, Urgency::Routine);
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_the_pipeline() {
        let error = agent().handle(request("   ", Some("fast"))).await.unwrap_err();
        assert!(matches!(error, DispatchError::EmptyText));
    }

    #[tokio::test]
    async fn slow_network_reply_is_shorter_than_fast() {
        let agent = agent();
        let slow = agent
            .handle(request("ambulance needed, patient unconscious", Some("slow")))
            .await
            .unwrap();
        let fast = agent
            .handle(request("ambulance needed, patient unconscious", Some("fast")))
            .await
            .unwrap();

        assert!(slow.minimal);
        assert!(!fast.minimal);
        assert!(slow.reply_text.len() < fast.reply_text.len());
        for reply in [&slow, &fast] {
            assert!(reply.reply_text.contains("🔴"));
            assert!(reply.reply_text.contains("MEDICAL"));
        }
    }

    #[tokio::test]
    async fn triage_is_idempotent() {
        let agent = agent();
        let text = "dakaiti ho rahi hai, police bulao jaldi";
        let first = agent.triage(text);
        let second = agent.triage(text);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    struct DecliningOverride;
    impl TriageOverride for DecliningOverride {
        fn triage(&self, _text: &str, _language: Language) -> Option<TriageResult> {
            None
        }
    }

    #[tokio::test]
    async fn declined_override_falls_through_to_heuristics() {
        let agent = agent().with_override(Arc::new(DecliningOverride));
        let result = agent.triage("police bulao, chori hui hai");
        assert_eq!(result.service, Service::Police);
    }
}
