use std::sync::Arc;

use anyhow::Result;
use madadgar_agents::{DispatchAgent, LogNotifier};
use madadgar_core::{DispatchRequest, Lexicon, Service, Tier, Urgency};
use madadgar_observability::AppMetrics;
use madadgar_resolver::{FacilityDataset, FacilityResolver, LocalFacility, StaticDirectory, TierSource};
use madadgar_storage::{CaseRepository, MemoryStore, Store};

fn agent_with_dataset(records: Vec<LocalFacility>) -> DispatchAgent<Store, LogNotifier> {
    let resolver = FacilityResolver::new(
        vec![TierSource::Local(FacilityDataset::from_records(records))],
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

fn request(text: &str) -> DispatchRequest {
    DispatchRequest {
        text: text.to_string(),
        lat: 24.8607,
        lon: 67.0011,
        radius_km: None,
        network_quality: Some("fast".to_string()),
        connection_type: None,
    }
}

#[tokio::test]
async fn static_floor_answers_when_every_other_tier_is_empty() -> Result<()> {
    let agent = agent_with_dataset(Vec::new());

    let reply = agent.handle(request("aag lag gayi hai, madad karo")).await?;
    assert_eq!(reply.triage.service, Service::Disaster);
    assert_eq!(reply.triage.urgency, Urgency::Critical);
    assert!(!reply.facilities.is_empty());
    assert!(reply
        .facilities
        .iter()
        .all(|candidate| candidate.source_tier == Tier::Static));

    Ok(())
}

#[tokio::test]
async fn local_candidates_come_back_distance_ranked() -> Result<()> {
    let agent = agent_with_dataset(vec![
        LocalFacility {
            service: Service::Medical,
            name: "Far Clinic".to_string(),
            lat: 24.95,
            lon: 67.10,
            phone: None,
        },
        LocalFacility {
            service: Service::Medical,
            name: "Near Clinic".to_string(),
            lat: 24.8610,
            lon: 67.0020,
            phone: Some("+92-21-000".to_string()),
        },
    ]);

    let reply = agent
        .handle(request("mareez ko shadeed dard hai, ambulance bulao"))
        .await?;
    assert_eq!(reply.triage.service, Service::Medical);
    assert_eq!(reply.facilities[0].name, "Near Clinic");
    assert_eq!(reply.facilities[0].source_tier, Tier::Local);
    assert!(reply.facilities[0].distance_km < reply.facilities[1].distance_km);

    Ok(())
}

#[tokio::test]
async fn every_dispatch_leaves_a_case_record() -> Result<()> {
    let store = Arc::new(Store::Memory(MemoryStore::new()));
    let resolver = FacilityResolver::new(
        vec![TierSource::Local(FacilityDataset::from_records(Vec::new()))],
        StaticDirectory::default(),
    );
    let agent = DispatchAgent::new(
        Arc::new(Lexicon::standard()),
        Arc::new(resolver),
        LogNotifier,
        Arc::clone(&store),
        AppMetrics::shared(),
    );

    agent.handle(request("chori hui hai, police bulao")).await?;

    let cases = store.recent_cases(5).await?;
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].service, Service::Police);
    assert_eq!(cases[0].urgency, Urgency::Serious);
    assert!(cases[0].facility_name.is_some());

    Ok(())
}
