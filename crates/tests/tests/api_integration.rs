use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use madadgar_api::build_app;
use serde_json::json;
use tower::ServiceExt;

fn data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/facilities")
}

fn dispatch_request(payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/dispatch")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_capabilities() {
    let app = build_app(data_root()).await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["capabilities"]["local_facilities"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn dispatch_returns_structured_reply() {
    let app = build_app(data_root()).await.expect("app should build");

    let response = app
        .oneshot(dispatch_request(json!({
            "text": "ایمبولینس چاہیے، مریض بے ہوش ہے",
            "lat": 24.8607,
            "lon": 67.0011,
            "network_quality": "fast"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(parsed["triage"]["language"], "urdu");
    assert_eq!(parsed["triage"]["service"], "medical");
    assert_eq!(parsed["triage"]["urgency"], 1);
    assert!(!parsed["reply_text"].as_str().unwrap().is_empty());
    assert!(!parsed["facilities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dispatch_resolves_from_the_local_dataset() {
    let app = build_app(data_root()).await.expect("app should build");

    let response = app
        .oneshot(dispatch_request(json!({
            "text": "dakaiti ho rahi hai, police bulao jaldi",
            "lat": 24.8607,
            "lon": 67.0011,
            "network_quality": "fast"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(parsed["triage"]["language"], "roman_urdu");
    assert_eq!(parsed["triage"]["service"], "police");
    assert_eq!(parsed["triage"]["urgency"], 2);
    assert_eq!(parsed["facilities"][0]["source_tier"], "local");
}

#[tokio::test]
async fn empty_text_maps_to_bad_request() {
    let app = build_app(data_root()).await.expect("app should build");

    let response = app
        .oneshot(dispatch_request(json!({
            "text": "   ",
            "lat": 24.8607,
            "lon": 67.0011
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], "empty_text");
}

#[tokio::test]
async fn greeting_gets_a_routine_general_reply() {
    let app = build_app(data_root()).await.expect("app should build");

    let response = app
        .oneshot(dispatch_request(json!({
            "text": "سلام علیکم",
            "lat": 24.8607,
            "lon": 67.0011,
            "network_quality": "fast"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(parsed["triage"]["service"], "general");
    assert_eq!(parsed["triage"]["urgency"], 3);
    assert_eq!(parsed["triage"]["greeting"], true);
}

#[tokio::test]
async fn slow_network_gets_the_minimal_rendering() {
    let app = build_app(data_root()).await.expect("app should build");

    let payload = |network: &str| {
        json!({
            "text": "Fire لگ گئی ہے، آگ emergency hai",
            "lat": 24.8607,
            "lon": 67.0011,
            "network_quality": network
        })
    };

    let slow_response = app.clone().oneshot(dispatch_request(payload("slow"))).await.unwrap();
    let fast_response = app.oneshot(dispatch_request(payload("fast"))).await.unwrap();

    let slow: serde_json::Value =
        serde_json::from_slice(&to_bytes(slow_response.into_body(), usize::MAX).await.unwrap())
            .unwrap();
    let fast: serde_json::Value =
        serde_json::from_slice(&to_bytes(fast_response.into_body(), usize::MAX).await.unwrap())
            .unwrap();

    assert_eq!(slow["triage"]["language"], "mixed");
    assert_eq!(slow["triage"]["service"], "disaster");
    assert_eq!(slow["triage"]["urgency"], 1);
    assert_eq!(slow["minimal"], true);
    assert_eq!(fast["minimal"], false);

    let slow_text = slow["reply_text"].as_str().unwrap();
    let fast_text = fast["reply_text"].as_str().unwrap();
    assert!(slow_text.len() < fast_text.len());
    assert!(slow_text.contains("🔴") && fast_text.contains("🔴"));
}
