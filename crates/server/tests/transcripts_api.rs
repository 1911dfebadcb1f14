//! HTTP surface tests: transcript index, documents, health, config, metrics.

mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use middleman_core::{TranscriptPublisher, TranscriptRecord};
use middleman_core::transcript::TranscriptEntry;

use common::{fixtures, TestFixture};

fn record(channel: &str, day: u32) -> TranscriptRecord {
    let at = Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap();
    let entries = vec![
        TranscriptEntry::from(fixtures::history_message("alice", "deal?", 0)),
        TranscriptEntry::from(fixtures::history_message("bob", "<deal>", 10)),
    ];
    TranscriptRecord::new(channel, at, entries)
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["bot"]["token_configured"], true);
    assert_eq!(response.body["bot"]["command_prefix"], "!");
    assert_eq!(response.body["server"]["port"], 5999);
    assert_eq!(response.body["tickets"]["category_name"], "TICKETS");
    assert!(!response.text.contains("super-secret-token"));
}

#[tokio::test]
async fn test_index_lists_newest_first() {
    let fixture = TestFixture::new();
    fixture.publisher.publish(&record("trial_middleman-1", 1)).await.unwrap();
    fixture.publisher.publish(&record("head_middleman-2", 3)).await.unwrap();

    let response = fixture.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type
        .as_deref()
        .unwrap_or_default()
        .starts_with("text/html"));

    let trial = response
        .text
        .find("Trial_Middleman 1 20240601 120000")
        .expect("trial transcript listed");
    let head = response
        .text
        .find("Head_Middleman 2 20240603 120000")
        .expect("head transcript listed");
    // Filenames sort descending: "transcript-t..." before "transcript-h...".
    assert!(trial < head);
    assert!(response
        .text
        .contains("href=\"/transcripts/transcript-head_middleman-2-20240603-120000.html\""));
}

#[tokio::test]
async fn test_empty_index() {
    let fixture = TestFixture::new();
    let response = fixture.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("No transcripts yet."));
}

#[tokio::test]
async fn test_document_is_served() {
    let fixture = TestFixture::new();
    let published = fixture
        .publisher
        .publish(&record("advanced_middleman-4", 2))
        .await
        .unwrap();
    assert_eq!(
        published.url,
        format!("{}/transcripts/{}", common::BASE_URL, published.filename)
    );

    let response = fixture
        .get(&format!("/transcripts/{}", published.filename))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.starts_with("<!DOCTYPE html>"));
    assert!(response.text.contains("Transcript #advanced_middleman-4"));
    assert!(response.text.contains("&lt;deal&gt;"));
    assert_eq!(response.text.matches(r#"<div class="message">"#).count(), 2);
}

#[tokio::test]
async fn test_missing_document_is_404() {
    let fixture = TestFixture::new();

    let response = fixture.get("/transcripts/transcript-nope.html").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = fixture.get("/transcripts/../Cargo.toml").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = fixture.get("/no/such/route").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_listing() {
    let fixture = TestFixture::new();
    fixture.publisher.publish(&record("trial_middleman-9", 5)).await.unwrap();
    std::fs::write(fixture.temp_dir.path().join("notes.txt"), "ignored").unwrap();

    let response = fixture.get("/api/v1/transcripts").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(
        response.body["transcripts"][0]["filename"],
        "transcript-trial_middleman-9-20240605-120000.html"
    );
    assert!(response.body["transcripts"][0]["size_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.publisher.publish(&record("trial_middleman-1", 1)).await.unwrap();
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("middleman_http_requests_total"));
    assert!(response.text.contains("middleman_transcripts_stored"));
}
