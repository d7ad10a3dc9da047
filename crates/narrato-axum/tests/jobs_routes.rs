//! Integration tests for the `/jobs` HTTP endpoints.
//!
//! The router is driven in-process with `oneshot`; the synthesis backend is
//! a stub that writes a fixed payload, fails on `FAIL` and blocks on `SLOW`.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use narrato_axum::ServerConfig;
use narrato_core::{JobSettings, SchedulePolicy};
use serde_json::json;

use common::{
    AUDIO, FAIL_MARKER, SLOW_MARKER, StubSynth, TestApp, test_app, test_app_with, two_chunk_text,
};

const UNKNOWN_JOB: &str = "00000000-0000-4000-8000-000000000000";

async fn wait_for_status(app: &TestApp, uri: &str, wanted: &str) -> serde_json::Value {
    for _ in 0..500 {
        let (status, json) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {json}");
        if json["status"] == wanted {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{uri} never reached {wanted}");
}

// ── POST /jobs ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_returns_first_chunk_ready() {
    let app = test_app(StubSynth::new());

    let json = app.create_job("Hello there. General Kenobi.").await;

    let job_id = json["jobId"].as_str().unwrap();
    assert_eq!(json["totalChunks"], 1);
    assert_eq!(json["firstChunk"]["index"], 1);
    assert_eq!(json["firstChunk"]["status"], "done");
    assert_eq!(
        json["firstChunk"]["artifactUrl"],
        format!("/outputs/{job_id}_part1.wav")
    );
}

#[tokio::test]
async fn test_artifact_is_served_from_outputs() {
    let app = test_app(StubSynth::new());
    let json = app.create_job("Hello.").await;
    let url = json["firstChunk"]["artifactUrl"].as_str().unwrap();

    let (status, body) = app
        .send(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, AUDIO);
}

#[tokio::test]
async fn test_public_base_url_makes_absolute_urls() {
    let app = test_app_with(
        StubSynth::new(),
        ServerConfig::default().with_public_base_url("http://tts.local:8000/"),
    );

    let json = app.create_job("Hello.").await;
    let url = json["firstChunk"]["artifactUrl"].as_str().unwrap();

    assert!(url.starts_with("http://tts.local:8000/outputs/"), "{url}");
}

#[tokio::test]
async fn test_create_rejects_empty_text() {
    let app = test_app(StubSynth::new());

    let (status, json) = app
        .post_json("/jobs", &json!({ "text": "  . . ", "voice": "speaker.wav" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().is_some());
    assert!(app.jobs.store().is_empty());
}

#[tokio::test]
async fn test_create_rejects_unknown_voice() {
    let app = test_app(StubSynth::new());

    let (status, _) = app
        .post_json("/jobs", &json!({ "text": "Hello.", "voice": "missing.wav" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_unavailable_backend_is_503() {
    let app = test_app(StubSynth::unhealthy());

    let (status, json) = app
        .post_json("/jobs", &json!({ "text": "Hello.", "voice": "speaker.wav" }))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_first_chunk_failure_is_500_without_job() {
    let app = test_app(StubSynth::new());

    let (status, json) = app
        .post_json(
            "/jobs",
            &json!({ "text": format!("{FAIL_MARKER}. Fine."), "voice": "speaker.wav" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["type"], "CHUNK_SYNTHESIS_FAILED");
    assert_eq!(json["metadata"]["index"], 1);
    assert!(app.jobs.store().is_empty());
}

// ── GET /jobs/{id}/chunks/{index} ──────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_background_chunk_goes_pending_to_done() {
    let app = test_app(StubSynth::new());
    let json = app.create_job(&two_chunk_text(SLOW_MARKER)).await;
    let job_id = json["jobId"].as_str().unwrap();
    assert_eq!(json["totalChunks"], 2);

    let uri = format!("/jobs/{job_id}/chunks/2");
    let (status, pending) = app.get_json(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending, json!({ "index": 2, "status": "pending" }));

    app.synth.release();
    let done = wait_for_status(&app, &uri, "done").await;
    assert_eq!(done["artifactUrl"], format!("/outputs/{job_id}_part2.wav"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_background_failure_is_reported() {
    let app = test_app(StubSynth::new());
    let json = app.create_job(&two_chunk_text(FAIL_MARKER)).await;
    let job_id = json["jobId"].as_str().unwrap();

    let failed = wait_for_status(&app, &format!("/jobs/{job_id}/chunks/2"), "failed").await;
    assert!(failed["error"].as_str().unwrap().contains("engine crashed"));
    assert!(failed.get("artifactUrl").is_none());
}

#[tokio::test]
async fn test_unknown_job_and_chunk_are_404() {
    let app = test_app(StubSynth::new());
    let json = app.create_job("Hello.").await;
    let job_id = json["jobId"].as_str().unwrap();
    let unknown = UNKNOWN_JOB;

    for uri in [
        format!("/jobs/{unknown}/chunks/1"),
        "/jobs/not-a-uuid/chunks/1".to_string(),
        format!("/jobs/{job_id}/chunks/0"),
        format!("/jobs/{job_id}/chunks/2"),
        format!("/jobs/{job_id}/chunks/-1"),
        format!("/jobs/{job_id}/chunks/first"),
        format!("/jobs/{unknown}"),
    ] {
        let (status, body) = app.get_json(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}: {body}");
        assert_eq!(body["status"], 404);
        assert!(body.get("type").is_none());
    }
}

#[tokio::test]
async fn test_expired_artifact_is_404_with_type() {
    let app = test_app(StubSynth::new());
    let json = app.create_job("Hello.").await;
    let job_id = json["jobId"].as_str().unwrap();

    app.jobs
        .janitor()
        .sweep(Utc::now() + chrono::Duration::seconds(301))
        .await;

    let (status, body) = app.get_json(&format!("/jobs/{job_id}/chunks/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["type"], "ARTIFACT_EXPIRED");
}

// ── GET /jobs/{id} ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_job_snapshot_lists_every_chunk() {
    let app = test_app(StubSynth::new());
    let json = app.create_job(&two_chunk_text(SLOW_MARKER)).await;
    let job_id = json["jobId"].as_str().unwrap();

    let (status, snapshot) = app.get_json(&format!("/jobs/{job_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["jobId"], job_id);
    assert_eq!(snapshot["totalChunks"], 2);
    assert!(snapshot["createdAt"].as_str().is_some());
    let chunks = snapshot["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0]["status"], "done");
    assert_eq!(chunks[1]["status"], "pending");

    app.synth.release();
}

// ── POST /jobs/{id}/chunks/{index}/fetch ───────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_synthesizes_under_lookahead() {
    let app = test_app_with(
        StubSynth::new(),
        ServerConfig::default().with_job_settings(JobSettings {
            policy: SchedulePolicy::Lookahead,
            ..JobSettings::default()
        }),
    );
    let text = format!(
        "{}. {}. {}.",
        "a".repeat(300),
        "b".repeat(300),
        "c".repeat(300)
    );
    let json = app.create_job(&text).await;
    let job_id = json["jobId"].as_str().unwrap();
    assert_eq!(json["totalChunks"], 3);

    let (status, fetched) = app
        .post_json(&format!("/jobs/{job_id}/chunks/3/fetch"), &json!({}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["index"], 3);
    assert_eq!(fetched["status"], "done");
}

#[tokio::test]
async fn test_fetch_unknown_chunk_is_404() {
    let app = test_app(StubSynth::new());
    let json = app.create_job("Hello.").await;
    let job_id = json["jobId"].as_str().unwrap();

    for index in ["9", "-2", "x"] {
        let (status, body) = app
            .post_json(&format!("/jobs/{job_id}/chunks/{index}/fetch"), &json!({}))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{index}: {body}");
        assert_eq!(body["status"], 404);
    }
}

// ── GET /health ────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reflects_backend() {
    let healthy = test_app(StubSynth::new());
    let (status, body) = healthy
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let broken = test_app(StubSynth::unhealthy());
    let (status, _) = broken
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
