//! Integration tests for GET /api/v1/huddles/{id}/summary.
//!
//! Tests the summary derivation including:
//! - Distinct participant counting regardless of duplicate users
//! - Duration as (max - min) event timestamp in seconds
//! - Zero-valued summary (success, not 404) for eventless and unknown ids
//!
//! Duration-exactness tests insert event rows directly with explicit
//! timestamps, since the API stamps events at append time.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use chrono::{Duration, Utc};
use huddle_test_utils::TestHuddleServer;
use sqlx::PgPool;

async fn start_huddle(server: &TestHuddleServer, channel: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/v1/huddles", server.url()))
        .json(&serde_json::json!({ "channel_id": channel }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);

    let body: serde_json::Value = resp.json().await?;
    Ok(body["huddle_id"].as_str().unwrap().to_string())
}

async fn log_event(
    server: &TestHuddleServer,
    huddle_id: &str,
    user_id: &str,
    event_type: &str,
    metadata: Option<serde_json::Value>,
) -> Result<()> {
    let mut body = serde_json::json!({ "user_id": user_id, "event_type": event_type });
    if let Some(metadata) = metadata {
        body["metadata"] = metadata;
    }

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/v1/huddles/{}/events", server.url(), huddle_id))
        .json(&body)
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    Ok(())
}

async fn insert_event_at(
    pool: &PgPool,
    huddle_id: &str,
    user_id: &str,
    timestamp: chrono::DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO huddle_logs (huddle_id, user_id, event_type, event_timestamp)
        VALUES ($1, $2, 'JOINED', $3)
        "#,
    )
    .bind(huddle_id)
    .bind(user_id)
    .bind(timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_counts_distinct_participants(pool: PgPool) -> Result<()> {
    // Two users join, one of them mutes with metadata.
    let server = TestHuddleServer::spawn(pool).await?;
    let huddle_id = start_huddle(&server, "general").await?;

    log_event(&server, &huddle_id, "u1", "JOINED", None).await?;
    log_event(&server, &huddle_id, "u2", "JOINED", None).await?;
    log_event(
        &server,
        &huddle_id,
        "u1",
        "MUTED",
        Some(serde_json::json!({ "reason": "noise" })),
    )
    .await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        huddle_id
    ))
    .await?;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["huddle_id"], huddle_id.as_str());
    assert_eq!(body["total_participants"], 2);
    assert!(body["duration_seconds"].as_f64().unwrap() >= 0.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_unknown_id_is_zero_valued_success(pool: PgPool) -> Result<()> {
    // Absence of rows is a valid zero result, never a 404.
    let server = TestHuddleServer::spawn(pool).await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/nonexistent-id/summary",
        server.url()
    ))
    .await?;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["huddle_id"], "nonexistent-id");
    assert_eq!(body["total_participants"], 0);
    assert_eq!(body["duration_seconds"], 0.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_eventless_huddle_is_zero_valued(pool: PgPool) -> Result<()> {
    let server = TestHuddleServer::spawn(pool).await?;
    let huddle_id = start_huddle(&server, "general").await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        huddle_id
    ))
    .await?;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 0);
    assert_eq!(body["duration_seconds"], 0.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_single_event_has_zero_duration(pool: PgPool) -> Result<()> {
    let server = TestHuddleServer::spawn(pool).await?;
    let huddle_id = start_huddle(&server, "general").await?;

    log_event(&server, &huddle_id, "u1", "JOINED", None).await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        huddle_id
    ))
    .await?;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 1);
    assert_eq!(body["duration_seconds"], 0.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_duration_is_max_minus_min(pool: PgPool) -> Result<()> {
    let server = TestHuddleServer::spawn(pool.clone()).await?;

    // Insert events with explicit timestamps spanning 90 seconds,
    // deliberately out of arrival order: the aggregation uses timestamp
    // ordering, not insertion order.
    let base = Utc::now() - Duration::minutes(10);
    insert_event_at(&pool, "h-timed", "u1", base + Duration::seconds(30)).await?;
    insert_event_at(&pool, "h-timed", "u2", base + Duration::seconds(90)).await?;
    insert_event_at(&pool, "h-timed", "u1", base).await?;

    let resp = reqwest::get(format!("{}/api/v1/huddles/h-timed/summary", server.url())).await?;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 2);

    let duration = body["duration_seconds"].as_f64().unwrap();
    assert!(
        (duration - 90.0).abs() < 0.001,
        "expected 90s duration, got {duration}"
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_scopes_to_the_queried_huddle(pool: PgPool) -> Result<()> {
    let server = TestHuddleServer::spawn(pool).await?;
    let first = start_huddle(&server, "general").await?;
    let second = start_huddle(&server, "random").await?;

    log_event(&server, &first, "u1", "JOINED", None).await?;
    log_event(&server, &first, "u2", "JOINED", None).await?;
    log_event(&server, &second, "u3", "JOINED", None).await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        second
    ))
    .await?;
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_summary_is_computed_fresh_on_every_query(pool: PgPool) -> Result<()> {
    // Never cached: a summary taken between appends reflects only the
    // events committed at query time.
    let server = TestHuddleServer::spawn(pool).await?;
    let huddle_id = start_huddle(&server, "general").await?;

    log_event(&server, &huddle_id, "u1", "JOINED", None).await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        huddle_id
    ))
    .await?;
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 1);

    log_event(&server, &huddle_id, "u2", "JOINED", None).await?;

    let resp = reqwest::get(format!(
        "{}/api/v1/huddles/{}/summary",
        server.url(),
        huddle_id
    ))
    .await?;
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["total_participants"], 2);

    Ok(())
}
