// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::*;
use trcorpus::config::settings::SourceSettings;
use trcorpus::domain::models::FetchOutcome;
use trcorpus::engines::router::EngineRouter;
use trcorpus::infrastructure::sources::SourceCursor;
use trcorpus::utils::errors::PipelineError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, offset: u64, length: u64, texts: &[&str], total: u64) {
    Mock::given(method("GET"))
        .and(path("/rows"))
        .and(query_param("dataset", "turkish/haberler"))
        .and(query_param("config", "default"))
        .and(query_param("split", "train"))
        .and(query_param("offset", offset.to_string()))
        .and(query_param("length", length.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows_page(offset, texts, total)))
        .expect(1)
        .mount(server)
        .await;
}

fn hf_settings(output: &std::path::Path, server: &MockServer, page_size: usize) -> trcorpus::config::settings::Settings {
    let mut settings = test_settings(
        output,
        vec![SourceSettings::hf_rows(
            "haberler",
            "altyapi",
            "turkish/haberler",
            None,
        )],
    );
    settings.fetch.hf_rows_endpoint = format!("{}/rows", server.uri());
    settings.fetch.page_size = page_size;
    settings
}

#[tokio::test]
async fn test_rows_are_paginated_until_total() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 2, &TURKISH_SAMPLES[0..2], 5).await;
    mount_page(&server, 2, 2, &TURKISH_SAMPLES[2..4], 5).await;
    mount_page(&server, 4, 2, &TURKISH_SAMPLES[4..5], 5).await;

    let output = tempfile::tempdir().unwrap();
    let settings = hf_settings(output.path(), &server, 2);

    let mut pipeline = open_pipeline(settings.clone()).await;
    let entry = pipeline.run_source("haberler").await.unwrap();
    pipeline.close().await.unwrap();

    assert_eq!(entry.outcome, FetchOutcome::Completed);
    assert_eq!(entry.shards_fetched, 3);
    assert_eq!(entry.records_fetched, 5);
    assert_eq!(entry.records_written, 5);
    assert!(entry.bytes_fetched > 0);

    let corpus = read_corpus(&corpus_file(&settings, "altyapi", "haberler"));
    assert_eq!(corpus.len(), 5);
    // `label` is a kept metadata field
    assert_eq!(corpus[1]["label"], 1);
}

#[tokio::test]
async fn test_limit_shrinks_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 2, &TURKISH_SAMPLES[0..2], 6).await;
    mount_page(&server, 2, 1, &TURKISH_SAMPLES[2..3], 6).await;

    let output = tempfile::tempdir().unwrap();
    let mut settings = hf_settings(output.path(), &server, 2);
    settings.fetch.limit = Some(3);

    let mut pipeline = open_pipeline(settings).await;
    let entry = pipeline.run_source("haberler").await.unwrap();
    assert_eq!(entry.records_fetched, 3);
    assert_eq!(entry.records_written, 3);
}

#[tokio::test]
async fn test_server_error_marks_source_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rows"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let settings = hf_settings(output.path(), &server, 100);

    let mut pipeline = open_pipeline(settings.clone()).await;
    let entry = pipeline.run_source("haberler").await.unwrap();

    assert_eq!(entry.outcome, FetchOutcome::Unavailable);
    assert!(entry.error.as_deref().unwrap_or_default().contains("503"));
    assert!(!corpus_file(&settings, "altyapi", "haberler").exists());
    assert_eq!(read_manifest(&settings).len(), 1);
}

#[tokio::test]
async fn test_malformed_page_is_skipped_when_total_known() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 2, &TURKISH_SAMPLES[0..2], 6).await;
    Mock::given(method("GET"))
        .and(path("/rows"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bakım</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 4, 2, &TURKISH_SAMPLES[4..6], 6).await;

    let output = tempfile::tempdir().unwrap();
    let settings = hf_settings(output.path(), &server, 2);

    let mut pipeline = open_pipeline(settings).await;
    let entry = pipeline.run_source("haberler").await.unwrap();

    assert_eq!(entry.outcome, FetchOutcome::Partial);
    assert_eq!(entry.shard_failures.len(), 1);
    assert_eq!(entry.shard_failures[0].shard, "rows@2");
    assert_eq!(entry.records_written, 4);
}

#[tokio::test]
async fn test_cursor_yields_one_page_at_a_time() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 2, &TURKISH_SAMPLES[0..2], 3).await;
    mount_page(&server, 2, 2, &TURKISH_SAMPLES[2..3], 3).await;

    let output = tempfile::tempdir().unwrap();
    let settings = hf_settings(output.path(), &server, 2);
    let router = EngineRouter::from_settings(&settings.fetch).unwrap();
    let source = settings.find_source("haberler").unwrap();
    let mut cursor = SourceCursor::new(source, &settings.fetch, &router).unwrap();

    let first = cursor.next_shard().await.unwrap().unwrap();
    assert_eq!(first.id, "rows@0");
    assert_eq!(first.records.len(), 2);
    assert_eq!(first.records[1].position, 1);

    let second = cursor.next_shard().await.unwrap().unwrap();
    assert_eq!(second.id, "rows@2");
    assert_eq!(second.records.len(), 1);

    assert!(cursor.next_shard().await.is_none());
    assert_eq!(cursor.delivered(), 3);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let output = tempfile::tempdir().unwrap();
    let mut settings = test_settings(
        output.path(),
        vec![SourceSettings::hf_rows("kapali", "altyapi", "x/y", None)],
    );
    settings.fetch.hf_rows_endpoint = format!("{}/rows", uri);

    let router = EngineRouter::from_settings(&settings.fetch).unwrap();
    let source = settings.find_source("kapali").unwrap();
    let mut cursor = SourceCursor::new(source, &settings.fetch, &router).unwrap();

    assert!(matches!(
        cursor.next_shard().await,
        Some(Err(PipelineError::SourceUnavailable { .. }))
    ));
    assert!(cursor.next_shard().await.is_none());
}
