// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::*;
use trcorpus::application::dto::run_summary::DownloadRequest;
use trcorpus::application::use_cases::download_use_case::DownloadUseCase;
use trcorpus::config::settings::SourceSettings;
use trcorpus::domain::models::{FetchOutcome, RejectReason};
use trcorpus::utils::errors::PipelineError;

#[tokio::test]
async fn test_mixed_records_add_exactly_one_entry() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();

    // a record already in the corpus from an earlier run
    std::fs::create_dir_all(output.path().join("egitim")).unwrap();
    std::fs::write(
        output.path().join("egitim/onceki.jsonl"),
        jsonl(&[TURKISH_SAMPLES[0]]),
    )
    .unwrap();

    let shard = write_shard(
        shards.path(),
        "a.jsonl",
        jsonl(&[TURKISH_SAMPLES[0], "Kısa", TURKISH_SAMPLES[1]]).as_bytes(),
    );
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl("kaynak-a", "altyapi", vec![shard])],
    );

    let mut pipeline = open_pipeline(settings.clone()).await;
    assert_eq!(pipeline.fingerprints(), 1);

    let entry = pipeline.run_source("kaynak-a").await.unwrap();
    pipeline.close().await.unwrap();

    assert_eq!(entry.outcome, FetchOutcome::Completed);
    assert_eq!(entry.records_fetched, 3);
    assert_eq!(entry.records_written, 1);
    assert_eq!(entry.rejected.get(&RejectReason::Duplicate), Some(&1));
    assert_eq!(entry.rejected.get(&RejectReason::TooShort), Some(&1));

    let corpus = read_corpus(&corpus_file(&settings, "altyapi", "kaynak-a"));
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus[0]["text"], TURKISH_SAMPLES[1]);
    assert_eq!(corpus[0]["source"], "kaynak-a");

    let manifest = read_manifest(&settings);
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].source_id, "kaynak-a");
    assert_eq!(manifest[0].records_fetched, 3);
}

#[tokio::test]
async fn test_unreachable_source_is_logged_and_run_continues() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();

    let missing = shards.path().join("yok.jsonl").to_string_lossy().to_string();
    let good = write_shard(shards.path(), "b.jsonl", jsonl(&TURKISH_SAMPLES[..2]).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![
            SourceSettings::jsonl("kaynak-b", "altyapi", vec![missing]),
            SourceSettings::jsonl("kaynak-c", "altyapi", vec![good]),
        ],
    );

    let pipeline = open_pipeline(settings.clone()).await;
    let summary = DownloadUseCase::new(pipeline)
        .execute(DownloadRequest::default())
        .await
        .unwrap();

    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.entries[0].outcome, FetchOutcome::Unavailable);
    assert!(summary.entries[0].error.is_some());
    assert_eq!(summary.entries[0].records_written, 0);
    assert_eq!(summary.entries[1].outcome, FetchOutcome::Completed);
    assert_eq!(summary.records_written(), 2);
    assert_eq!(summary.failed_sources(), vec!["kaynak-b"]);

    assert!(!corpus_file(&settings, "altyapi", "kaynak-b").exists());
    assert_eq!(read_corpus(&corpus_file(&settings, "altyapi", "kaynak-c")).len(), 2);

    let manifest = read_manifest(&settings);
    assert_eq!(manifest.len(), 2);
    assert!(manifest.iter().all(|e| e.run_id == summary.run_id));
}

#[tokio::test]
async fn test_corrupt_shard_is_skipped_siblings_processed() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();

    let first = write_shard(shards.path(), "0.jsonl", jsonl(&[TURKISH_SAMPLES[0]]).as_bytes());
    let mut corrupt = b"{\"text\": \"bozuk kay\xc4\xb1t \xff\xfe\"}\n".to_vec();
    corrupt.extend_from_slice(jsonl(&[TURKISH_SAMPLES[1]]).as_bytes());
    let broken = write_shard(shards.path(), "1.jsonl", &corrupt);
    let last = write_shard(shards.path(), "2.jsonl", jsonl(&[TURKISH_SAMPLES[2]]).as_bytes());

    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl(
            "parcali",
            "egitim",
            vec![first, broken.clone(), last],
        )],
    );

    let mut pipeline = open_pipeline(settings.clone()).await;
    let entry = pipeline.run_source("parcali").await.unwrap();
    pipeline.close().await.unwrap();

    assert_eq!(entry.outcome, FetchOutcome::Partial);
    assert_eq!(entry.shards_fetched, 2);
    assert_eq!(entry.shard_failures.len(), 1);
    assert_eq!(entry.shard_failures[0].shard, broken);
    assert_eq!(entry.records_written, 2);

    let texts: Vec<String> = read_corpus(&corpus_file(&settings, "egitim", "parcali"))
        .iter()
        .map(|line| line["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec![TURKISH_SAMPLES[0], TURKISH_SAMPLES[2]]);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let shard = write_shard(shards.path(), "a.jsonl", jsonl(&TURKISH_SAMPLES).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl("tekrar", "altyapi", vec![shard])],
    );

    for _ in 0..2 {
        let pipeline = open_pipeline(settings.clone()).await;
        DownloadUseCase::new(pipeline)
            .execute(DownloadRequest::default())
            .await
            .unwrap();
    }

    let manifest = read_manifest(&settings);
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[0].records_written, 6);
    assert_eq!(manifest[1].records_written, 0);
    assert_eq!(manifest[1].rejected.get(&RejectReason::Duplicate), Some(&6));
    assert_ne!(manifest[0].run_id, manifest[1].run_id);
    assert_eq!(read_corpus(&corpus_file(&settings, "altyapi", "tekrar")).len(), 6);
}

#[tokio::test]
async fn test_rerun_with_nested_category_is_idempotent() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let shard = write_shard(shards.path(), "a.jsonl", jsonl(&TURKISH_SAMPLES[..2]).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl("haber", "web/haber", vec![shard])],
    );

    let mut written = Vec::new();
    for _ in 0..2 {
        let mut pipeline = open_pipeline(settings.clone()).await;
        written.push(pipeline.run_source("haber").await.unwrap().records_written);
        pipeline.close().await.unwrap();
    }

    assert_eq!(written, vec![2, 0]);
    let corpus = read_corpus(&output.path().join("web_haber").join("haber.jsonl"));
    assert_eq!(corpus.len(), 2);
    assert!(!output.path().join("web").exists());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_full_disk_aborts_run_with_aborted_entry() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let shard = write_shard(shards.path(), "a.jsonl", jsonl(&TURKISH_SAMPLES[..3]).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![
            SourceSettings::jsonl("dolu", "altyapi", vec![shard.clone()]),
            SourceSettings::jsonl("sonraki", "egitim", vec![shard]),
        ],
    );
    std::fs::create_dir_all(output.path().join("altyapi")).unwrap();
    std::os::unix::fs::symlink("/dev/full", corpus_file(&settings, "altyapi", "dolu")).unwrap();

    let pipeline = open_pipeline(settings.clone()).await;
    let result = DownloadUseCase::new(pipeline)
        .execute(DownloadRequest::default())
        .await;
    assert!(matches!(result, Err(PipelineError::Storage(_))));

    let manifest = read_manifest(&settings);
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].source_id, "dolu");
    assert_eq!(manifest[0].outcome, FetchOutcome::Aborted);
    // flush_every is 2: the failing flush happens on the second record
    assert_eq!(manifest[0].records_fetched, 2);
    assert_eq!(manifest[0].records_written, 0);
    assert!(manifest[0].error.is_some());

    // the run stops before the next source
    assert!(!corpus_file(&settings, "egitim", "sonraki").exists());
}

#[tokio::test]
async fn test_duplicates_across_sources_in_one_run() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let first = write_shard(shards.path(), "x.jsonl", jsonl(&TURKISH_SAMPLES[..3]).as_bytes());
    let second = write_shard(shards.path(), "y.jsonl", jsonl(&TURKISH_SAMPLES[2..5]).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![
            SourceSettings::jsonl("x", "altyapi", vec![first]),
            SourceSettings::jsonl("y", "mizah", vec![second]),
        ],
    );

    let summary = DownloadUseCase::new(open_pipeline(settings.clone()).await)
        .execute(DownloadRequest::default())
        .await
        .unwrap();

    assert_eq!(summary.entries[0].records_written, 3);
    assert_eq!(summary.entries[1].records_written, 2);
    assert_eq!(
        summary.entries[1].rejected.get(&RejectReason::Duplicate),
        Some(&1)
    );
}

#[tokio::test]
async fn test_incomplete_tail_is_truncated_before_appending() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let shard = write_shard(shards.path(), "a.jsonl", jsonl(&[TURKISH_SAMPLES[3]]).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl("kuyruk", "altyapi", vec![shard])],
    );

    let path = corpus_file(&settings, "altyapi", "kuyruk");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut seeded = jsonl(&[TURKISH_SAMPLES[0]]);
    seeded.push_str("{\"text\": \"yarım kal");
    std::fs::write(&path, seeded).unwrap();

    let mut pipeline = open_pipeline(settings.clone()).await;
    pipeline.run_source("kuyruk").await.unwrap();
    pipeline.close().await.unwrap();

    let corpus = read_corpus(&path);
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0]["text"], TURKISH_SAMPLES[0]);
    assert_eq!(corpus[1]["text"], TURKISH_SAMPLES[3]);
}

#[tokio::test]
async fn test_language_check_can_be_disabled() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let english = "The committee approved the new budget yesterday.";
    let shard = write_shard(
        shards.path(),
        "a.jsonl",
        jsonl(&[english, TURKISH_SAMPLES[4]]).as_bytes(),
    );
    let sources = vec![SourceSettings::jsonl("dil", "altyapi", vec![shard])];

    let checked = tempfile::tempdir().unwrap();
    let mut pipeline = open_pipeline(test_settings(checked.path(), sources.clone())).await;
    let entry = pipeline.run_source("dil").await.unwrap();
    assert_eq!(entry.records_written, 1);
    assert_eq!(entry.rejected.get(&RejectReason::NotTurkish), Some(&1));

    let mut settings = test_settings(output.path(), sources);
    settings.cleaning.language.enabled = false;
    let mut pipeline = open_pipeline(settings).await;
    let entry = pipeline.run_source("dil").await.unwrap();
    assert_eq!(entry.records_written, 2);
}

#[tokio::test]
async fn test_interrupted_run_records_interrupted_entry() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let shard = write_shard(shards.path(), "a.jsonl", jsonl(&TURKISH_SAMPLES).as_bytes());
    let settings = test_settings(
        output.path(),
        vec![
            SourceSettings::jsonl("durdur", "altyapi", vec![shard.clone()]),
            SourceSettings::jsonl("sonraki", "altyapi", vec![shard]),
        ],
    );

    let shutdown = trcorpus::application::shutdown::ShutdownSignal::new();
    let pipeline = trcorpus::application::pipeline::CorpusPipeline::open(
        settings.clone(),
        shutdown.clone(),
    )
    .await
    .unwrap();
    shutdown.trigger();

    let summary = DownloadUseCase::new(pipeline)
        .execute(DownloadRequest::default())
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert!(summary.entries.is_empty());
    assert!(read_manifest(&settings).is_empty());

    // a signal arriving while a source is in progress
    let shutdown = trcorpus::application::shutdown::ShutdownSignal::new();
    let mut pipeline = trcorpus::application::pipeline::CorpusPipeline::open(
        settings.clone(),
        shutdown.clone(),
    )
    .await
    .unwrap();
    shutdown.trigger();
    let entry = pipeline.run_source("durdur").await.unwrap();
    assert_eq!(entry.outcome, FetchOutcome::Interrupted);
    assert_eq!(entry.records_written, 0);
    assert_eq!(read_manifest(&settings).len(), 1);
}

#[tokio::test]
async fn test_fetch_collects_records_and_failures() {
    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let good = write_shard(shards.path(), "ok.txt", "birinci satır\nikinci satır\n".as_bytes());
    let bad = write_shard(shards.path(), "bad.txt", b"\xff\xfe\xfd bozuk\n");
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::text("metin", "mizah", vec![good, bad.clone()])],
    );

    let pipeline = open_pipeline(settings).await;
    let fetched = pipeline.fetch("metin").await.unwrap();
    assert_eq!(fetched.records.len(), 2);
    assert_eq!(fetched.shards_fetched, 1);
    assert_eq!(fetched.shard_failures.len(), 1);
    assert_eq!(fetched.shard_failures[0].shard, bad);

    assert!(matches!(
        pipeline.fetch("yok").await,
        Err(PipelineError::UnknownSource(id)) if id == "yok"
    ));
}

#[tokio::test]
async fn test_gzip_shard_is_decompressed() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let output = tempfile::tempdir().unwrap();
    let shards = tempfile::tempdir().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(jsonl(&TURKISH_SAMPLES[..3]).as_bytes())
        .unwrap();
    let shard = write_shard(shards.path(), "a.jsonl.gz", &encoder.finish().unwrap());
    let settings = test_settings(
        output.path(),
        vec![SourceSettings::jsonl("sikistirilmis", "altyapi", vec![shard])],
    );

    let mut pipeline = open_pipeline(settings).await;
    let entry = pipeline.run_source("sikistirilmis").await.unwrap();
    assert_eq!(entry.outcome, FetchOutcome::Completed);
    assert_eq!(entry.records_written, 3);
}
