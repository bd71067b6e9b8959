// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use trcorpus::application::pipeline::CorpusPipeline;
use trcorpus::application::shutdown::ShutdownSignal;
use trcorpus::config::settings::{Settings, SourceSettings};
use trcorpus::domain::models::ManifestEntry;
use trcorpus::infrastructure::storage::FileManifestLog;

/// 足够长且包含土耳其语字母的样本文本
pub const TURKISH_SAMPLES: [&str; 6] = [
    "Bugün hava çok güzel ve güneşli.",
    "İstanbul Boğazı akşam saatlerinde çok kalabalık olur.",
    "Öğrenciler sınav haftasında kütüphanede çalışıyor.",
    "Çay bahçesinde arkadaşlarımla uzun uzun sohbet ettik.",
    "Şehrin eski mahallelerinde dar sokaklar bulunuyor.",
    "Yağmur yağdığı için maç ertelendi ve herkes üzüldü.",
];

pub fn test_settings(output: &Path, sources: Vec<SourceSettings>) -> Settings {
    let mut settings = Settings::default();
    settings.output.dir = output.to_path_buf();
    settings.output.flush_every = 2;
    settings.fetch.timeout_secs = 5;
    settings.sources = sources;
    settings
}

pub async fn open_pipeline(settings: Settings) -> CorpusPipeline {
    CorpusPipeline::open(settings, ShutdownSignal::new())
        .await
        .expect("pipeline should open")
}

/// 每行一个 `{"text": ...}` 对象
pub fn jsonl(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|text| json!({ "text": text }).to_string() + "\n")
        .collect()
}

/// 写入一个本地分片文件并返回其路径字符串
pub fn write_shard(dir: &Path, name: &str, content: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write shard");
    path.to_string_lossy().to_string()
}

pub fn corpus_file(settings: &Settings, category: &str, source_id: &str) -> PathBuf {
    settings
        .output
        .dir
        .join(category)
        .join(format!("{}.jsonl", source_id))
}

pub fn read_corpus(path: &Path) -> Vec<Value> {
    if !path.exists() {
        return Vec::new();
    }
    std::fs::read_to_string(path)
        .expect("read corpus")
        .lines()
        .map(|line| serde_json::from_str(line).expect("corpus line is JSON"))
        .collect()
}

pub fn read_manifest(settings: &Settings) -> Vec<ManifestEntry> {
    FileManifestLog::read_entries(&settings.manifest_path()).expect("read manifest")
}

/// datasets-server rows 接口的响应体
pub fn rows_page(offset: u64, texts: &[&str], total: u64) -> Value {
    let rows: Vec<Value> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            json!({
                "row_idx": offset + i as u64,
                "row": { "text": text, "label": i },
                "truncated_cells": []
            })
        })
        .collect();
    json!({
        "features": [{ "feature_idx": 0, "name": "text" }],
        "rows": rows,
        "num_rows_total": total,
        "num_rows_per_page": 100,
        "partial": false
    })
}
