// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::settings::OutputFormat;
use crate::domain::models::CleanedRecord;
use crate::domain::repositories::{CorpusRepository, StorageError};
use crate::domain::services::dedup_service::FingerprintIndex;
use crate::infrastructure::storage::line_file::{line_text, list_corpus_files, scan_lines};
use crate::utils::text_processing::safe_file_stem;

/// 打开输出目录时的恢复结果
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryReport {
    /// 扫描的语料文件数
    pub files: usize,
    /// 载入索引的记录数
    pub records: u64,
    /// 截断的不完整尾行字节数
    pub truncated_bytes: u64,
}

/// 文件语料存储
///
/// 每个数据源对应 `<root>/<category>/<source_id>.<ext>`，只追加写入。
/// 记录先缓冲在内存中，每 `flush_every` 条写入一次；写入失败时文件被截断回
/// 最后一次成功刷新的长度，保证不会留下半行。
pub struct FileCorpusStore {
    root: PathBuf,
    format: OutputFormat,
    flush_every: usize,
    writers: HashMap<PathBuf, CorpusWriter>,
}

struct CorpusWriter {
    path: PathBuf,
    file: File,
    buffer: Vec<u8>,
    buffered_records: usize,
    committed_len: u64,
}

impl CorpusWriter {
    async fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        let committed_len = file.metadata().await?.len();

        debug!(path = %path.display(), committed_len, "Opened corpus file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffer: Vec::new(),
            buffered_records: 0,
            committed_len,
        })
    }

    /// 写出缓冲区，返回落盘的记录数
    async fn flush(&mut self) -> Result<usize, StorageError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.write_buffer().await {
            warn!(
                path = %self.path.display(),
                discarded = self.buffered_records,
                error = %e,
                "Corpus write failed, discarding buffered records"
            );
            self.buffer.clear();
            self.buffered_records = 0;
            if let Err(truncate_err) = self.file.set_len(self.committed_len).await {
                warn!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "Failed to roll back corpus file after write error"
                );
            }
            return Err(StorageError::Io(e));
        }

        let committed = self.buffered_records;
        self.committed_len += self.buffer.len() as u64;
        self.buffer.clear();
        self.buffered_records = 0;
        Ok(committed)
    }

    async fn write_buffer(&mut self) -> std::io::Result<()> {
        self.file.write_all(&self.buffer).await?;
        self.file.flush().await
    }
}

fn recover(root: &Path, index: &mut FingerprintIndex) -> Result<RecoveryReport, StorageError> {
    let mut report = RecoveryReport::default();
    for corpus_file in list_corpus_files(root) {
        let scan = scan_lines(&corpus_file.path, true, |line| {
            if let Some(text) = line_text(line, corpus_file.format) {
                index.insert_text(&text);
                report.records += 1;
            }
        })?;

        if scan.has_incomplete_tail() {
            warn!(
                path = %corpus_file.path.display(),
                bytes = scan.tail_bytes,
                "Truncated incomplete trailing record"
            );
            report.truncated_bytes += scan.tail_bytes;
        }
        report.files += 1;
    }
    Ok(report)
}

impl FileCorpusStore {
    /// 打开输出目录
    ///
    /// 截断所有语料文件末尾的不完整行，并把已有记录的指纹载入 `index`。
    /// 扫描在阻塞线程池中执行。只在启动时调用一次。
    pub async fn open(
        root: &Path,
        format: OutputFormat,
        flush_every: usize,
        index: &mut FingerprintIndex,
    ) -> Result<(Self, RecoveryReport), StorageError> {
        fs::create_dir_all(root).await?;

        let scan_root = root.to_path_buf();
        let mut scanned = std::mem::take(index);
        let (scanned, report) = tokio::task::spawn_blocking(move || {
            recover(&scan_root, &mut scanned).map(|report| (scanned, report))
        })
        .await
        .map_err(|e| StorageError::Other(format!("corpus recovery task failed: {}", e)))??;
        *index = scanned;

        info!(
            root = %root.display(),
            files = report.files,
            records = report.records,
            fingerprints = index.len(),
            "Corpus directory recovered"
        );

        Ok((
            Self {
                root: root.to_path_buf(),
                format,
                flush_every: flush_every.max(1),
                writers: HashMap::new(),
            },
            report,
        ))
    }

    /// 数据源对应的语料文件路径
    ///
    /// 分类与标识都被转换为单个安全的路径段，文件总是位于 `root` 下第二层，
    /// 与启动时的扫描深度一致
    pub fn corpus_path(&self, category: &str, source_id: &str) -> PathBuf {
        self.root.join(safe_file_stem(category)).join(format!(
            "{}.{}",
            safe_file_stem(source_id),
            self.format.extension()
        ))
    }

    /// 渲染一行语料（不含换行符）
    ///
    /// JSON Lines 固定包含 `text` 与 `source`，其后是保留的元数据字段
    pub fn render(&self, record: &CleanedRecord) -> Result<String, StorageError> {
        match self.format {
            OutputFormat::Jsonl => {
                let mut object = Map::new();
                object.insert("text".to_string(), Value::String(record.text.clone()));
                object.insert(
                    "source".to_string(),
                    Value::String(record.source_id.clone()),
                );
                for (key, value) in &record.metadata {
                    object.entry(key.clone()).or_insert_with(|| value.clone());
                }
                Ok(serde_json::to_string(&Value::Object(object))?)
            }
            OutputFormat::Text => Ok(record.text.clone()),
        }
    }
}

#[async_trait]
impl CorpusRepository for FileCorpusStore {
    async fn append(&mut self, record: &CleanedRecord) -> Result<usize, StorageError> {
        let mut line = self.render(record)?;
        line.push('\n');

        let path = self.corpus_path(&record.category, &record.source_id);
        let flush_every = self.flush_every;
        let writer = match self.writers.entry(path) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let writer = CorpusWriter::open(entry.key()).await?;
                entry.insert(writer)
            }
        };

        writer.buffer.extend_from_slice(line.as_bytes());
        writer.buffered_records += 1;
        if writer.buffered_records >= flush_every {
            return writer.flush().await;
        }
        Ok(0)
    }

    async fn flush(&mut self) -> Result<usize, StorageError> {
        let mut committed = 0;
        for writer in self.writers.values_mut() {
            committed += writer.flush().await?;
        }
        Ok(committed)
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        for writer in self.writers.values_mut() {
            writer.flush().await?;
            writer.file.sync_all().await?;
        }
        self.writers.clear();
        Ok(())
    }
}
