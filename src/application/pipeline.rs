// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::shutdown::ShutdownSignal;
use crate::config::settings::{Settings, SourceSettings};
use crate::domain::models::{
    CleanOutcome, CleanedRecord, FetchOutcome, FetchedSource, Fingerprint, ManifestEntry,
    RawRecord, RejectReason, ShardFailure,
};
use crate::domain::repositories::{CorpusRepository, ManifestRepository};
use crate::domain::services::cleaning_service::{CleaningService, SourceProfile};
use crate::domain::services::dedup_service::FingerprintIndex;
use crate::engines::router::EngineRouter;
use crate::infrastructure::sources::SourceCursor;
use crate::infrastructure::storage::{FileCorpusStore, FileManifestLog};
use crate::utils::errors::PipelineError;
use crate::utils::format::{format_duration, format_size, rate_per_second};

/// 单个数据源处理过程中的计数
#[derive(Debug, Default)]
struct SourceTally {
    shards_fetched: u64,
    records_fetched: u64,
    records_written: u64,
    rejected: BTreeMap<RejectReason, u64>,
    shard_failures: Vec<ShardFailure>,
    bytes_fetched: u64,
}

impl SourceTally {
    fn reject(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_default() += 1;
    }
}

/// 持久化阶段的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// 指纹已存在，未写入
    Duplicate,
    /// 已追加到语料；`committed` 为本次调用实际落盘的记录数
    Appended { committed: usize },
}

/// 按标识查找数据源
fn find_source<'a>(
    settings: &'a Settings,
    source_id: &str,
) -> Result<&'a SourceSettings, PipelineError> {
    settings
        .find_source(source_id)
        .ok_or_else(|| PipelineError::UnknownSource(source_id.to_string()))
}

/// 语料流水线
///
/// 依次执行 获取 → 清洗 → 持久化 → 记录 四个阶段。
/// 数据源按顺序处理，每个数据源内部逐分片、逐记录推进，内存中最多持有一个分片。
pub struct CorpusPipeline {
    settings: Arc<Settings>,
    router: Arc<EngineRouter>,
    cleaner: CleaningService,
    index: FingerprintIndex,
    corpus: Box<dyn CorpusRepository>,
    manifest: Box<dyn ManifestRepository>,
    // appended but still buffered, oldest first
    pending: Vec<Fingerprint>,
    run_id: Uuid,
    shutdown: ShutdownSignal,
}

impl CorpusPipeline {
    /// 使用给定组件创建流水线
    ///
    /// `index` 必须已包含 `corpus` 中现有记录的指纹
    pub fn new(
        settings: Arc<Settings>,
        router: Arc<EngineRouter>,
        index: FingerprintIndex,
        corpus: Box<dyn CorpusRepository>,
        manifest: Box<dyn ManifestRepository>,
        shutdown: ShutdownSignal,
    ) -> Self {
        let cleaner = CleaningService::new(&settings.cleaning);
        Self {
            settings,
            router,
            cleaner,
            index,
            corpus,
            manifest,
            pending: Vec::new(),
            run_id: Uuid::new_v4(),
            shutdown,
        }
    }

    /// 打开输出目录并组装默认组件
    ///
    /// 修复语料文件与清单的不完整尾行，并从已有语料重建指纹索引
    pub async fn open(settings: Settings, shutdown: ShutdownSignal) -> Result<Self, PipelineError> {
        let router = EngineRouter::from_settings(&settings.fetch)
            .map_err(|e| PipelineError::Configuration(format!("HTTP client: {}", e)))?;

        let mut index = FingerprintIndex::new(settings.cleaning.dedup.case_insensitive);
        let (corpus, _) = FileCorpusStore::open(
            &settings.output.dir,
            settings.output.format,
            settings.output.flush_every,
            &mut index,
        )
        .await?;
        let manifest = FileManifestLog::open(&settings.manifest_path()).await?;

        Ok(Self::new(
            Arc::new(settings),
            Arc::new(router),
            index,
            Box::new(corpus),
            Box::new(manifest),
            shutdown,
        ))
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 当前索引中的指纹数量
    pub fn fingerprints(&self) -> usize {
        self.index.len()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// 查找数据源
    pub fn source(&self, source_id: &str) -> Result<&SourceSettings, PipelineError> {
        find_source(&self.settings, source_id)
    }

    /// 获取阶段：一次性获取数据源的全部记录
    ///
    /// 格式错误的分片被跳过并记入结果；`run_source` 使用逐分片的游标而不是该方法
    pub async fn fetch(&self, source_id: &str) -> Result<FetchedSource, PipelineError> {
        let source = self.source(source_id)?;
        SourceCursor::new(source, &self.settings.fetch, &self.router)?
            .collect()
            .await
    }

    /// 数据源的清洗参数
    pub fn profile(&self, source: &SourceSettings) -> SourceProfile {
        SourceProfile::from_settings(source, self.settings.cleaning.language.enabled)
    }

    /// 清洗阶段
    pub fn clean(&self, raw: &RawRecord, profile: &SourceProfile) -> CleanOutcome {
        self.cleaner.clean(raw, profile, &self.index)
    }

    /// 持久化阶段
    ///
    /// 指纹在追加时立即登记，使同一次运行中的重复记录被识别；
    /// 写入失败时所有尚未落盘记录的指纹被撤销。
    ///
    /// # 返回值
    ///
    /// * `Ok(PersistOutcome::Appended { .. })` - 已追加到语料
    /// * `Ok(PersistOutcome::Duplicate)` - 指纹已存在，未写入
    /// * `Err(PipelineError::Storage)` - 写入失败，缓冲的记录已丢弃
    pub async fn persist(
        &mut self,
        record: CleanedRecord,
    ) -> Result<PersistOutcome, PipelineError> {
        if !self.index.insert(record.fingerprint) {
            return Ok(PersistOutcome::Duplicate);
        }
        self.pending.push(record.fingerprint);

        match self.corpus.append(&record).await {
            Ok(committed) => {
                self.mark_committed(committed);
                Ok(PersistOutcome::Appended { committed })
            }
            Err(e) => {
                self.discard_pending();
                Err(e.into())
            }
        }
    }

    /// 刷新语料缓冲，返回落盘的记录数
    pub async fn flush(&mut self) -> Result<usize, PipelineError> {
        match self.corpus.flush().await {
            Ok(committed) => {
                self.mark_committed(committed);
                Ok(committed)
            }
            Err(e) => {
                self.discard_pending();
                Err(e.into())
            }
        }
    }

    fn mark_committed(&mut self, committed: usize) {
        let committed = committed.min(self.pending.len());
        self.pending.drain(..committed);
    }

    fn discard_pending(&mut self) {
        for fingerprint in self.pending.drain(..) {
            self.index.remove(&fingerprint);
        }
    }

    /// 记录阶段
    pub async fn log(&mut self, entry: &ManifestEntry) -> Result<(), PipelineError> {
        self.manifest.append(entry).await?;
        Ok(())
    }

    /// 处理一个数据源并写入清单条目
    ///
    /// 数据源不可用或分片格式错误不会返回错误，只体现在条目的 `outcome` 中；
    /// 只有本地存储错误会返回 `Err`，此时仍尽量写入一条 `aborted` 条目。
    pub async fn run_source(&mut self, source_id: &str) -> Result<ManifestEntry, PipelineError> {
        let settings = Arc::clone(&self.settings);
        let router = Arc::clone(&self.router);
        let source = find_source(&settings, source_id)?;

        let profile = self.profile(source);
        let progress_interval = settings.output.progress_interval.max(1);
        let mut cursor = SourceCursor::new(source, &settings.fetch, &router)?;
        let mut tally = SourceTally::default();
        let mut source_error: Option<String> = None;
        let mut interrupted = false;
        let started = Instant::now();

        info!(
            source = %source.id,
            category = %source.category,
            kind = ?source.kind,
            "Processing source"
        );

        'shards: loop {
            if self.shutdown.is_triggered() {
                interrupted = true;
                break;
            }

            let shard = match cursor.next_shard().await {
                None => break,
                Some(Ok(shard)) => shard,
                Some(Err(PipelineError::FormatError { shard, reason, .. })) => {
                    warn!(source = %source.id, shard = %shard, reason = %reason, "Skipping malformed shard");
                    tally.shard_failures.push(ShardFailure { shard, reason });
                    continue;
                }
                Some(Err(PipelineError::SourceUnavailable { reason, .. })) => {
                    warn!(source = %source.id, reason = %reason, "Source unavailable, skipping");
                    source_error = Some(reason);
                    break;
                }
                Some(Err(e)) => return Err(e),
            };

            tally.shards_fetched += 1;
            tally.bytes_fetched += shard.bytes;

            for raw in &shard.records {
                if self.shutdown.is_triggered() {
                    interrupted = true;
                    break 'shards;
                }

                tally.records_fetched += 1;
                match self.clean(raw, &profile) {
                    CleanOutcome::Accepted(record) => match self.persist(record).await {
                        Ok(PersistOutcome::Appended { committed }) => {
                            tally.records_written += committed as u64;
                        }
                        Ok(PersistOutcome::Duplicate) => tally.reject(RejectReason::Duplicate),
                        Err(e) => return Err(self.abort(source, tally, started, e).await),
                    },
                    CleanOutcome::Rejected(reason) => tally.reject(reason),
                }

                if tally.records_fetched % progress_interval == 0 {
                    let elapsed = started.elapsed();
                    info!(
                        source = %source.id,
                        processed = tally.records_fetched,
                        written = tally.records_written,
                        downloaded = %format_size(tally.bytes_fetched),
                        rate = %format!("{:.1}/s", rate_per_second(tally.records_fetched, elapsed)),
                        elapsed = %format_duration(elapsed),
                        "Progress"
                    );
                }
            }

            match self.flush().await {
                Ok(committed) => tally.records_written += committed as u64,
                Err(e) => return Err(self.abort(source, tally, started, e).await),
            }
        }

        match self.flush().await {
            Ok(committed) => tally.records_written += committed as u64,
            Err(e) => return Err(self.abort(source, tally, started, e).await),
        }

        let outcome = if interrupted {
            FetchOutcome::Interrupted
        } else if source_error.is_some() {
            FetchOutcome::Unavailable
        } else if !tally.shard_failures.is_empty() {
            FetchOutcome::Partial
        } else {
            FetchOutcome::Completed
        };

        let entry = self.entry(source, tally, outcome, source_error, started);
        self.log(&entry).await?;

        info!(
            source = %entry.source_id,
            outcome = %entry.outcome,
            fetched = entry.records_fetched,
            written = entry.records_written,
            rejected = entry.rejected_total(),
            failed_shards = entry.shard_failures.len(),
            elapsed = %format_duration(started.elapsed()),
            "Source finished"
        );
        Ok(entry)
    }

    /// 刷新并关闭语料与清单
    pub async fn close(mut self) -> Result<(), PipelineError> {
        self.corpus.close().await?;
        self.manifest.close().await?;
        Ok(())
    }

    fn entry(
        &self,
        source: &SourceSettings,
        tally: SourceTally,
        outcome: FetchOutcome,
        error: Option<String>,
        started: Instant,
    ) -> ManifestEntry {
        ManifestEntry {
            run_id: self.run_id,
            timestamp: Utc::now(),
            source_id: source.id.clone(),
            category: source.category.clone(),
            outcome,
            shards_fetched: tally.shards_fetched,
            records_fetched: tally.records_fetched,
            records_written: tally.records_written,
            rejected: tally.rejected,
            shard_failures: tally.shard_failures,
            bytes_fetched: tally.bytes_fetched,
            duration_ms: started.elapsed().as_millis() as u64,
            error,
        }
    }

    // best effort: the manifest may live on the same failing disk.
    // `tally.records_written` only counts records that reached the corpus file.
    async fn abort(
        &mut self,
        source: &SourceSettings,
        tally: SourceTally,
        started: Instant,
        cause: PipelineError,
    ) -> PipelineError {
        error!(source = %source.id, error = %cause, "Storage failure, aborting run");
        let entry = self.entry(
            source,
            tally,
            FetchOutcome::Aborted,
            Some(cause.to_string()),
            started,
        );
        if let Err(e) = self.manifest.append(&entry).await {
            warn!(source = %source.id, error = %e, "Failed to record aborted source");
        }
        cause
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
