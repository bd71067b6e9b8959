// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::config::settings::{FetchSettings, SourceKind, SourceSettings};
use crate::domain::models::{FetchedSource, RawRecord, Shard, ShardFailure};
use crate::engines::router::EngineRouter;
use crate::engines::traits::{ShardRequest, ShardResponse};
use crate::infrastructure::sources::huggingface::{parse_rows_page, rows_url};
use crate::infrastructure::sources::shard_parser::{parse_jsonl, parse_text};
use crate::utils::errors::PipelineError;
use crate::utils::text_encoding::{decompress_gzip, EncodingHint, TextEncodingProcessor};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 数据源游标
///
/// 按顺序逐个获取数据源的分片，任意时刻只持有一个分片。
/// - `hf_rows`：按 `page_size` 分页请求 rows 接口，每页为一个分片
/// - `jsonl` / `text`：依次获取配置中的分片地址，gzip 内容自动解压
///
/// 连接失败或非 2xx 响应使整个数据源不可用；单个分片的解码或解析失败只跳过该分片。
pub struct SourceCursor<'a> {
    source: &'a SourceSettings,
    router: &'a EngineRouter,
    decoder: TextEncodingProcessor,
    endpoint: String,
    page_size: u64,
    timeout: Duration,
    limit: Option<u64>,
    offset: u64,
    total: Option<u64>,
    next_file: usize,
    delivered: u64,
    finished: bool,
}

impl<'a> SourceCursor<'a> {
    pub fn new(
        source: &'a SourceSettings,
        fetch: &FetchSettings,
        router: &'a EngineRouter,
    ) -> Result<Self, PipelineError> {
        let hint = EncodingHint::parse(&source.encoding).map_err(|e| {
            PipelineError::Configuration(format!("source '{}': {}", source.id, e))
        })?;

        Ok(Self {
            source,
            router,
            decoder: TextEncodingProcessor::new(hint),
            endpoint: fetch.hf_rows_endpoint.clone(),
            page_size: fetch.page_size as u64,
            timeout: Duration::from_secs(fetch.timeout_secs),
            limit: fetch.limit,
            offset: 0,
            total: None,
            next_file: 0,
            delivered: 0,
            finished: false,
        })
    }

    /// 已交付的记录数
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn remaining(&self) -> Option<u64> {
        self.limit.map(|limit| limit.saturating_sub(self.delivered))
    }

    /// 获取下一个分片
    ///
    /// # 返回值
    ///
    /// * `None` - 数据源已耗尽（或达到记录上限）
    /// * `Some(Ok(Shard))` - 成功获取的分片
    /// * `Some(Err(FormatError))` - 该分片被跳过，可以继续调用
    /// * `Some(Err(SourceUnavailable))` - 数据源不可用，之后总是返回 `None`
    pub async fn next_shard(&mut self) -> Option<Result<Shard, PipelineError>> {
        if self.finished || self.remaining() == Some(0) {
            return None;
        }

        match self.source.kind {
            SourceKind::HfRows => self.next_rows_page().await,
            SourceKind::Jsonl | SourceKind::Text => self.next_file_shard().await,
        }
    }

    /// 获取全部分片并收集记录
    ///
    /// 格式错误的分片记入 `shard_failures`；数据源不可用时返回错误
    pub async fn collect(mut self) -> Result<FetchedSource, PipelineError> {
        let mut fetched = FetchedSource::default();
        while let Some(next) = self.next_shard().await {
            match next {
                Ok(shard) => {
                    fetched.shards_fetched += 1;
                    fetched.bytes_fetched += shard.bytes;
                    fetched.records.extend(shard.records);
                }
                Err(PipelineError::FormatError { shard, reason, .. }) => {
                    fetched.shard_failures.push(ShardFailure { shard, reason });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(fetched)
    }

    async fn next_rows_page(&mut self) -> Option<Result<Shard, PipelineError>> {
        if self.total.is_some_and(|total| self.offset >= total) {
            return None;
        }

        let length = match self.remaining() {
            Some(remaining) => self.page_size.min(remaining),
            None => self.page_size,
        };
        let shard_id = format!("rows@{}", self.offset);

        let url = match rows_url(&self.endpoint, self.source, self.offset, length) {
            Ok(url) => url,
            Err(e) => return Some(Err(self.unavailable(format!("invalid rows endpoint: {}", e)))),
        };
        let response = match self.download(&url).await {
            Ok(response) => response,
            Err(reason) => return Some(Err(self.unavailable(reason))),
        };

        let page = match parse_rows_page(&response.body) {
            Ok(page) => page,
            Err(e) => {
                // without a known total there is no safe next offset
                self.offset += length;
                if self.total.is_none() {
                    self.finished = true;
                }
                return Some(Err(self.format_error(&shard_id, e.to_string())));
            }
        };

        if page.rows.is_empty() {
            self.finished = true;
            return None;
        }
        if page.num_rows_total.is_some() {
            self.total = page.num_rows_total;
        }

        let start = self.offset;
        let records: Vec<RawRecord> = page
            .rows
            .into_iter()
            .take(length as usize)
            .enumerate()
            .map(|(i, entry)| {
                RawRecord::new(
                    &self.source.id,
                    &shard_id,
                    entry.row_idx.unwrap_or(start + i as u64),
                    entry.row,
                )
            })
            .collect();
        self.offset += records.len() as u64;

        Some(Ok(self.deliver(shard_id, records, response.body.len() as u64)))
    }

    async fn next_file_shard(&mut self) -> Option<Result<Shard, PipelineError>> {
        let url = self.source.shards.get(self.next_file)?.clone();
        self.next_file += 1;

        let response = match self.download(&url).await {
            Ok(response) => response,
            Err(reason) => return Some(Err(self.unavailable(reason))),
        };

        let content = match self.decode(&response.body) {
            Ok(content) => content,
            Err(reason) => return Some(Err(self.format_error(&url, reason))),
        };

        let mut records = match self.source.kind {
            SourceKind::Text => parse_text(&self.source.id, &url, &content, self.source.delimiter),
            _ => parse_jsonl(&self.source.id, &url, &content),
        };
        if let Some(remaining) = self.remaining() {
            records.truncate(remaining as usize);
        }

        Some(Ok(self.deliver(url, records, response.body.len() as u64)))
    }

    async fn download(&self, url: &str) -> Result<ShardResponse, String> {
        let request = ShardRequest::new(url, self.timeout);
        let response = self.router.route(&request).await.map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("HTTP {} for {}", response.status_code, url));
        }
        Ok(response)
    }

    fn decode(&self, body: &[u8]) -> Result<String, String> {
        if body.starts_with(&GZIP_MAGIC) {
            let inflated = decompress_gzip(body).map_err(|e| e.to_string())?;
            self.decoder.process_text(&inflated).map_err(|e| e.to_string())
        } else {
            self.decoder.process_text(body).map_err(|e| e.to_string())
        }
    }

    fn deliver(&mut self, id: String, records: Vec<RawRecord>, bytes: u64) -> Shard {
        self.delivered += records.len() as u64;
        Shard { id, records, bytes }
    }

    fn unavailable(&mut self, reason: String) -> PipelineError {
        self.finished = true;
        PipelineError::SourceUnavailable {
            source_id: self.source.id.clone(),
            reason,
        }
    }

    fn format_error(&self, shard: &str, reason: String) -> PipelineError {
        PipelineError::FormatError {
            source_id: self.source.id.clone(),
            shard: shard.to_string(),
            reason,
        }
    }
}
