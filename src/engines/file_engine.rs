// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchEngine, ShardRequest, ShardResponse};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

/// 本地文件引擎
///
/// 处理 `file://` 地址和不带协议的本地路径
pub struct FileEngine;

impl FileEngine {
    fn resolve(url: &str) -> Result<PathBuf, EngineError> {
        if url.starts_with("file://") {
            let parsed = Url::parse(url)
                .map_err(|e| EngineError::Other(format!("Invalid file URL {}: {}", url, e)))?;
            parsed
                .to_file_path()
                .map_err(|_| EngineError::Other(format!("Not a local file URL: {}", url)))
        } else {
            Ok(PathBuf::from(url))
        }
    }
}

#[async_trait]
impl FetchEngine for FileEngine {
    async fn fetch(&self, request: &ShardRequest) -> Result<ShardResponse, EngineError> {
        let path = Self::resolve(&request.url)?;
        let start = Instant::now();
        let body = tokio::fs::read(&path).await?;

        Ok(ShardResponse {
            status_code: 200,
            body: Bytes::from(body),
            content_type: None,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn support_score(&self, request: &ShardRequest) -> u8 {
        if request.url.starts_with("file://") {
            100
        } else if !request.url.contains("://") {
            50
        } else {
            0
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
