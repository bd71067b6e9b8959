// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 读取本地分片失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 没有引擎支持该地址
    #[error("No engine supports '{0}'")]
    NoEngine(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 分片请求
#[derive(Debug, Clone)]
pub struct ShardRequest {
    /// 分片地址（http(s)、file:// 或本地路径）
    pub url: String,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
}

impl ShardRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout,
        }
    }
}

/// 分片响应
#[derive(Debug, Clone)]
pub struct ShardResponse {
    /// HTTP状态码（本地文件固定为200）
    pub status_code: u16,
    /// 响应内容（未解码的原始字节）
    pub body: Bytes,
    /// 内容类型
    pub content_type: Option<String>,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

impl ShardResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 抓取引擎特质
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 获取分片
    ///
    /// 非 2xx 状态码不视为错误，由调用方根据 `status_code` 判断
    async fn fetch(&self, request: &ShardRequest) -> Result<ShardResponse, EngineError>;

    /// 计算对请求的支持分数（0-100），0 表示不支持
    fn support_score(&self, request: &ShardRequest) -> u8;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
