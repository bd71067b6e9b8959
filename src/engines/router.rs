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

use crate::config::settings::FetchSettings;
use crate::engines::file_engine::FileEngine;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{EngineError, FetchEngine, ShardRequest, ShardResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 引擎路由器
///
/// 负责根据分片地址选择合适的抓取引擎
pub struct EngineRouter {
    /// 引擎列表
    engines: Vec<Arc<dyn FetchEngine>>,
}

impl EngineRouter {
    /// 创建新的引擎路由器
    ///
    /// # 参数
    ///
    /// * `engines` - 引擎列表
    pub fn new(engines: Vec<Arc<dyn FetchEngine>>) -> Self {
        Self { engines }
    }

    /// 根据抓取配置创建默认引擎组合（HTTP + 本地文件）
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, EngineError> {
        let http = ReqwestEngine::new(
            &settings.user_agent,
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::new(vec![Arc::new(http), Arc::new(FileEngine)]))
    }

    /// 选择支持分数最高的引擎
    fn select(&self, request: &ShardRequest) -> Option<&Arc<dyn FetchEngine>> {
        self.engines
            .iter()
            .map(|engine| (engine.support_score(request), engine))
            .filter(|(score, _)| *score > 0)
            .max_by_key(|(score, _)| *score)
            .map(|(_, engine)| engine)
    }

    /// 路由请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ShardResponse)` - 选中引擎的响应
    /// * `Err(EngineError::NoEngine)` - 没有引擎支持该地址
    pub async fn route(&self, request: &ShardRequest) -> Result<ShardResponse, EngineError> {
        let engine = self
            .select(request)
            .ok_or_else(|| EngineError::NoEngine(request.url.clone()))?;

        debug!(engine = engine.name(), url = %request.url, "Fetching shard");
        let response = engine.fetch(request).await?;
        debug!(
            engine = engine.name(),
            status = response.status_code,
            bytes = response.body.len(),
            elapsed_ms = response.response_time_ms,
            "Shard response received"
        );
        Ok(response)
    }
}
