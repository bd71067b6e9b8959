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

use std::time::Instant;
use tracing::{info, warn};

use crate::application::dto::run_summary::{DownloadRequest, RunSummary};
use crate::application::pipeline::CorpusPipeline;
use crate::config::settings::Settings;
use crate::utils::errors::PipelineError;

/// 下载用例
///
/// 选择数据源并按顺序交给流水线处理
pub struct DownloadUseCase {
    pipeline: CorpusPipeline,
}

impl DownloadUseCase {
    pub fn new(pipeline: CorpusPipeline) -> Self {
        Self { pipeline }
    }

    /// 根据请求选择数据源
    ///
    /// 所有指定的数据源都必须存在，否则在运行开始前返回 `UnknownSource`
    pub fn select_sources(
        settings: &Settings,
        request: &DownloadRequest,
    ) -> Result<Vec<String>, PipelineError> {
        if let Some(category) = &request.category {
            if !settings.categories().contains(&category.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "unknown category '{}'",
                    category
                )));
            }
        }

        if !request.source_ids.is_empty() {
            let mut selected: Vec<String> = Vec::new();
            for id in &request.source_ids {
                let source = settings
                    .find_source(id)
                    .ok_or_else(|| PipelineError::UnknownSource(id.clone()))?;
                if let Some(category) = &request.category {
                    if &source.category != category {
                        return Err(PipelineError::Configuration(format!(
                            "source '{}' is not in category '{}'",
                            id, category
                        )));
                    }
                }
                if !selected.contains(id) {
                    selected.push(id.clone());
                }
            }
            return Ok(selected);
        }

        Ok(settings
            .sources
            .iter()
            .filter(|s| request.category.as_ref().map_or(true, |c| &s.category == c))
            .map(|s| s.id.clone())
            .collect())
    }

    /// 执行下载
    ///
    /// 收到停止信号后不再开始新的数据源。本地存储错误中止整个运行。
    pub async fn execute(mut self, request: DownloadRequest) -> Result<RunSummary, PipelineError> {
        let source_ids = Self::select_sources(self.pipeline.settings(), &request)?;
        let started = Instant::now();

        info!(
            run_id = %self.pipeline.run_id(),
            sources = source_ids.len(),
            fingerprints = self.pipeline.fingerprints(),
            "Starting download run"
        );

        let mut entries = Vec::with_capacity(source_ids.len());
        for (i, source_id) in source_ids.iter().enumerate() {
            if self.pipeline.is_shutdown_requested() {
                warn!(skipped = source_ids.len() - i, "Stopping before remaining sources");
                break;
            }
            let entry = self.pipeline.run_source(source_id).await?;
            entries.push(entry);
        }

        let run_id = self.pipeline.run_id();
        let interrupted = self.pipeline.is_shutdown_requested();
        self.pipeline.close().await?;

        Ok(RunSummary {
            run_id,
            entries,
            duration: started.elapsed(),
            interrupted,
        })
    }
}
