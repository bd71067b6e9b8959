// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::models::ManifestEntry;

/// 下载请求
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    /// 只处理该分类
    pub category: Option<String>,
    /// 只处理这些数据源
    pub source_ids: Vec<String>,
}

/// 分类汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub records_written: u64,
    /// 未成功的数据源
    pub failed: Vec<String>,
}

/// 一次运行的汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// 按处理顺序排列的清单条目
    pub entries: Vec<ManifestEntry>,
    pub duration: Duration,
    /// 运行是否因停止信号提前结束
    pub interrupted: bool,
}

impl RunSummary {
    pub fn records_fetched(&self) -> u64 {
        self.entries.iter().map(|e| e.records_fetched).sum()
    }

    pub fn records_written(&self) -> u64 {
        self.entries.iter().map(|e| e.records_written).sum()
    }

    pub fn bytes_fetched(&self) -> u64 {
        self.entries.iter().map(|e| e.bytes_fetched).sum()
    }

    /// 未成功完成的数据源
    pub fn failed_sources(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.outcome.is_success())
            .map(|e| e.source_id.as_str())
            .collect()
    }

    /// 按分类汇总（分类按字典序）
    pub fn by_category(&self) -> BTreeMap<String, CategorySummary> {
        let mut summary: BTreeMap<String, CategorySummary> = BTreeMap::new();
        for entry in &self.entries {
            let category = summary.entry(entry.category.clone()).or_default();
            category.attempted += 1;
            category.records_written += entry.records_written;
            if entry.outcome.is_success() {
                category.succeeded += 1;
            } else {
                category.failed.push(entry.source_id.clone());
            }
        }
        summary
    }
}
