// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::record::RejectReason;

/// 一次数据源抓取尝试的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 所有分片均成功处理
    Completed,
    /// 部分分片因格式错误被跳过
    Partial,
    /// 数据源不可达，已跳过
    Unavailable,
    /// 收到停止信号，处理被中断
    Interrupted,
    /// 本地存储故障导致运行中止
    Aborted,
}

impl FetchOutcome {
    /// 是否至少完整遍历了数据源
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Completed | FetchOutcome::Partial)
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchOutcome::Completed => write!(f, "completed"),
            FetchOutcome::Partial => write!(f, "partial"),
            FetchOutcome::Unavailable => write!(f, "unavailable"),
            FetchOutcome::Interrupted => write!(f, "interrupted"),
            FetchOutcome::Aborted => write!(f, "aborted"),
        }
    }
}

/// 被跳过的分片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardFailure {
    /// 分片标识
    pub shard: String,
    /// 失败原因
    pub reason: String,
}

/// 清单条目
///
/// 每次数据源抓取尝试对应一行，无论成功与否
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 运行标识
    pub run_id: Uuid,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
    /// 数据源标识
    pub source_id: String,
    /// 数据源分类
    pub category: String,
    /// 抓取结果
    pub outcome: FetchOutcome,
    /// 成功获取的分片数
    pub shards_fetched: u64,
    /// 获取的原始记录数
    pub records_fetched: u64,
    /// 写入语料的记录数
    pub records_written: u64,
    /// 按原因统计的丢弃记录数
    #[serde(default)]
    pub rejected: BTreeMap<RejectReason, u64>,
    /// 因格式错误跳过的分片
    #[serde(default)]
    pub shard_failures: Vec<ShardFailure>,
    /// 下载字节数
    pub bytes_fetched: u64,
    /// 耗时（毫秒）
    pub duration_ms: u64,
    /// 数据源级错误信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ManifestEntry {
    /// 丢弃记录总数
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}
