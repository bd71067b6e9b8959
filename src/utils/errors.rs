// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::StorageError;

/// 流水线错误类型
///
/// `SourceUnavailable` 与 `FormatError` 在流水线内部恢复，只体现在清单和日志中；
/// `Storage` 属于本地不可恢复错误，会中止整个运行。
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("未知数据源: {0}")]
    UnknownSource(String),

    #[error("数据源 '{source_id}' 不可用: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("数据源 '{source_id}' 的分片 '{shard}' 格式错误: {reason}")]
    FormatError {
        source_id: String,
        shard: String,
        reason: String,
    },

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("配置错误: {0}")]
    Configuration(String),
}
