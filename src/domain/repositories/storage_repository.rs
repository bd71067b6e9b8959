// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::CleanedRecord;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 输出语料仓库特质
///
/// 只追加；写入失败时实现必须把文件截断回最后一次成功刷新的位置
#[async_trait]
pub trait CorpusRepository: Send {
    /// 追加一条清洗后记录
    ///
    /// 记录可能只进入写缓冲；返回本次调用实际落盘的记录数（触发刷新时包含之前缓冲的记录）
    async fn append(&mut self, record: &CleanedRecord) -> Result<usize, StorageError>;

    /// 将缓冲的记录写入磁盘，返回落盘的记录数
    ///
    /// 失败时缓冲的记录被丢弃，文件保持在上一次成功刷新后的长度
    async fn flush(&mut self) -> Result<usize, StorageError>;

    /// 刷新并关闭全部文件
    async fn close(&mut self) -> Result<(), StorageError>;
}
