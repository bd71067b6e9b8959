// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use super::storage_repository::StorageError;
use crate::domain::models::ManifestEntry;

/// 下载清单仓库特质
#[async_trait]
pub trait ManifestRepository: Send {
    /// 追加一条清单条目并立即落盘
    async fn append(&mut self, entry: &ManifestEntry) -> Result<(), StorageError>;

    /// 关闭清单
    async fn close(&mut self) -> Result<(), StorageError>;
}
