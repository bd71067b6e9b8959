// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::domain::models::ManifestEntry;
use crate::domain::repositories::{ManifestRepository, StorageError};
use crate::infrastructure::storage::line_file::scan_lines;

/// JSON Lines 下载清单
///
/// 每个条目写入后立即刷新并同步到磁盘
pub struct FileManifestLog {
    file: File,
}

impl FileManifestLog {
    /// 打开清单文件，截断上次运行中断时留下的不完整尾行
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        if path.exists() {
            let scan = scan_lines(path, true, |_| {})?;
            if scan.has_incomplete_tail() {
                warn!(
                    path = %path.display(),
                    bytes = scan.tail_bytes,
                    "Truncated incomplete manifest entry"
                );
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self { file })
    }

    /// 读取清单中的全部条目，跳过无法解析的行
    pub fn read_entries(path: &Path) -> Result<Vec<ManifestEntry>, StorageError> {
        let mut entries = Vec::new();
        if !path.exists() {
            return Ok(entries);
        }

        scan_lines(path, false, |line| {
            match serde_json::from_slice::<ManifestEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable manifest line"),
            }
        })?;
        Ok(entries)
    }
}

#[async_trait]
impl ManifestRepository for FileManifestLog {
    async fn append(&mut self, entry: &ManifestEntry) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.file.write_all(&line).await?;
        self.file.flush().await?;
        self.file.sync_data().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(())
    }
}
