// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::settings::OutputFormat;
use crate::domain::repositories::StorageError;
use crate::infrastructure::storage::line_file::{line_text, list_corpus_files, scan_lines, CorpusFile};

/// 单个语料文件的检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub category: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    /// 有效记录数
    pub records: u64,
    /// 无效行数（无法解析或没有文本）
    pub invalid_lines: u64,
    /// 文件大小
    pub bytes: u64,
    /// 末尾是否存在不完整的行
    pub incomplete_tail: bool,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.invalid_lines == 0 && !self.incomplete_tail
    }
}

/// 分类汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub files: usize,
    pub records: u64,
    pub bytes: u64,
}

/// 只读检查一个语料文件
pub fn inspect_file(file: &CorpusFile) -> Result<FileReport, StorageError> {
    let mut records = 0u64;
    let mut invalid_lines = 0u64;
    let scan = scan_lines(&file.path, false, |line| {
        if line_text(line, file.format).is_some() {
            records += 1;
        } else {
            invalid_lines += 1;
        }
    })?;

    Ok(FileReport {
        category: file.category.clone(),
        path: file.path.clone(),
        format: file.format,
        records,
        invalid_lines,
        bytes: scan.complete_bytes + scan.tail_bytes,
        incomplete_tail: scan.has_incomplete_tail(),
    })
}

/// 检查输出目录下的语料文件，可按分类过滤
pub fn inspect_corpus(root: &Path, category: Option<&str>) -> Result<Vec<FileReport>, StorageError> {
    list_corpus_files(root)
        .iter()
        .filter(|file| category.map_or(true, |c| file.category == c))
        .map(inspect_file)
        .collect()
}

/// 按分类汇总语料
pub fn category_stats(reports: &[FileReport]) -> BTreeMap<String, CategoryStats> {
    let mut stats: BTreeMap<String, CategoryStats> = BTreeMap::new();
    for report in reports {
        let entry = stats.entry(report.category.clone()).or_default();
        entry.files += 1;
        entry.records += report.records;
        entry.bytes += report.bytes;
    }
    stats
}

/// 读取文件中前 `limit` 条记录的文本
pub fn sample_texts(file: &FileReport, limit: usize) -> Result<Vec<String>, StorageError> {
    let mut samples = Vec::new();
    if limit == 0 {
        return Ok(samples);
    }
    scan_lines(&file.path, false, |line| {
        if samples.len() < limit {
            if let Some(text) = line_text(line, file.format) {
                samples.push(text);
            }
        }
    })?;
    Ok(samples)
}
