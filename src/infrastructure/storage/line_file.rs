// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::settings::OutputFormat;

/// 行文件扫描结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineScan {
    /// 完整行数
    pub lines: u64,
    /// 完整行占用的字节数
    pub complete_bytes: u64,
    /// 末尾不完整行的字节数
    pub tail_bytes: u64,
}

impl LineScan {
    pub fn has_incomplete_tail(&self) -> bool {
        self.tail_bytes > 0
    }
}

/// 逐行扫描文件，对每个完整行（不含换行符）调用 `on_line`
///
/// `repair` 为 true 时把文件截断到最后一个完整行之后
pub fn scan_lines<F>(path: &Path, repair: bool, mut on_line: F) -> io::Result<LineScan>
where
    F: FnMut(&[u8]),
{
    let file = if repair {
        OpenOptions::new().read(true).write(true).open(path)?
    } else {
        File::open(path)?
    };
    let total = file.metadata()?.len();

    let mut scan = LineScan::default();
    {
        let mut reader = BufReader::new(&file);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 || buf.last() != Some(&b'\n') {
                break;
            }
            scan.lines += 1;
            scan.complete_bytes += n as u64;
            on_line(trim_line_end(&buf));
        }
    }
    scan.tail_bytes = total.saturating_sub(scan.complete_bytes);

    if repair && scan.has_incomplete_tail() {
        file.set_len(scan.complete_bytes)?;
        file.sync_all()?;
    }
    Ok(scan)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// 输出目录下的一个语料文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub category: String,
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// 列出 `<root>/<category>/<file>` 结构下的全部语料文件，按路径排序
pub fn list_corpus_files(root: &Path) -> Vec<CorpusFile> {
    let mut files: Vec<CorpusFile> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.path().to_path_buf();
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(OutputFormat::from_extension)?;
            let category = path
                .parent()
                .and_then(|parent| parent.file_name())
                .and_then(|name| name.to_str())?
                .to_string();
            Some(CorpusFile {
                category,
                path,
                format,
            })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// 从语料行中取出文本
///
/// JSON Lines 取 `text` 字段；纯文本取整行。无效行返回 `None`
pub fn line_text(line: &[u8], format: OutputFormat) -> Option<String> {
    let line = std::str::from_utf8(line).ok()?;
    match format {
        OutputFormat::Jsonl => {
            let value: serde_json::Value = serde_json::from_str(line).ok()?;
            value
                .get("text")
                .and_then(|text| text.as_str())
                .filter(|text| !text.trim().is_empty())
                .map(|text| text.to_string())
        }
        OutputFormat::Text => {
            if line.trim().is_empty() {
                None
            } else {
                Some(line.to_string())
            }
        }
    }
}
