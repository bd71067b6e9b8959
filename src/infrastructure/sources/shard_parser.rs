// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;

use crate::config::settings::TextDelimiter;
use crate::domain::models::RawRecord;

/// 解析 JSON Lines 分片
///
/// 空行被跳过；无法解析为 JSON 的行按纯文本记录保留，交由清洗阶段判断
pub fn parse_jsonl(source_id: &str, shard: &str, content: &str) -> Vec<RawRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(position, line)| {
            let payload = serde_json::from_str::<Value>(line)
                .unwrap_or_else(|_| Value::String(line.to_string()));
            RawRecord::new(source_id, shard, position as u64, payload)
        })
        .collect()
}

/// 解析纯文本分片
pub fn parse_text(
    source_id: &str,
    shard: &str,
    content: &str,
    delimiter: TextDelimiter,
) -> Vec<RawRecord> {
    let units: Vec<String> = match delimiter {
        TextDelimiter::Line => content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect(),
        TextDelimiter::Paragraph => paragraphs(content),
    };

    units
        .into_iter()
        .enumerate()
        .map(|(position, text)| {
            RawRecord::new(source_id, shard, position as u64, Value::String(text))
        })
        .collect()
}

fn paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}
