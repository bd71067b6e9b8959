// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// 原始记录
///
/// 数据源返回的一个文本单元（一行 JSON、一个 rows 接口行或一段纯文本），
/// 在清洗前仅短暂持有。
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 数据源标识
    pub source_id: String,
    /// 所属分片标识
    pub shard: String,
    /// 在分片（或整个数据集）中的位置
    pub position: u64,
    /// 原始负载
    pub payload: Value,
}

impl RawRecord {
    pub fn new(source_id: &str, shard: &str, position: u64, payload: Value) -> Self {
        Self {
            source_id: source_id.to_string(),
            shard: shard.to_string(),
            position,
            payload,
        }
    }
}

/// 内容指纹（规范化文本的 SHA-256）
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// 计算文本指纹
    pub fn of(text: &str) -> Self {
        Self(Sha256::digest(text.as_bytes()).into())
    }

    /// 十六进制表示
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

/// 清洗后记录
///
/// 通过全部过滤器的规范化文本，连同指纹与保留的元数据字段
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    /// 规范化文本（不含换行符）
    pub text: String,
    /// 内容指纹
    pub fingerprint: Fingerprint,
    /// 数据源标识
    pub source_id: String,
    /// 数据源分类
    pub category: String,
    /// 保留的元数据字段
    pub metadata: Map<String, Value>,
}

/// 记录被丢弃的原因
///
/// 这是清洗的正常结果，不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// 找不到可用的文本字段，或清洗后为空
    NoText,
    /// 短于最小长度
    TooShort,
    /// 长于最大长度
    TooLong,
    /// 未通过土耳其语检测
    NotTurkish,
    /// 与已有内容重复
    Duplicate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RejectReason::NoText => write!(f, "no_text"),
            RejectReason::TooShort => write!(f, "too_short"),
            RejectReason::TooLong => write!(f, "too_long"),
            RejectReason::NotTurkish => write!(f, "not_turkish"),
            RejectReason::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// 清洗结果
#[derive(Debug, Clone, PartialEq)]
pub enum CleanOutcome {
    /// 通过全部过滤器
    Accepted(CleanedRecord),
    /// 被某个过滤器丢弃
    Rejected(RejectReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = Fingerprint::of("Merhaba dünya");
        let b = Fingerprint::of("Merhaba dünya");
        let c = Fingerprint::of("Merhaba dünya!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn test_reject_reason_serializes_snake_case() {
        let json = serde_json::to_string(&RejectReason::NotTurkish).unwrap();
        assert_eq!(json, "\"not_turkish\"");
        assert_eq!(RejectReason::TooShort.to_string(), "too_short");
    }
}
