// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{Map, Value};

use crate::config::settings::{CleaningSettings, LanguageSettings, SourceSettings};
use crate::domain::models::{CleanOutcome, CleanedRecord, RawRecord, RejectReason};
use crate::domain::services::dedup_service::FingerprintIndex;
use crate::utils::text_processing::{
    normalize_text, stopword_hits, turkish_letter_ratio, NormalizeOptions,
};

/// 清洗时使用的数据源信息
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub source_id: String,
    pub category: String,
    pub text_fields: Vec<String>,
    pub keep_fields: Vec<String>,
    /// 是否对该数据源执行土耳其语检测
    pub verify_language: bool,
}

impl SourceProfile {
    /// 根据数据源配置创建
    ///
    /// 全局开关关闭时，数据源自身的设置不会重新启用语言检测
    pub fn from_settings(source: &SourceSettings, language_enabled: bool) -> Self {
        Self {
            source_id: source.id.clone(),
            category: source.category.clone(),
            text_fields: source.text_fields.clone(),
            keep_fields: source.keep_fields.clone(),
            verify_language: language_enabled && source.verify_language.unwrap_or(true),
        }
    }
}

/// 清洗服务
///
/// 按固定顺序对原始记录应用过滤器：
/// 文本提取 → 规范化 → 长度 → 语言 → 去重。
/// 每条被丢弃的记录只归因于第一个拒绝它的过滤器。
#[derive(Debug, Clone)]
pub struct CleaningService {
    options: NormalizeOptions,
    min_chars: usize,
    max_chars: Option<usize>,
    language: LanguageSettings,
}

impl CleaningService {
    pub fn new(settings: &CleaningSettings) -> Self {
        Self {
            options: NormalizeOptions {
                strip_markup: settings.strip_markup,
                strip_urls: settings.strip_urls,
            },
            min_chars: settings.min_chars,
            max_chars: settings.max_chars,
            language: settings.language.clone(),
        }
    }

    /// 清洗一条原始记录
    ///
    /// 不修改指纹索引；接受的记录在写入成功后才由调用方登记
    pub fn clean(
        &self,
        raw: &RawRecord,
        profile: &SourceProfile,
        index: &FingerprintIndex,
    ) -> CleanOutcome {
        let Some(extracted) = extract_text(&raw.payload, &profile.text_fields) else {
            return CleanOutcome::Rejected(RejectReason::NoText);
        };

        let text = normalize_text(&extracted.text, &self.options);
        if text.is_empty() {
            return CleanOutcome::Rejected(RejectReason::NoText);
        }

        let chars = text.chars().count();
        if chars < self.min_chars {
            return CleanOutcome::Rejected(RejectReason::TooShort);
        }
        if self.max_chars.is_some_and(|max| chars > max) {
            return CleanOutcome::Rejected(RejectReason::TooLong);
        }

        if profile.verify_language && !self.is_turkish(&text) {
            return CleanOutcome::Rejected(RejectReason::NotTurkish);
        }

        let fingerprint = index.fingerprint(&text);
        if index.contains(&fingerprint) {
            return CleanOutcome::Rejected(RejectReason::Duplicate);
        }

        let metadata = extracted
            .container
            .map(|object| keep_metadata(object, &profile.keep_fields))
            .unwrap_or_default();

        CleanOutcome::Accepted(CleanedRecord {
            text,
            fingerprint,
            source_id: profile.source_id.clone(),
            category: profile.category.clone(),
            metadata,
        })
    }

    /// 土耳其语启发式检测
    ///
    /// 过短的文本直接判定为否；否则土耳其语特有字母占比或停用词命中数任一达标即可
    pub fn is_turkish(&self, text: &str) -> bool {
        if text.chars().count() < self.language.min_chars {
            return false;
        }

        turkish_letter_ratio(text) >= self.language.min_turkish_char_ratio
            || stopword_hits(text) >= self.language.min_stopword_hits
    }
}

/// 提取到的文本及其所在对象
#[derive(Debug)]
pub struct ExtractedText<'a> {
    pub text: String,
    pub container: Option<&'a Map<String, Value>>,
}

/// 从负载中提取文本
///
/// - 字符串直接作为文本；以 `{` 开头且能解析为 JSON 对象的字符串按对象处理
/// - 对象取 `text_fields` 中第一个非空字符串字段
/// - 数组取第一个元素（必须是对象）
pub fn extract_text<'a>(payload: &'a Value, text_fields: &[String]) -> Option<ExtractedText<'a>> {
    match payload {
        Value::String(s) => {
            if s.trim_start().starts_with('{') {
                if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(s) {
                    return first_text_field(&object, text_fields).map(|text| ExtractedText {
                        text,
                        container: None,
                    });
                }
            }
            Some(ExtractedText {
                text: s.clone(),
                container: None,
            })
        }
        Value::Object(object) => first_text_field(object, text_fields).map(|text| ExtractedText {
            text,
            container: Some(object),
        }),
        Value::Array(items) => match items.first() {
            Some(first @ Value::Object(_)) => extract_text(first, text_fields),
            _ => None,
        },
        _ => None,
    }
}

fn first_text_field(object: &Map<String, Value>, text_fields: &[String]) -> Option<String> {
    text_fields
        .iter()
        .filter_map(|field| object.get(field).and_then(Value::as_str))
        .find(|value| !value.trim().is_empty())
        .map(|value| value.to_string())
}

// "text" and "source" are always written by the store
fn keep_metadata(object: &Map<String, Value>, keep_fields: &[String]) -> Map<String, Value> {
    keep_fields
        .iter()
        .filter(|field| field.as_str() != "text" && field.as_str() != "source")
        .filter_map(|field| match object.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some((field.clone(), value.clone())),
        })
        .collect()
}

#[cfg(test)]
#[path = "cleaning_service_test.rs"]
mod tests;
