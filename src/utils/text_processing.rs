// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本规范化模块
//!
//! 提供清洗阶段使用的纯函数：
//! - HTML 标记、脚本、样式与注释剥离
//! - URL 移除与空白规范化
//! - 土耳其语字母统计、停用词命中与大小写转换

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SCRIPT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script regex"));
static STYLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("style regex"));
static COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex"));
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("url regex"));
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// 土耳其语特有字母
pub const TURKISH_LETTERS: &str = "çÇğĞıİöÖşŞüÜ";

/// 常见土耳其语停用词
pub const TURKISH_STOPWORDS: &[&str] = &[
    "ve", "veya", "ile", "için", "bu", "şu", "çünkü", "ancak", "fakat", "gibi", "kadar", "daha",
    "en", "çok", "az", "ama", "lakin", "değil", "bir", "da", "de", "ki", "mi", "olarak",
];

/// 规范化选项
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// 是否剥离HTML标记
    pub strip_markup: bool,
    /// 是否移除URL
    pub strip_urls: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_markup: true,
            strip_urls: true,
        }
    }
}

/// 规范化文本：剥离标记与URL，移除控制字符，并将所有空白折叠为单个空格
///
/// 输出不包含换行符，因此每条记录可以安全地占用语料文件中的一行。
pub fn normalize_text(input: &str, options: &NormalizeOptions) -> String {
    let mut text = input.to_string();

    if options.strip_markup {
        text = SCRIPT_REGEX.replace_all(&text, " ").into_owned();
        text = STYLE_REGEX.replace_all(&text, " ").into_owned();
        text = COMMENT_REGEX.replace_all(&text, " ").into_owned();
        text = TAG_REGEX.replace_all(&text, " ").into_owned();
        text = html_escape::decode_html_entities(&text).into_owned();
    }

    if options.strip_urls {
        text = URL_REGEX.replace_all(&text, " ").into_owned();
    }

    let text: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_string()
}

/// 土耳其语特有字母在全部字母中的占比
pub fn turkish_letter_ratio(text: &str) -> f64 {
    let mut alphabetic = 0usize;
    let mut turkish = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        alphabetic += 1;
        if TURKISH_LETTERS.contains(c) {
            turkish += 1;
        }
    }

    if alphabetic == 0 {
        return 0.0;
    }
    turkish as f64 / alphabetic as f64
}

/// 文本中出现的不同停用词数量
pub fn stopword_hits(text: &str) -> usize {
    let lowered = turkish_lowercase(text);
    let words: HashSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    TURKISH_STOPWORDS
        .iter()
        .filter(|stopword| words.contains(*stopword))
        .count()
}

/// 土耳其语感知的小写转换（I → ı，İ → i）
pub fn turkish_lowercase(text: &str) -> String {
    let mut lowered = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' => lowered.push('ı'),
            'İ' => lowered.push('i'),
            other => lowered.extend(other.to_lowercase()),
        }
    }
    lowered
}

/// 将数据源标识或分类转换为单个安全的路径段
///
/// 路径分隔符被替换；空名称以及只由 `.` 组成的名称整体替换为下划线
pub fn safe_file_stem(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.chars().all(|c| c == '.') {
        return "_".repeat(trimmed.len().max(1));
    }
    trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | ' ' => '_',
            other => other,
        })
        .collect()
}
