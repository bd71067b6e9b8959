// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use flate2::read::GzDecoder;
use std::io::Read;
use thiserror::Error;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 文本编码处理错误类型
#[derive(Error, Debug, Clone)]
pub enum TextEncodingError {
    #[error("无效的UTF-8数据: {0}")]
    InvalidUtf8(String),

    #[error("无效的编码格式: {0}")]
    InvalidEncoding(String),

    #[error("编码转换失败: {0}")]
    ConversionFailed(String),

    #[error("解压失败: {0}")]
    DecompressionFailed(String),
}

/// 分片字节流的编码声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingHint {
    /// 严格 UTF-8，任何非法字节都视为格式错误
    Utf8,
    /// UTF-8 优先，否则使用 chardetng 检测
    Auto,
    /// 显式指定的 WHATWG 编码
    Label(&'static Encoding),
}

impl EncodingHint {
    /// 从配置字符串解析编码声明
    pub fn parse(value: &str) -> Result<Self, TextEncodingError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" | "utf-8" | "utf8" => Ok(EncodingHint::Utf8),
            "auto" => Ok(EncodingHint::Auto),
            label => Encoding::for_label(label.as_bytes())
                .map(EncodingHint::Label)
                .ok_or_else(|| TextEncodingError::InvalidEncoding(value.to_string())),
        }
    }
}

/// 文本编码处理器
///
/// 将分片的原始字节转换为 UTF-8 文本。检测时使用 `tr` 顶级域名提示，
/// 使 windows-1254 / ISO-8859-9 等土耳其语旧编码优先于其他单字节编码。
pub struct TextEncodingProcessor {
    hint: EncodingHint,
}

impl TextEncodingProcessor {
    /// 创建新的文本编码处理器
    pub fn new(hint: EncodingHint) -> Self {
        Self { hint }
    }

    /// 处理文本编码，确保输出为UTF-8格式
    pub fn process_text(&self, input: &[u8]) -> Result<String, TextEncodingError> {
        match self.hint {
            EncodingHint::Utf8 => Self::decode_strict_utf8(input),
            EncodingHint::Auto => {
                if let Ok(text) = Self::decode_strict_utf8(input) {
                    return Ok(text);
                }
                self.detect_and_convert_encoding(input)
            }
            EncodingHint::Label(encoding) => self.convert_encoding(input, encoding),
        }
    }

    fn decode_strict_utf8(input: &[u8]) -> Result<String, TextEncodingError> {
        let body = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        std::str::from_utf8(body)
            .map(|s| s.to_string())
            .map_err(|e| TextEncodingError::InvalidUtf8(e.to_string()))
    }

    /// 检测并转换编码
    fn detect_and_convert_encoding(&self, input: &[u8]) -> Result<String, TextEncodingError> {
        let mut detector = EncodingDetector::new();
        detector.feed(input, true);

        let encoding = detector.guess(Some(b"tr"), true);
        debug!("检测到编码: {}", encoding.name());

        self.convert_encoding(input, encoding)
    }

    /// 转换编码到UTF-8
    fn convert_encoding(
        &self,
        input: &[u8],
        encoding: &'static Encoding,
    ) -> Result<String, TextEncodingError> {
        let (decoded, used, had_errors) = encoding.decode(input);

        if had_errors {
            warn!("编码转换出现非法字节，编码: {}", used.name());
            return Err(TextEncodingError::ConversionFailed(format!(
                "编码转换错误，编码: {}",
                used.name()
            )));
        }

        Ok(decoded.into_owned())
    }
}

/// 解压 gzip 分片
pub fn decompress_gzip(input: &[u8]) -> Result<Vec<u8>, TextEncodingError> {
    let mut decoder = GzDecoder::new(input);
    let mut output = Vec::with_capacity(input.len() * 4);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| TextEncodingError::DecompressionFailed(e.to_string()))?;
    Ok(output)
}
