// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::utils::text_encoding::EncodingHint;

/// 应用程序配置设置
///
/// 包含输出、清单、日志、下载、清洗配置以及数据源目录
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// 输出语料配置
    #[validate(nested)]
    pub output: OutputSettings,
    /// 下载清单配置
    pub manifest: ManifestSettings,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 下载配置
    #[validate(nested)]
    pub fetch: FetchSettings,
    /// 清洗配置
    #[validate(nested)]
    pub cleaning: CleaningSettings,
    /// 数据源目录
    #[validate(nested)]
    pub sources: Vec<SourceSettings>,
}

/// 输出语料格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// 每行一个 JSON 对象
    #[default]
    Jsonl,
    /// 每行一段纯文本
    Text,
}

impl OutputFormat {
    /// 语料文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Text => "txt",
        }
    }

    /// 根据扩展名识别语料格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jsonl" => Some(OutputFormat::Jsonl),
            "txt" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// 输出语料配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct OutputSettings {
    /// 输出目录
    pub dir: PathBuf,
    /// 输出格式
    pub format: OutputFormat,
    /// 每写入多少条记录刷新一次缓冲
    #[validate(range(min = 1))]
    pub flush_every: usize,
    /// 每处理多少条记录输出一次进度
    #[validate(range(min = 1))]
    pub progress_interval: u64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./turkish_data"),
            format: OutputFormat::Jsonl,
            flush_every: 1000,
            progress_interval: 10_000,
        }
    }
}

/// 清单配置设置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// 清单文件路径，未设置时为 `<output.dir>/manifest.jsonl`
    pub path: Option<PathBuf>,
}

/// 日志配置设置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志过滤表达式，`RUST_LOG` 优先
    pub filter: Option<String>,
    /// 日志文件路径
    pub file: Option<PathBuf>,
}

/// 下载配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct FetchSettings {
    /// 单个分片请求超时时间（秒）
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// Hugging Face datasets-server rows 接口地址
    #[validate(url)]
    pub hf_rows_endpoint: String,
    /// rows 接口每页行数
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
    /// 每个数据源最多读取的记录数
    pub limit: Option<u64>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: format!("trcorpus/{}", env!("CARGO_PKG_VERSION")),
            hf_rows_endpoint: "https://datasets-server.huggingface.co/rows".to_string(),
            page_size: 100,
            limit: None,
        }
    }
}

/// 清洗配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CleaningSettings {
    /// 是否剥离HTML标记
    pub strip_markup: bool,
    /// 是否移除URL
    pub strip_urls: bool,
    /// 最小字符数
    pub min_chars: usize,
    /// 最大字符数
    pub max_chars: Option<usize>,
    /// 语言过滤
    #[validate(nested)]
    pub language: LanguageSettings,
    /// 去重
    pub dedup: DedupSettings,
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            strip_markup: true,
            strip_urls: true,
            min_chars: 5,
            max_chars: None,
            language: LanguageSettings::default(),
            dedup: DedupSettings::default(),
        }
    }
}

/// 土耳其语过滤配置
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct LanguageSettings {
    /// 是否启用
    pub enabled: bool,
    /// 参与语言判断的最小字符数，更短的文本直接拒绝
    pub min_chars: usize,
    /// 土耳其语特有字母在全部字母中的最低占比
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_turkish_char_ratio: f64,
    /// 最少命中的不同停用词数量
    pub min_stopword_hits: usize,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_chars: 20,
            min_turkish_char_ratio: 0.05,
            min_stopword_hits: 2,
        }
    }
}

/// 去重配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// 指纹计算前是否按土耳其语规则转为小写
    pub case_insensitive: bool,
}

/// 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Hugging Face datasets-server rows 接口
    HfRows,
    /// JSON Lines 分片
    Jsonl,
    /// 纯文本分片
    Text,
}

/// 纯文本分片的记录分隔方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDelimiter {
    /// 每行一条记录
    #[default]
    Line,
    /// 空行分隔的段落
    Paragraph,
}

/// 数据源配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceSettings {
    /// 数据源唯一标识
    #[validate(length(min = 1))]
    pub id: String,
    /// 分类（决定输出子目录）
    #[validate(length(min = 1))]
    pub category: String,
    /// 描述
    #[serde(default)]
    pub description: String,
    /// 数据源类型
    pub kind: SourceKind,
    /// Hugging Face 数据集名称
    #[serde(default)]
    pub dataset: Option<String>,
    /// Hugging Face 数据集配置
    #[serde(default)]
    pub config: Option<String>,
    /// 数据集划分
    #[serde(default = "default_split")]
    pub split: String,
    /// 分片地址（jsonl / text 类型）
    #[serde(default)]
    pub shards: Vec<String>,
    /// 纯文本分片的记录分隔方式
    #[serde(default)]
    pub delimiter: TextDelimiter,
    /// 按优先级排列的文本字段
    #[serde(default = "default_text_fields")]
    pub text_fields: Vec<String>,
    /// 随记录保留的元数据字段
    #[serde(default = "default_keep_fields")]
    pub keep_fields: Vec<String>,
    /// 分片编码：utf-8、auto 或 WHATWG 编码标签
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// 覆盖全局语言过滤开关
    #[serde(default)]
    pub verify_language: Option<bool>,
}

fn default_split() -> String {
    "train".to_string()
}

fn default_text_fields() -> Vec<String> {
    ["text", "content", "article", "summary", "title", "sentence"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_keep_fields() -> Vec<String> {
    ["id", "label", "title"].iter().map(|s| s.to_string()).collect()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl SourceSettings {
    fn with_kind(id: &str, category: &str, kind: SourceKind) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            description: String::new(),
            kind,
            dataset: None,
            config: None,
            split: default_split(),
            shards: Vec::new(),
            delimiter: TextDelimiter::default(),
            text_fields: default_text_fields(),
            keep_fields: default_keep_fields(),
            encoding: default_encoding(),
            verify_language: None,
        }
    }

    /// 创建 Hugging Face rows 数据源
    pub fn hf_rows(id: &str, category: &str, dataset: &str, config: Option<&str>) -> Self {
        let mut source = Self::with_kind(id, category, SourceKind::HfRows);
        source.dataset = Some(dataset.to_string());
        source.config = config.map(|c| c.to_string());
        source
    }

    /// 创建 JSON Lines 数据源
    pub fn jsonl(id: &str, category: &str, shards: Vec<String>) -> Self {
        let mut source = Self::with_kind(id, category, SourceKind::Jsonl);
        source.shards = shards;
        source
    }

    /// 创建纯文本数据源
    pub fn text(id: &str, category: &str, shards: Vec<String>) -> Self {
        let mut source = Self::with_kind(id, category, SourceKind::Text);
        source.shards = shards;
        source
    }

    /// Hugging Face 数据集配置，未设置时为 `default`
    pub fn hf_config(&self) -> &str {
        self.config.as_deref().unwrap_or("default")
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 读取配置文件（未指定时使用可选的 `config/default`），再叠加 `TRCORPUS__` 前缀的环境变量。
    /// 指定的配置文件整体替换默认目录，两者的 `[[sources]]` 不会合并。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并校验的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = match config_path {
            Some(path) => Config::builder().add_source(File::from(path).required(true)),
            None => {
                Config::builder().add_source(File::with_name("config/default").required(false))
            }
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix("TRCORPUS").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// 校验字段范围与数据源目录的一致性
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Message(format!("invalid settings: {}", e)))?;

        if let Some(max) = self.cleaning.max_chars {
            if max < self.cleaning.min_chars {
                return Err(ConfigError::Message(format!(
                    "cleaning.max_chars ({}) is smaller than cleaning.min_chars ({})",
                    max, self.cleaning.min_chars
                )));
            }
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.id.as_str()) {
                return Err(ConfigError::Message(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }

            if !is_valid_category(&source.category) {
                return Err(ConfigError::Message(format!(
                    "source '{}' has invalid category '{}': must be a single directory name",
                    source.id, source.category
                )));
            }

            match source.kind {
                SourceKind::HfRows if source.dataset.as_deref().unwrap_or("").is_empty() => {
                    return Err(ConfigError::Message(format!(
                        "source '{}' of kind hf_rows needs a dataset",
                        source.id
                    )));
                }
                SourceKind::Jsonl | SourceKind::Text if source.shards.is_empty() => {
                    return Err(ConfigError::Message(format!(
                        "source '{}' lists no shards",
                        source.id
                    )));
                }
                _ => {}
            }

            EncodingHint::parse(&source.encoding).map_err(|e| {
                ConfigError::Message(format!("source '{}': {}", source.id, e))
            })?;
        }

        Ok(())
    }

    /// 清单文件路径
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .path
            .clone()
            .unwrap_or_else(|| self.output.dir.join("manifest.jsonl"))
    }

    /// 根据标识查找数据源
    pub fn find_source(&self, id: &str) -> Option<&SourceSettings> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// 按首次出现顺序列出所有分类
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for source in &self.sources {
            if !categories.contains(&source.category.as_str()) {
                categories.push(source.category.as_str());
            }
        }
        categories
    }
}

/// 分类名直接作为输出目录下的一级子目录
fn is_valid_category(category: &str) -> bool {
    let trimmed = category.trim();
    !trimmed.is_empty()
        && trimmed == category
        && !trimmed.contains(['/', '\\'])
        && trimmed != "."
        && !trimmed.contains("..")
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
