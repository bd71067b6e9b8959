// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::settings::SourceSettings;

/// datasets-server rows 接口的一页结果
#[derive(Debug, Deserialize)]
pub struct RowsPage {
    #[serde(default)]
    pub rows: Vec<RowEntry>,
    #[serde(default)]
    pub num_rows_total: Option<u64>,
}

/// rows 接口中的一行
#[derive(Debug, Deserialize)]
pub struct RowEntry {
    #[serde(default)]
    pub row_idx: Option<u64>,
    pub row: Value,
}

/// 构造 rows 接口地址
///
/// `dataset`、`config`、`split`、`offset`、`length` 作为查询参数编码
pub fn rows_url(
    endpoint: &str,
    source: &SourceSettings,
    offset: u64,
    length: u64,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(endpoint)?;
    let dataset = source.dataset.as_deref().unwrap_or(&source.id);
    url.query_pairs_mut()
        .append_pair("dataset", dataset)
        .append_pair("config", source.hf_config())
        .append_pair("split", &source.split)
        .append_pair("offset", &offset.to_string())
        .append_pair("length", &length.to_string());
    Ok(url.into())
}

/// 解析 rows 接口的响应体
pub fn parse_rows_page(body: &[u8]) -> Result<RowsPage, serde_json::Error> {
    serde_json::from_slice(body)
}
