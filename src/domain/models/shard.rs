// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::manifest::ShardFailure;
use super::record::RawRecord;

/// 分片：数据源中一个可单独获取的单元（一个文件或一页 rows）
#[derive(Debug, Clone)]
pub struct Shard {
    /// 分片标识（URL 或 `rows@<offset>`）
    pub id: String,
    /// 分片中的原始记录
    pub records: Vec<RawRecord>,
    /// 下载字节数
    pub bytes: u64,
}

/// 一个数据源的全部抓取结果
#[derive(Debug, Clone, Default)]
pub struct FetchedSource {
    pub records: Vec<RawRecord>,
    pub shard_failures: Vec<ShardFailure>,
    pub shards_fetched: u64,
    pub bytes_fetched: u64,
}
