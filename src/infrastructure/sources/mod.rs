// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据源模块
///
/// - 游标（cursor）：逐分片遍历一个数据源
/// - Hugging Face（huggingface）：datasets-server rows 接口
/// - 分片解析（shard_parser）：JSON Lines 与纯文本分片
pub mod cursor;
pub mod huggingface;
pub mod shard_parser;

pub use cursor::SourceCursor;
