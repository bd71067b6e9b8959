// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了流水线的核心数据结构，包括：
/// - 记录（record）：原始记录、清洗后记录、内容指纹与丢弃原因
/// - 清单（manifest）：每次抓取尝试的审计条目
/// - 分片（shard）：数据源中可单独获取的单元
pub mod manifest;
pub mod record;
pub mod shard;

pub use manifest::{FetchOutcome, ManifestEntry, ShardFailure};
pub use record::{CleanOutcome, CleanedRecord, Fingerprint, RawRecord, RejectReason};
pub use shard::{FetchedSource, Shard};
