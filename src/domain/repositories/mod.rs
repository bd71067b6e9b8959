// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义输出语料与下载清单的持久化抽象，具体实现位于基础设施层
pub mod manifest_repository;
pub mod storage_repository;

pub use manifest_repository::ManifestRepository;
pub use storage_repository::{CorpusRepository, StorageError};
