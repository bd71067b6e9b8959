// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含语料流水线的核心业务逻辑，包括：
/// - 领域模型（models）：记录、分片与清单条目
/// - 仓库接口（repositories）：语料与清单的持久化抽象接口
/// - 服务（services）：清洗规则与去重索引
///
/// 领域层不依赖于任何网络或文件系统实现。
pub mod models;
pub mod repositories;
pub mod services;
