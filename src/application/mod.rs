// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 编排领域服务与基础设施：流水线负责单个数据源的 获取 → 清洗 → 持久化 → 记录，
/// 下载用例负责选择数据源并汇总整次运行的结果
pub mod dto;
pub mod pipeline;
pub mod shutdown;
pub mod use_cases;
