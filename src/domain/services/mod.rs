// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 清洗服务（cleaning_service）：文本提取、规范化与过滤器链
/// - 去重服务（dedup_service）：跨数据源、跨运行的内容指纹索引
///
/// 领域服务只包含纯粹的业务规则，不执行任何 IO。
pub mod cleaning_service;
pub mod dedup_service;
