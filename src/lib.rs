// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 流水线编排、下载用例与停止信号
pub mod application;

/// 配置模块
///
/// 处理配置文件、环境变量与数据源目录
pub mod config;

/// 领域模块
///
/// 包含记录与清单模型、清洗规则和仓库接口
pub mod domain;

/// 引擎模块
///
/// 通过 HTTP 或本地文件系统获取分片
pub mod engines;

/// 基础设施模块
///
/// 数据源游标、语料文件与下载清单的具体实现
pub mod infrastructure;

/// 表示层模块
///
/// 命令行参数与子命令处理
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
