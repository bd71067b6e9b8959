// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 加载配置文件与环境变量，描述输出、下载、清洗设置和数据源目录
pub mod settings;
