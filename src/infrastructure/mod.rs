// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含与外部系统交互的技术实现：
/// - 数据源（sources）：远程与本地分片的获取、解码和解析
/// - 存储（storage）：输出语料文件、下载清单以及语料统计
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体实现。
pub mod sources;
pub mod storage;
