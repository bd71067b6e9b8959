// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod corpus_stats;
pub mod corpus_store;
pub mod line_file;
pub mod manifest_log;

pub use corpus_store::FileCorpusStore;
pub use manifest_log::FileManifestLog;
