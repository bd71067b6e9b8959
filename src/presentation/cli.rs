// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::settings::{OutputFormat, Settings};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(
    name = "trcorpus",
    version,
    about = "Download, clean and deduplicate Turkish text corpora"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (replaces config/default)
    #[arg(long, global = true, env = "TRCORPUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, clean and append sources to the corpus
    Run(RunArgs),

    /// List configured sources
    List {
        /// Only list this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show record counts and sizes per category
    Stats,

    /// Check that every corpus line is well formed
    Validate {
        /// Only validate this category
        #[arg(long)]
        category: Option<String>,

        /// Print the first N records of each file
        #[arg(long, default_value_t = 0)]
        show: usize,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only process sources in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only process this source (repeatable)
    #[arg(long = "source", value_name = "ID")]
    pub sources: Vec<String>,

    /// Maximum records to read per source
    #[arg(long)]
    pub limit: Option<u64>,

    /// Skip the Turkish language check
    #[arg(long)]
    pub disable_lang_check: bool,

    /// Corpus file format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Jsonl,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jsonl => OutputFormat::Jsonl,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

impl RunArgs {
    /// 把命令行覆盖项写入配置
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(limit) = self.limit {
            settings.fetch.limit = Some(limit);
        }
        if self.disable_lang_check {
            settings.cleaning.language.enabled = false;
        }
        if let Some(format) = self.format {
            settings.output.format = format.into();
        }
    }
}
