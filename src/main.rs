// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use tracing::info;

use trcorpus::config::settings::Settings;
use trcorpus::presentation::cli::{Cli, Command};
use trcorpus::presentation::commands;
use trcorpus::utils::telemetry;

/// 主函数
///
/// 解析命令行、加载配置、初始化日志后分发子命令
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        settings.output.dir = output.clone();
    }

    // 2. Initialize logging
    let _guard = telemetry::init_telemetry(
        settings.logging.filter.as_deref(),
        settings.logging.file.as_deref(),
    );
    info!(
        version = env!("CARGO_PKG_VERSION"),
        output = %settings.output.dir.display(),
        sources = settings.sources.len(),
        "Starting trcorpus"
    );

    // 3. Dispatch
    match cli.command {
        Command::Run(args) => commands::handle_run(settings, args).await,
        Command::List { category } => commands::handle_list(&settings, category.as_deref()),
        Command::Stats => commands::handle_stats(&settings),
        Command::Validate { category, show } => {
            commands::handle_validate(&settings, category.as_deref(), show)
        }
    }
}
