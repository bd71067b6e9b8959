// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::application::dto::run_summary::{DownloadRequest, RunSummary};
use crate::application::pipeline::CorpusPipeline;
use crate::application::shutdown::ShutdownSignal;
use crate::application::use_cases::download_use_case::DownloadUseCase;
use crate::config::settings::{Settings, SourceKind, SourceSettings};
use crate::domain::models::FetchOutcome;
use crate::infrastructure::storage::corpus_stats::{
    category_stats, inspect_corpus, sample_texts,
};
use crate::infrastructure::storage::FileManifestLog;
use crate::presentation::cli::RunArgs;
use crate::utils::format::{format_duration, format_size};

const PREVIEW_CHARS: usize = 200;

/// 处理 `run` 子命令
pub async fn handle_run(mut settings: Settings, args: RunArgs) -> Result<()> {
    args.apply(&mut settings);
    let request = DownloadRequest {
        category: args.category.clone(),
        source_ids: args.sources.clone(),
    };
    // fail on unknown ids before touching the output directory
    DownloadUseCase::select_sources(&settings, &request)?;

    let shutdown = ShutdownSignal::new();
    let listener = shutdown.listen_for_ctrl_c();

    let result = match CorpusPipeline::open(settings, shutdown).await {
        Ok(pipeline) => DownloadUseCase::new(pipeline).execute(request).await,
        Err(e) => Err(e),
    };
    listener.abort();

    let summary = result?;
    print_run_summary(&summary);
    if summary.interrupted {
        warn!(run_id = %summary.run_id, "Run interrupted");
    }
    Ok(())
}

fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("Run {} finished in {}", summary.run_id, format_duration(summary.duration));
    for (category, stats) in summary.by_category() {
        println!(
            "  [{}] {}/{} sources ok, {} records written",
            category, stats.succeeded, stats.attempted, stats.records_written
        );
        if !stats.failed.is_empty() {
            println!("      failed: {}", stats.failed.join(", "));
        }
    }
    for entry in &summary.entries {
        println!(
            "  {:<32} {:<12} fetched {:>9}  written {:>9}  rejected {:>9}",
            entry.source_id,
            entry.outcome.to_string(),
            entry.records_fetched,
            entry.records_written,
            entry.rejected_total()
        );
    }
    println!(
        "  total: {} fetched, {} written, {} downloaded",
        summary.records_fetched(),
        summary.records_written(),
        format_size(summary.bytes_fetched())
    );
}

/// 处理 `list` 子命令
pub fn handle_list(settings: &Settings, category: Option<&str>) -> Result<()> {
    let categories: Vec<&str> = match category {
        Some(c) if settings.categories().contains(&c) => vec![c],
        Some(c) => bail!("unknown category '{}'", c),
        None => settings.categories(),
    };

    for category in categories {
        println!("[{}]", category);
        for source in settings.sources.iter().filter(|s| s.category == category) {
            println!("  {:<32} {:<8} {}", source.id, kind_label(source), origin(source));
            if !source.description.is_empty() {
                println!("      {}", source.description);
            }
        }
    }
    Ok(())
}

fn kind_label(source: &SourceSettings) -> &'static str {
    match source.kind {
        SourceKind::HfRows => "hf_rows",
        SourceKind::Jsonl => "jsonl",
        SourceKind::Text => "text",
    }
}

fn origin(source: &SourceSettings) -> String {
    match source.kind {
        SourceKind::HfRows => format!(
            "{} ({}/{})",
            source.dataset.as_deref().unwrap_or_default(),
            source.hf_config(),
            source.split
        ),
        _ => format!("{} shard(s)", source.shards.len()),
    }
}

/// 处理 `stats` 子命令
pub fn handle_stats(settings: &Settings) -> Result<()> {
    let reports = inspect_corpus(&settings.output.dir, None)?;
    let stats = category_stats(&reports);

    println!("Corpus at {}", settings.output.dir.display());
    let mut total_records = 0u64;
    let mut total_bytes = 0u64;
    for (category, stats) in &stats {
        println!(
            "  {:<16} {:>4} files {:>12} records {:>12}",
            category,
            stats.files,
            stats.records,
            format_size(stats.bytes)
        );
        total_records += stats.records;
        total_bytes += stats.bytes;
    }
    println!(
        "  {:<16} {:>4} files {:>12} records {:>12}",
        "total",
        reports.len(),
        total_records,
        format_size(total_bytes)
    );

    let entries = FileManifestLog::read_entries(&settings.manifest_path())?;
    if !entries.is_empty() {
        let mut outcomes: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &entries {
            *outcomes.entry(entry.outcome.to_string()).or_default() += 1;
        }
        let runs: std::collections::HashSet<_> = entries.iter().map(|e| e.run_id).collect();
        println!(
            "Manifest: {} attempts over {} runs ({})",
            entries.len(),
            runs.len(),
            outcomes
                .iter()
                .map(|(outcome, count)| format!("{} {}", count, outcome))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Some(last) = entries
            .iter()
            .rev()
            .find(|e| e.outcome == FetchOutcome::Aborted)
        {
            println!(
                "  last aborted source: {} ({})",
                last.source_id,
                last.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(())
}

/// 处理 `validate` 子命令
///
/// 存在无效行或不完整尾行的文件会使命令以错误退出
pub fn handle_validate(settings: &Settings, category: Option<&str>, show: usize) -> Result<()> {
    let reports = inspect_corpus(&settings.output.dir, category)?;
    if reports.is_empty() {
        println!("No corpus files under {}", settings.output.dir.display());
        return Ok(());
    }

    let mut invalid_files = 0usize;
    for report in &reports {
        let status = if report.is_valid() { "OK" } else { "INVALID" };
        println!(
            "{:<8} {}  records {}  invalid {}  size {}{}",
            status,
            report.path.display(),
            report.records,
            report.invalid_lines,
            format_size(report.bytes),
            if report.incomplete_tail { "  (incomplete last line)" } else { "" }
        );
        if !report.is_valid() {
            invalid_files += 1;
        }

        for (i, text) in sample_texts(report, show)?.iter().enumerate() {
            let preview: String = text.chars().take(PREVIEW_CHARS).collect();
            let ellipsis = if text.chars().count() > PREVIEW_CHARS { "..." } else { "" };
            println!("    {}. {}{}", i + 1, preview, ellipsis);
        }
    }

    info!(files = reports.len(), invalid = invalid_files, "Validation finished");
    if invalid_files > 0 {
        bail!("{} corpus file(s) failed validation", invalid_files);
    }
    Ok(())
}
