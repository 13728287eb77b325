//! Pre-validation summaries and the dry-run preview

use std::fmt::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::core::constants::{display, files};
use crate::core::types::LinkKind;
use crate::ui::color::{Colors, colorize};
use crate::validation::PreValidationStats;

/// Human-readable stop conditions, e.g. `10 files OR 50 broken links`
pub fn termination_conditions(config: &Config) -> Option<String> {
    let mut conditions = Vec::new();
    if config.max_files > 0 {
        conditions.push(format!("{} files", config.max_files));
    }
    if config.max_broken > 0 {
        conditions.push(format!("{} broken links", config.max_broken));
    }
    (!conditions.is_empty()).then(|| conditions.join(" OR "))
}

/// Log the census taken before validation starts
pub fn log_pre_validation(config: &Config, stats: &PreValidationStats) {
    log::info!(
        "Found {} files in {} directories",
        stats.total_files,
        stats.total_directories
    );
    log::info!("Total links found: {}", stats.total_links);
    log::info!("Links in scope ({}): {}", config.scope, stats.scoped_links);
    if let Some(conditions) = termination_conditions(config) {
        log::info!("Will stop after: {conditions}");
    }
}

/// Render what a real run would cover, without validating anything
pub fn render_dry_run(
    config: &Config,
    stats: &PreValidationStats,
    targets: &[PathBuf],
    color: bool,
) -> String {
    let heading = |text: &str| colorize(text, Colors::BOLD, color);
    let mut out = String::new();

    let _ = writeln!(out, "{}", heading("🔍 Dry run: validation preview"));
    let _ = writeln!(out, "==============================");
    let _ = writeln!(out, "📁 Directories: {}", stats.total_directories);
    let _ = writeln!(out, "{} Files: {}", display::FILE_EMOJI, stats.total_files);
    let _ = writeln!(out, "{} Total Links: {}", display::LINK_EMOJI, stats.total_links);
    let _ = writeln!(
        out,
        "🎯 Scoped Links: {} ({})",
        stats.scoped_links, config.scope
    );
    if let Some(conditions) = termination_conditions(config) {
        let _ = writeln!(out, "⏹️  Would stop after: {conditions}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("Link Type Breakdown:"));
    for kind in LinkKind::ALL {
        let marker = if config.scope.includes(kind) {
            colorize(display::SUCCESS_EMOJI, Colors::GREEN, color)
        } else {
            colorize("⏭️ ", Colors::DIM, color)
        };
        let _ = writeln!(
            out,
            "  {marker} {}: {} links",
            kind.label(),
            stats.links_by_type.get(kind)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("Sample Files to Process:"));
    for (i, file) in targets.iter().take(files::PREVIEW_SAMPLE_SIZE).enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, file.display());
    }
    if targets.len() > files::PREVIEW_SAMPLE_SIZE {
        let _ = writeln!(
            out,
            "  ... and {} more files",
            targets.len() - files::PREVIEW_SAMPLE_SIZE
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "💡 To perform actual validation, remove --dry-run");
    out
}
