//! Rendering a finished validation run in the supported output formats

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::config::OutputFormat;
use crate::core::Result;
use crate::core::constants::display;
use crate::core::types::LinkKind;
use crate::ui::color::{Colors, colorize};
use crate::validation::{LinkRecord, TerminationReason, ValidationRun};

/// Settings that shape a rendered report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Cap on listed broken links (0 = list all)
    pub max_broken: u64,
    /// Emit ANSI colors in console output
    pub color: bool,
}

/// Renders a `ValidationRun` to text and delivers it
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Render the run in the requested format
    pub fn render(&self, run: &ValidationRun, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => Ok(self.render_console(run)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(run)?),
            OutputFormat::Markdown => Ok(self.render_markdown(run)),
            OutputFormat::Html => Ok(self.render_html(run)),
        }
    }

    /// Print the report to stdout, or write it to `output` when given
    pub fn write_report(
        &self,
        run: &ValidationRun,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<()> {
        let rendered = self.render(run, format)?;

        match output {
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, rendered)?;
                log::info!("Report written to {}", path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }

    /// Broken links to list, capped at `max_broken` when set
    fn listed_broken<'a>(&self, run: &'a ValidationRun) -> Vec<(&'a Path, &'a LinkRecord)> {
        let broken = run.broken_links();
        if self.options.max_broken > 0 {
            broken.take(self.options.max_broken as usize).collect()
        } else {
            broken.collect()
        }
    }

    fn render_console(&self, run: &ValidationRun) -> String {
        let color = self.options.color;
        let summary = &run.summary;
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            colorize("📊 Link Validation Summary", Colors::BOLD, color)
        );
        let _ = writeln!(out, "==========================");
        let _ = writeln!(
            out,
            "{} Files processed: {} of {}",
            display::FILE_EMOJI,
            summary.files_processed,
            summary.total_files_available
        );
        let _ = writeln!(out, "{} Total links: {}", display::LINK_EMOJI, summary.total_links);
        let broken = summary.broken_links.to_string();
        let _ = writeln!(
            out,
            "{} Broken links: {}",
            display::ERROR_EMOJI,
            if summary.broken_links > 0 {
                colorize(&broken, Colors::BRIGHT_RED, color)
            } else {
                colorize(&broken, Colors::BRIGHT_GREEN, color)
            }
        );
        let _ = writeln!(out, "Success rate: {:.2}%", summary.success_rate);
        let _ = writeln!(out, "Execution time: {:.3}s", summary.execution_time);
        if let Some(note) = termination_note(summary.termination) {
            let _ = writeln!(
                out,
                "{} {}",
                display::WARNING_EMOJI,
                colorize(note, Colors::YELLOW, color)
            );
        }

        let listed = self.listed_broken(run);
        if !listed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", colorize("Broken links:", Colors::BOLD, color));
            let mut current: Option<&Path> = None;
            for (file, record) in &listed {
                if current != Some(*file) {
                    let _ = writeln!(
                        out,
                        "{} {}",
                        display::FILE_EMOJI,
                        colorize(&file.display().to_string(), Colors::BRIGHT_CYAN, color)
                    );
                    current = Some(*file);
                }
                let _ = writeln!(
                    out,
                    "  {} {}:{} [{}] {} - {}",
                    colorize(display::ERROR_EMOJI, Colors::RED, color),
                    record.line,
                    record.column,
                    record.kind,
                    record.target,
                    colorize(&record.status, Colors::DIM, color)
                );
            }
            if let Some(note) = truncation_note(listed.len(), summary.broken_links) {
                let _ = writeln!(out, "  {note}");
            }
        }

        let failed: Vec<_> = run.results.iter().filter(|r| r.has_error()).collect();
        if !failed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", colorize("File errors:", Colors::BOLD, color));
            for result in failed {
                let _ = writeln!(
                    out,
                    "  {} {}: {}",
                    display::WARNING_EMOJI,
                    result.file.display(),
                    result.error.as_deref().unwrap_or_default()
                );
            }
        }

        if !run.has_failures() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{} {}",
                display::SUCCESS_EMOJI,
                colorize("All links are valid!", Colors::BRIGHT_GREEN, color)
            );
        }
        out
    }

    fn render_markdown(&self, run: &ValidationRun) -> String {
        let summary = &run.summary;
        let mut out = String::new();

        let _ = writeln!(out, "# Link Validation Report");
        let _ = writeln!(out);
        let _ = writeln!(out, "Generated: {}", run.timestamp);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "| --- | --- |");
        let _ = writeln!(
            out,
            "| Files processed | {} of {} |",
            summary.files_processed, summary.total_files_available
        );
        let _ = writeln!(out, "| Total links | {} |", summary.total_links);
        let _ = writeln!(out, "| Broken links | {} |", summary.broken_links);
        let _ = writeln!(out, "| Files with errors | {} |", summary.files_with_errors);
        let _ = writeln!(out, "| Success rate | {:.2}% |", summary.success_rate);
        let _ = writeln!(out, "| Execution time | {:.3}s |", summary.execution_time);
        for kind in LinkKind::ALL {
            let _ = writeln!(
                out,
                "| {} links | {} ({} broken) |",
                kind.label(),
                summary.links_by_type.get(kind),
                summary.broken_by_type.get(kind)
            );
        }
        if let Some(note) = termination_note(summary.termination) {
            let _ = writeln!(out);
            let _ = writeln!(out, "> {note}");
        }

        let listed = self.listed_broken(run);
        if !listed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Broken Links");
            let mut current: Option<&Path> = None;
            for (file, record) in &listed {
                if current != Some(*file) {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "### `{}`", file.display());
                    let _ = writeln!(out);
                    current = Some(*file);
                }
                let _ = writeln!(
                    out,
                    "- Line {}, column {} ({}): `{}` - {}",
                    record.line, record.column, record.kind, record.target, record.status
                );
            }
            if let Some(note) = truncation_note(listed.len(), summary.broken_links) {
                let _ = writeln!(out);
                let _ = writeln!(out, "_{note}_");
            }
        }

        let failed: Vec<_> = run.results.iter().filter(|r| r.has_error()).collect();
        if !failed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## File Errors");
            let _ = writeln!(out);
            for result in failed {
                let _ = writeln!(
                    out,
                    "- `{}`: {}",
                    result.file.display(),
                    result.error.as_deref().unwrap_or_default()
                );
            }
        }
        out
    }

    fn render_html(&self, run: &ValidationRun) -> String {
        let summary = &run.summary;
        let status_class = if run.has_failures() { "error" } else { "success" };

        let mut stats = String::new();
        for (label, value) in [
            (
                "Files Processed",
                format!(
                    "{} / {}",
                    summary.files_processed, summary.total_files_available
                ),
            ),
            ("Total Links", summary.total_links.to_string()),
            ("Broken Links", summary.broken_links.to_string()),
            ("Success Rate", format!("{:.2}%", summary.success_rate)),
        ] {
            let _ = write!(
                stats,
                r#"<div class="stat"><div class="value">{}</div><div class="label">{}</div></div>"#,
                escape_html(&value),
                label
            );
        }

        let mut notes = String::new();
        if let Some(note) = termination_note(summary.termination) {
            let _ = write!(notes, r#"<p class="warning">{}</p>"#, escape_html(note));
        }

        let listed = self.listed_broken(run);
        let mut rows = String::new();
        for (file, record) in &listed {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}:{}</td><td>{}</td><td><code>{}</code></td><td>{}</td></tr>",
                escape_html(&file.display().to_string()),
                record.line,
                record.column,
                record.kind,
                escape_html(&record.target),
                escape_html(&record.status)
            );
        }
        let broken_section = if listed.is_empty() {
            r#"<p class="success">All links are valid.</p>"#.to_string()
        } else {
            let truncation = truncation_note(listed.len(), summary.broken_links)
                .map(|note| format!("<p><em>{}</em></p>", escape_html(&note)))
                .unwrap_or_default();
            format!(
                "<h2>Broken Links</h2><table><thead><tr><th>File</th><th>Position</th>\
                 <th>Type</th><th>Target</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>{truncation}"
            )
        };

        let mut errors = String::new();
        for result in run.results.iter().filter(|r| r.has_error()) {
            let _ = write!(
                errors,
                "<li><code>{}</code>: {}</li>",
                escape_html(&result.file.display().to_string()),
                escape_html(result.error.as_deref().unwrap_or_default())
            );
        }
        if !errors.is_empty() {
            errors = format!("<h2>File Errors</h2><ul>{errors}</ul>");
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Link Validation Report</title>
    <style>{}</style>
</head>
<body>
    <div class="container">
        <h1 class="{status_class}">Link Validation Report</h1>
        <p class="meta">Generated {} in {:.3}s</p>
        <div class="stats">{stats}</div>
        {notes}
        {broken_section}
        {errors}
    </div>
</body>
</html>
"#,
            REPORT_CSS,
            escape_html(&run.timestamp),
            summary.execution_time
        )
    }
}

const REPORT_CSS: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f8fafc; color: #1e293b; }
        .container { max-width: 1100px; margin: 0 auto; padding: 2rem; }
        .meta { color: #64748b; }
        .stats { display: flex; gap: 1rem; margin: 1.5rem 0; }
        .stat { background: #fff; border: 1px solid #e2e8f0; border-radius: 8px; padding: 1rem 1.5rem; }
        .stat .value { font-size: 1.5rem; font-weight: 600; }
        .stat .label { color: #64748b; }
        .success { color: #059669; }
        .warning { color: #d97706; }
        .error { color: #dc2626; }
        table { width: 100%; border-collapse: collapse; background: #fff; }
        th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #e2e8f0; }
    "#;

fn termination_note(reason: TerminationReason) -> Option<&'static str> {
    match reason {
        TerminationReason::Completed => None,
        TerminationReason::MaxFiles => Some("Validation stopped early: max files limit reached"),
        TerminationReason::MaxBroken => {
            Some("Validation stopped early: max broken links limit reached")
        }
    }
}

fn truncation_note(listed: usize, total: usize) -> Option<String> {
    (listed < total).then(|| format!("Showing first {listed} of {total} broken links"))
}

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::core::types::{Link, LinkFormat, ValidationOutcome};
    use crate::validation::{FileResult, RunSummary};
    use std::path::PathBuf;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn link(target: &str, line: u64) -> Link {
        Link::new(target, "text", Path::new("docs/a.md"), line, 3, LinkFormat::Markdown).unwrap()
    }

    fn sample_run(broken: usize) -> ValidationRun {
        let mut result = FileResult::new(Path::new("docs/a.md"));
        result.record(&link("ok.md", 1), &ValidationOutcome::valid("Internal link valid"));
        for i in 0..broken {
            result.record(
                &link(&format!("missing{i}.md"), i as u64 + 2),
                &ValidationOutcome::broken("Internal link target not found"),
            );
        }

        let mut summary = RunSummary::new(1);
        summary.absorb(&result);
        summary.finalize(0.25, TerminationReason::Completed);

        ValidationRun {
            execution_time: summary.execution_time,
            summary,
            results: vec![result],
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_render__json_is_pretty_and_parses() -> TestResult {
        let report = ReportGenerator::default().render(&sample_run(1), OutputFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&report)?;

        assert!(report.contains('\n'));
        assert_eq!(value["summary"]["broken_links"], 1);
        assert_eq!(value["results"][0]["broken_links"][0]["type"], "internal");
        assert!(value["results"][0].get("error").is_none());
        Ok(())
    }

    #[test]
    fn test_render__console_without_color() -> TestResult {
        let report = ReportGenerator::default().render(&sample_run(2), OutputFormat::Console)?;

        assert!(report.contains("Files processed: 1 of 1"));
        assert!(report.contains("Broken links: 2"));
        assert!(report.contains("docs/a.md"));
        assert!(report.contains("2:3 [internal] missing0.md - Internal link target not found"));
        assert!(!report.contains('\x1b'));
        Ok(())
    }

    #[test]
    fn test_render__console_all_valid() -> TestResult {
        let generator = ReportGenerator::new(ReportOptions {
            max_broken: 0,
            color: true,
        });
        let report = generator.render(&sample_run(0), OutputFormat::Console)?;

        assert!(report.contains("All links are valid!"));
        assert!(report.contains(Colors::BRIGHT_GREEN));
        Ok(())
    }

    #[test]
    fn test_render__markdown_truncates_listing() -> TestResult {
        let generator = ReportGenerator::new(ReportOptions {
            max_broken: 2,
            color: false,
        });
        let report = generator.render(&sample_run(4), OutputFormat::Markdown)?;

        assert!(report.contains("| Broken links | 4 |"));
        assert!(report.contains("### `docs/a.md`"));
        assert!(report.contains("`missing1.md`"));
        assert!(!report.contains("`missing2.md`"));
        assert!(report.contains("_Showing first 2 of 4 broken links_"));
        Ok(())
    }

    #[test]
    fn test_render__markdown_termination_note() -> TestResult {
        let mut run = sample_run(1);
        run.summary.termination = TerminationReason::MaxFiles;
        let report = ReportGenerator::default().render(&run, OutputFormat::Markdown)?;

        assert!(report.contains("> Validation stopped early: max files limit reached"));
        Ok(())
    }

    #[test]
    fn test_render__html_escapes_content() -> TestResult {
        let mut run = sample_run(0);
        let mut result = FileResult::new(Path::new("docs/b.md"));
        result.record(
            &link("<script>.md", 4),
            &ValidationOutcome::broken("Internal link target not found"),
        );
        run.summary.absorb(&result);
        run.results.push(result);

        let report = ReportGenerator::default().render(&run, OutputFormat::Html)?;

        assert!(report.starts_with("<!DOCTYPE html>"));
        assert!(report.contains("&lt;script&gt;.md"));
        assert!(!report.contains("<script>"));
        assert!(report.contains("<h2>Broken Links</h2>"));
        Ok(())
    }

    #[test]
    fn test_render__file_errors_listed() -> TestResult {
        let mut run = sample_run(0);
        let failed = FileResult::failed(Path::new("gone.md"), "Cannot read file: denied".into());
        run.summary.absorb(&failed);
        run.results.push(failed);

        let console = ReportGenerator::default().render(&run, OutputFormat::Console)?;
        assert!(console.contains("gone.md: Cannot read file: denied"));

        let markdown = ReportGenerator::default().render(&run, OutputFormat::Markdown)?;
        assert!(markdown.contains("- `gone.md`: Cannot read file: denied"));
        Ok(())
    }

    #[test]
    fn test_write_report__creates_parent_directories() -> TestResult {
        let dir = TempDir::new()?;
        let output: PathBuf = dir.path().join("nested/out/report.json");

        ReportGenerator::default().write_report(&sample_run(1), OutputFormat::Json, Some(&output))?;

        let written = fs::read_to_string(&output)?;
        let value: serde_json::Value = serde_json::from_str(&written)?;
        assert_eq!(value["summary"]["total_links"], 2);
        Ok(())
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
