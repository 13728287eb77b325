use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::path::Path;

/// File-level progress bar for the validation loop.
///
/// Draws to stderr and stays hidden when disabled or when stderr is not a terminal.
pub struct ProgressReporter {
    bar: ProgressBar,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total_files: usize, enabled: bool) -> Self {
        let enabled = enabled && std::io::stderr().is_terminal();
        let bar = ProgressBar::with_draw_target(
            Some(total_files as u64),
            if enabled {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );

        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self { bar, enabled }
    }

    /// Reporter that never draws
    pub fn hidden() -> Self {
        Self::new(0, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mark `file` as the one being scanned
    pub fn start_file(&self, file: &Path) {
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        self.bar.set_message(name);
    }

    pub fn file_done(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, processed: usize, total: usize) {
        let message = if processed == total {
            "✓ All files validated".to_string()
        } else {
            format!("stopped early ({processed}/{total} files)")
        };
        if self.enabled {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish_with_message(message);
        }
    }
}
