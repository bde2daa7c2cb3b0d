//! Progress bar for archive builds.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use paerius_core::ProgressCallback;
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

/// CLI progress bar wrapper implementing `ProgressCallback`.
///
/// The bar counts packed files. Its length is taken from the first
/// `on_entry_start`, since the file count is only known after pruning.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_read: u64,
}

impl CliProgress {
    /// Creates a progress bar showing `message` before the bar.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(0);

        // "Packing [████████░░░░] 42/100 files (1.2 MB, 3s)"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} files ({prefix}, {elapsed_short})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .with_key("elapsed_short", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_duration(state.elapsed())).unwrap_or(());
                })
                .progress_chars("█▓░"),
        );

        bar.set_message(message.to_string());
        bar.set_prefix(humanize_bytes(0));

        Self { bar, bytes_read: 0 }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, _path: &Path, total: usize, _current: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_read += bytes;
        self.bar.set_prefix(humanize_bytes(self.bytes_read));
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn humanize_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(512), "512 B");
        assert_eq!(humanize_bytes(2048), "2.0 KB");
        assert_eq!(humanize_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration(Duration::from_secs(42)), "42s");
        assert_eq!(humanize_duration(Duration::from_secs(125)), "2m5s");
        assert_eq!(humanize_duration(Duration::from_secs(3720)), "1h2m");
    }

    #[test]
    fn test_progress_tracks_length_and_bytes() {
        let mut progress = CliProgress::new("Packing");
        progress.on_entry_start(Path::new("a.php"), 2, 1);
        progress.on_bytes_written(100);
        progress.on_entry_complete(Path::new("a.php"));
        progress.on_entry_start(Path::new("b.php"), 2, 2);
        progress.on_bytes_written(50);
        progress.on_entry_complete(Path::new("b.php"));

        assert_eq!(progress.bar.length(), Some(2));
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bytes_read, 150);
        progress.on_complete();
    }
}
