use crate::pipeline::{RunEvent, RunPhase};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// A 0-100 bar for a whole extraction run.
    pub fn create_run_progress(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(100));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// The run bar plus what it has seen of the run so far.
pub struct RunProgress {
    bar: ProgressBar,
    cleaning_up: bool,
}

impl RunProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            cleaning_up: false,
        }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Mirror one run event on the bar.
    ///
    /// Progress reported once cleanup has begun is not drawn: the bar keeps
    /// the furthest position reached so the finished line still shows how
    /// far the run got.
    pub fn apply(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Progress { percent, status } => {
                if self.cleaning_up {
                    return;
                }
                self.bar.set_position(percent.round() as u64);
                self.bar.set_message(status.clone());
            }
            RunEvent::VideoExtracted { file_name } => {
                self.bar.println(format!("  ✓ {}", file_name));
            }
            RunEvent::Error(message) => {
                self.bar.println(format!("  ✗ {}", message));
            }
            RunEvent::Phase(RunPhase::Cleanup | RunPhase::Idle) => {
                self.cleaning_up = true;
                self.bar.set_message("Cleaning up...");
            }
            RunEvent::Phase(_) => {}
        }
    }

    pub fn finish_with_summary(&self, message: &str, duration: Duration) {
        let final_message = format!("{} (completed in {})", message, format_duration(duration));
        self.bar.finish_with_message(final_message);
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
