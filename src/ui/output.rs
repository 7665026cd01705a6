use crate::archive::PackageMediaEntry;
use crate::error::{UserFriendlyError, VidError};
use crate::extractor::{ExtractionReport, RunOutcome};
use crate::scanner::media_scanner::format_bytes;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static FILM: Emoji = Emoji("🎬 ", "> ");
static FOLDER: Emoji = Emoji("📁 ", "");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    // Core messaging methods
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", FILM, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                // The report is the only JSON document on stdout
                OutputMode::Json => {}
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &VidError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    /// The full error log, one entry per paragraph.
    pub fn print_error_details(&self, report: &ExtractionReport) {
        if !report.has_errors() {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                self.print_header("Error Details");
                println!("{}", report.error_details());
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "error_details",
                    "errors": report.errors,
                }));
            }
            OutputMode::Plain => {
                println!("ERROR DETAILS:");
                println!("{}", report.error_details());
            }
        }
    }

    /// What a run would extract, without extracting anything.
    pub fn print_dry_run(&self, package: &Path, entries: &[PackageMediaEntry]) {
        let videos: Vec<&PackageMediaEntry> = entries.iter().filter(|e| e.is_video()).collect();

        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "dry_run",
                    "package": package.display().to_string(),
                    "media_entries": entries,
                    "videos": videos.len(),
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                self.print_header(&format!("Dry run: {}", package.display()));
                for entry in entries {
                    let kind = entry.kind.map(|k| k.mime).unwrap_or("unknown");
                    let marker = if entry.is_video() { "*" } else { " " };
                    println!(
                        "{} {:<40} {:>10}  {}",
                        marker,
                        entry.name,
                        format_bytes(entry.size),
                        kind
                    );
                }
                println!();
                println!(
                    "{} of {} media entries would be extracted",
                    videos.len(),
                    entries.len()
                );
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{}{}", FILM, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        println!();
        self.print_separator();

        match report.outcome {
            RunOutcome::Completed if report.has_errors() => {
                self.print_human_message(MessageType::Warning, "Extraction completed with errors")
            }
            RunOutcome::Completed => {
                self.print_human_message(MessageType::Success, "Extraction completed!")
            }
            RunOutcome::Aborted { ref message, .. } => self.print_human_message(
                MessageType::Error,
                &format!("Extraction aborted: {}", message),
            ),
        }

        println!();
        println!(
            "  Videos extracted: {}",
            self.highlight(report.videos_extracted().to_string())
        );
        println!(
            "  Total size:       {}",
            self.highlight(format_bytes(report.total_bytes()))
        );
        println!(
            "  Media scanned:    {} of {} package entries",
            report.media_entries, report.archive_entries
        );
        println!(
            "  Time taken:       {}",
            self.highlight(format_duration(report.duration))
        );
        if report.has_errors() {
            println!("  Errors:           {}", report.errors.len());
        }

        if let Some(ref dir) = report.output_directory {
            println!();
            println!("  {}{}", FOLDER, dir.display());
        }

        for video in &report.videos {
            if video.was_renamed() {
                println!(
                    "    {} (from {}, {})",
                    video.file_name,
                    video.source_name,
                    format_bytes(video.size)
                );
            } else {
                println!("    {} ({})", video.file_name, format_bytes(video.size));
            }
        }

        self.print_separator();

        if report.has_errors() && self.verbose_level == 0 {
            println!("Run with --show-errors to see the error details.");
        }
    }

    fn print_plain_report(&self, report: &ExtractionReport) {
        match report.outcome {
            RunOutcome::Completed => println!("REPORT: Extraction completed"),
            RunOutcome::Aborted { ref message, .. } => {
                println!("REPORT: Extraction aborted: {}", message)
            }
        }
        println!("Package: {}", report.package.display());
        if let Some(ref dir) = report.output_directory {
            println!("Output: {}", dir.display());
        }
        println!("Videos: {}", report.videos_extracted());
        for video in &report.videos {
            println!("Video: {} {} {}", video.file_name, video.size, video.mime);
        }
        println!("Size: {} bytes", report.total_bytes());
        println!("Duration: {:?}", report.duration);

        if report.has_errors() {
            println!("Errors: {}", report.errors.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode(), OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
        assert!(!formatter.is_quiet());
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.is_quiet());
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(2));
        assert!(!formatter.should_show_message(3));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
