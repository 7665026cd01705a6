pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, OutputConfig};
pub use error::{ErrorRecorder, Result, UserFriendlyError, VidError};

// Core functionality re-exports
pub use archive::{MediaExtraction, MediaReader, PackageMediaEntry, UnpackProgress};
pub use extractor::{
    dedupe, AbortKind, ExtractedVideo, ExtractionReport, FileOperations, OutputManager, RunOutcome,
};
pub use pipeline::{ChannelSink, NullSink, Orchestrator, ProgressSink, RunEvent, RunPhase};
pub use scanner::{FileKind, MediaEntry, MediaScanner, VideoFilter};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tokio::sync::mpsc;
use tokio::task;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const COMPLETED_WITH_ERRORS: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const ARCHIVE: i32 = 4;
    pub const MEDIA_DIRECTORY_MISSING: i32 = 5;
    pub const CONFIG: i32 = 6;
    pub const CANCELLED: i32 = 130;
}

/// Main library interface for pptxvid
pub struct PptxVid {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl PptxVid {
    /// Create a new instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance for testing (no signal handler conflicts)
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            cli_args.output_format.into(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.config.clone()).with_shutdown(self.shutdown.clone())
    }

    /// Extract the videos of `package` on a blocking worker while the
    /// progress bar follows the run's events.
    pub async fn extract(&self, package: &Path) -> Result<ExtractionReport> {
        self.shutdown.check_shutdown()?;

        let orchestrator = self.orchestrator();
        orchestrator.validate_input(package)?;

        self.output_formatter
            .start_operation(&format!("Extracting videos from {}", package.display()));

        let mut progress = ui::RunProgress::new(self.progress_manager.create_run_progress());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let package = package.to_path_buf();

        let worker = task::spawn_blocking(move || orchestrator.run(&package, &ChannelSink(tx)));

        while let Some(event) = rx.recv().await {
            progress.apply(&event);
        }

        let report = worker.await.map_err(|e| VidError::Unexpected {
            message: format!("Extraction worker failed: {}", e),
        })??;

        progress.finish_with_summary(&report.summary_line(), report.duration);

        Ok(report)
    }

    /// Media entries of `package` with their detected types, for dry runs.
    pub fn plan(&self, package: &Path) -> Result<Vec<PackageMediaEntry>> {
        self.orchestrator().validate_input(package)?;

        let spinner = self.progress_manager.create_spinner("Inspecting package...");
        let entries = MediaReader::new(self.config.extraction.media_prefix.as_str()).inspect(package);
        spinner.finish_and_clear();

        entries
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &VidError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Exit code for a run that produced a report.
pub fn report_exit_code(report: &ExtractionReport) -> i32 {
    match report.outcome.abort_kind() {
        None if report.has_errors() => exit_code::COMPLETED_WITH_ERRORS,
        None => exit_code::SUCCESS,
        Some(AbortKind::Archive) => exit_code::ARCHIVE,
        Some(AbortKind::MissingMediaDirectory) => exit_code::MEDIA_DIRECTORY_MISSING,
        Some(AbortKind::Cancelled) => exit_code::CANCELLED,
        Some(AbortKind::Unexpected) => exit_code::GENERAL,
    }
}

/// Exit code for a failure that prevented a run.
pub fn error_exit_code(error: &VidError) -> i32 {
    match error {
        VidError::InvalidInput { .. } => exit_code::INVALID_INPUT,
        VidError::Archive { .. } => exit_code::ARCHIVE,
        VidError::MediaDirectoryNotFound { .. } => exit_code::MEDIA_DIRECTORY_MISSING,
        VidError::Config { .. } => exit_code::CONFIG,
        VidError::Cancelled => exit_code::CANCELLED,
        _ => exit_code::GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::media_reader::test_support::{write_package, MP4_BYTES, PNG_BYTES};
    use tempfile::TempDir;

    fn test_instance(temp_dir: &TempDir) -> PptxVid {
        let mut config = Config::default();
        config.output.base_directory = temp_dir.path().join("out");
        config.extraction.scratch_root = Some(temp_dir.path().join("scratch"));
        PptxVid::new_for_test(config, OutputMode::Plain, 0, true)
    }

    #[tokio::test]
    async fn test_extract_runs_on_worker() {
        let temp_dir = TempDir::new().unwrap();
        let package = temp_dir.path().join("deck.pptx");
        write_package(
            &package,
            &[("ppt/media/a.png", PNG_BYTES), ("ppt/media/b.mp4", MP4_BYTES)],
        );

        let app = test_instance(&temp_dir);
        let report = app.extract(&package).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.videos_extracted(), 1);
        assert_eq!(report_exit_code(&report), exit_code::SUCCESS);
    }

    #[tokio::test]
    async fn test_extract_rejects_wrong_extension() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_instance(&temp_dir);

        let error = app
            .extract(&temp_dir.path().join("notes.docx"))
            .await
            .unwrap_err();
        assert_eq!(error_exit_code(&error), exit_code::INVALID_INPUT);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_cancelled_extract_never_starts() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_instance(&temp_dir);
        app.request_shutdown();

        let error = app
            .extract(&temp_dir.path().join("deck.pptx"))
            .await
            .unwrap_err();
        assert!(matches!(error, VidError::Cancelled));
        assert!(!app.is_running());
    }

    #[test]
    fn test_plan_lists_media() {
        let temp_dir = TempDir::new().unwrap();
        let package = temp_dir.path().join("deck.pptx");
        write_package(
            &package,
            &[("ppt/media/a.png", PNG_BYTES), ("ppt/media/b.mp4", MP4_BYTES)],
        );

        let entries = test_instance(&temp_dir).plan(&package).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.iter().filter(|e| e.is_video()).count(), 1);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        PptxVid::generate_sample_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extraction]"));
        assert!(content.contains("[output]"));
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(
            error_exit_code(&VidError::Config {
                message: "bad".to_string()
            }),
            exit_code::CONFIG
        );
        assert_eq!(error_exit_code(&VidError::Cancelled), exit_code::CANCELLED);
        assert_eq!(
            error_exit_code(&VidError::Unexpected {
                message: "boom".to_string()
            }),
            exit_code::GENERAL
        );
    }
}
