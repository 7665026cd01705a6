//! The extraction run: validate, unpack, classify, copy, report, clean up.
//!
//! Each call to [`Orchestrator::run`] owns a fresh [`RunContext`] and its own
//! scratch directory, so runs never share mutable state. Progress and status
//! updates are pushed to a [`ProgressSink`] as they happen.

use crate::archive::MediaReader;
use crate::config::Config;
use crate::error::{ErrorRecorder, Result, VidError};
use crate::extractor::{
    dedupe, AbortKind, ExtractedVideo, ExtractionReport, FileOperations, OutputManager, RunOutcome,
};
use crate::scanner::{MediaScanner, VideoFilter};
use crate::ui::GracefulShutdown;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedSender;

/// Share of the progress range given to unpacking; copying gets the rest.
const UNPACK_SHARE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Validating,
    Resetting,
    Unpacking,
    Scanning,
    Copying,
    Reporting,
    Cleanup,
}

impl RunPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Validating => "validating",
            RunPhase::Resetting => "resetting",
            RunPhase::Unpacking => "unpacking",
            RunPhase::Scanning => "scanning",
            RunPhase::Copying => "copying",
            RunPhase::Reporting => "reporting",
            RunPhase::Cleanup => "cleanup",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Phase(RunPhase),
    Progress { percent: f64, status: String },
    VideoExtracted { file_name: String },
    Error(String),
}

/// Receiver of run events. Closures and channel senders both qualify.
pub trait ProgressSink {
    fn emit(&self, event: RunEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(RunEvent),
{
    fn emit(&self, event: RunEvent) {
        self(event)
    }
}

/// Forwards events to an async receiver. A closed receiver drops them.
pub struct ChannelSink(pub UnboundedSender<RunEvent>);

impl ProgressSink for ChannelSink {
    fn emit(&self, event: RunEvent) {
        let _ = self.0.send(event);
    }
}

pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}

/// Mutable state of one run.
pub struct RunContext<'a> {
    sink: &'a dyn ProgressSink,
    pub phase: RunPhase,
    pub progress: f64,
    pub status: String,
    pub output_directory: Option<PathBuf>,
    pub errors: Vec<String>,
    pub videos: Vec<ExtractedVideo>,
    pub archive_entries: usize,
    pub media_entries: usize,
    pub started_at: DateTime<Local>,
    started: Instant,
}

impl<'a> RunContext<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            phase: RunPhase::Idle,
            progress: 0.0,
            status: "Starting...".to_string(),
            output_directory: None,
            errors: Vec::new(),
            videos: Vec::new(),
            archive_entries: 0,
            media_entries: 0,
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    pub fn enter(&mut self, phase: RunPhase) {
        log::info!("Entering {} phase", phase.label());
        self.phase = phase;
        self.sink.emit(RunEvent::Phase(phase));
    }

    pub fn update<S: Into<String>>(&mut self, percent: f64, status: S) {
        self.progress = percent.clamp(0.0, 100.0);
        self.status = status.into();
        self.sink.emit(RunEvent::Progress {
            percent: self.progress,
            status: self.status.clone(),
        });
    }

    fn add_video(&mut self, video: ExtractedVideo) {
        self.sink.emit(RunEvent::VideoExtracted {
            file_name: video.file_name.clone(),
        });
        self.videos.push(video);
    }

    fn into_report(self, package: &Path, outcome: RunOutcome) -> ExtractionReport {
        ExtractionReport {
            package: package.to_path_buf(),
            output_directory: self.output_directory,
            outcome,
            videos: self.videos,
            archive_entries: self.archive_entries,
            media_entries: self.media_entries,
            errors: self.errors,
            started_at: self.started_at,
            duration: self.started.elapsed(),
        }
    }
}

impl ErrorRecorder for RunContext<'_> {
    fn record(&mut self, message: String) {
        self.sink.emit(RunEvent::Error(message.clone()));
        self.errors.push(message);
    }
}

pub struct Orchestrator {
    config: Config,
    shutdown: Option<GracefulShutdown>,
    file_operations: FileOperations,
    video_filter: VideoFilter,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shutdown: None,
            file_operations: FileOperations::new(),
            video_filter: VideoFilter::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reject anything that does not carry a package extension.
    pub fn validate_input(&self, package: &Path) -> Result<()> {
        if self.config.is_package_path(package) {
            Ok(())
        } else {
            Err(VidError::InvalidInput {
                path: package.display().to_string(),
                expected: self.config.extraction.package_extensions.clone(),
            })
        }
    }

    /// Extract the videos of one package. Only invalid input is returned as
    /// an error; every other failure ends up in the report's outcome.
    pub fn run(&self, package: &Path, sink: &dyn ProgressSink) -> Result<ExtractionReport> {
        sink.emit(RunEvent::Phase(RunPhase::Validating));
        self.validate_input(package)?;

        let mut ctx = RunContext::new(sink);
        let mut scratch: Option<TempDir> = None;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execute(package, &mut ctx, &mut scratch)
        }));

        let outcome = match result {
            Ok(Ok(())) => RunOutcome::Completed,
            Ok(Err(error)) => {
                let outcome = RunOutcome::from_error(&error);
                if outcome.abort_kind() == Some(AbortKind::Unexpected) {
                    log::error!("Unexpected failure while extracting: {:?}", error);
                } else {
                    log::error!("Run aborted: {}", error);
                }
                ctx.record(error.to_string());
                outcome
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Extraction panicked: {}", message);
                let error = VidError::Unexpected { message };
                ctx.record(error.to_string());
                RunOutcome::from_error(&error)
            }
        };

        ctx.enter(RunPhase::Reporting);
        ctx.enter(RunPhase::Cleanup);
        if let Some(dir) = scratch.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                log::debug!("Could not remove scratch directory {}: {}", path.display(), e);
            }
        }
        ctx.update(0.0, "Ready");
        ctx.enter(RunPhase::Idle);

        Ok(ctx.into_report(package, outcome))
    }

    fn execute(
        &self,
        package: &Path,
        ctx: &mut RunContext<'_>,
        scratch: &mut Option<TempDir>,
    ) -> Result<()> {
        ctx.enter(RunPhase::Resetting);
        ctx.update(0.0, "Starting...");

        let output_dir = OutputManager::from_config(&self.config).create_run_directory()?;
        ctx.output_directory = Some(output_dir.clone());

        let scratch_dir = self.create_scratch_dir()?;
        let scratch_path = scratch_dir.path().to_path_buf();
        *scratch = Some(scratch_dir);

        ctx.enter(RunPhase::Unpacking);
        let mut reader = MediaReader::new(self.config.extraction.media_prefix.as_str());
        if let Some(ref shutdown) = self.shutdown {
            reader = reader.with_shutdown(shutdown.clone());
        }

        let extraction = reader.extract_media(package, &scratch_path, |p| {
            ctx.update(
                UNPACK_SHARE * p.fraction(),
                format!(
                    "Unpacking package... ({}/{})",
                    p.entries_processed, p.total_entries
                ),
            );
        })?;
        ctx.archive_entries = extraction.total_entries;

        ctx.enter(RunPhase::Scanning);
        if !extraction.media_dir.is_dir() {
            return Err(VidError::MediaDirectoryNotFound {
                prefix: reader.prefix().to_string(),
            });
        }

        let listing = MediaScanner::new().scan(&extraction.media_dir)?;
        for error in listing.errors {
            ctx.record(error);
        }
        ctx.media_entries = listing.entries.len();

        ctx.enter(RunPhase::Copying);
        let total = listing.entries.len();
        if total == 0 {
            ctx.update(100.0, "No media files found");
            return Ok(());
        }

        for (index, entry) in listing.entries.iter().enumerate() {
            if let Some(ref shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            if let Some(kind) = self.video_filter.video_kind(&entry.path, ctx) {
                let file_name = dedupe(&output_dir, &entry.file_name);
                match self
                    .file_operations
                    .copy_video(entry, kind, &output_dir, &file_name)
                {
                    Ok(video) => {
                        log::debug!("Copied {} as {}", entry.file_name, video.file_name);
                        ctx.add_video(video);
                    }
                    Err(error) => {
                        log::warn!("{}", error);
                        ctx.record(error.to_string());
                    }
                }
            }

            let done = index + 1;
            ctx.update(
                UNPACK_SHARE + (100.0 - UNPACK_SHARE) * done as f64 / total as f64,
                format!("Processing media files... ({}/{})", done, total),
            );
        }

        Ok(())
    }

    fn create_scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pptxvid-");

        let dir = match self.config.extraction.scratch_root {
            Some(ref root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        log::debug!("Scratch directory {}", dir.path().display());
        Ok(dir)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
