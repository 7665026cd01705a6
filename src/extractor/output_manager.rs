use crate::config::Config;
use crate::error::{Result, VidError};
use crate::extractor::ExtractedVideo;
use crate::scanner::media_scanner::format_bytes;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Why a run stopped before processing every media entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortKind {
    Archive,
    MissingMediaDirectory,
    Cancelled,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Aborted { kind: AbortKind, message: String },
}

impl RunOutcome {
    /// Classify a fatal error into an abort outcome.
    pub fn from_error(error: &VidError) -> Self {
        let kind = match error {
            VidError::Archive { .. } => AbortKind::Archive,
            VidError::MediaDirectoryNotFound { .. } => AbortKind::MissingMediaDirectory,
            VidError::Cancelled => AbortKind::Cancelled,
            _ => AbortKind::Unexpected,
        };

        RunOutcome::Aborted {
            kind,
            message: error.to_string(),
        }
    }

    pub fn abort_kind(&self) -> Option<AbortKind> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::Aborted { kind, .. } => Some(*kind),
        }
    }
}

/// Everything a finished run has to say about itself.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub package: PathBuf,
    pub output_directory: Option<PathBuf>,
    pub outcome: RunOutcome,
    pub videos: Vec<ExtractedVideo>,
    pub archive_entries: usize,
    pub media_entries: usize,
    pub errors: Vec<String>,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
}

impl ExtractionReport {
    pub fn videos_extracted(&self) -> usize {
        self.videos.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.videos.iter().map(|v| v.size).sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All recorded errors separated by blank lines.
    pub fn error_details(&self) -> String {
        self.errors.join("\n\n")
    }

    /// Completed with nothing recorded in the error log.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && self.errors.is_empty()
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} video(s) extracted ({})",
            self.videos_extracted(),
            format_bytes(self.total_bytes())
        );
        if self.has_errors() {
            let _ = write!(line, ", {} error(s)", self.errors.len());
        }
        line
    }
}

/// Creates the timestamped directory each run writes into.
pub struct OutputManager {
    base_path: PathBuf,
    prefix: String,
    timestamp_format: String,
}

impl OutputManager {
    pub fn new<P, S, F>(base_path: P, prefix: S, timestamp_format: F) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
        F: Into<String>,
    {
        Self {
            base_path: base_path.into(),
            prefix: prefix.into(),
            timestamp_format: timestamp_format.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output.base_directory.clone(),
            config.output.directory_prefix.clone(),
            config.output.timestamp_format.clone(),
        )
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `<prefix>_<timestamp>` for the given instant.
    pub fn directory_name(&self, now: DateTime<Local>) -> Result<String> {
        let mut name = format!("{}_", self.prefix);
        write!(name, "{}", now.format(&self.timestamp_format)).map_err(|_| VidError::Config {
            message: format!("Invalid timestamp format: {:?}", self.timestamp_format),
        })?;
        Ok(name)
    }

    /// Create a fresh, empty directory for this run. When the timestamped
    /// name is taken, `_2`, `_3`, ... are tried in turn.
    pub fn create_run_directory(&self) -> Result<PathBuf> {
        self.create_run_directory_at(Local::now())
    }

    pub fn create_run_directory_at(&self, now: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_path)?;

        let name = self.directory_name(now)?;
        let mut candidate = self.base_path.join(&name);
        let mut suffix = 2;

        loop {
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    log::info!("Created output directory {}", candidate.display());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = self.base_path.join(format!("{}_{}", name, suffix));
                    suffix += 1;
                }
                Err(e) => return Err(VidError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn manager(base: &Path) -> OutputManager {
        OutputManager::new(base, "PPTX_Videos", "%Y%m%d_%H%M%S")
    }

    fn report(outcome: RunOutcome, errors: Vec<String>) -> ExtractionReport {
        ExtractionReport {
            package: PathBuf::from("deck.pptx"),
            output_directory: None,
            outcome,
            videos: Vec::new(),
            archive_entries: 0,
            media_entries: 0,
            errors,
            started_at: fixed_time(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_directory_name() {
        let temp_dir = TempDir::new().unwrap();
        let name = manager(temp_dir.path()).directory_name(fixed_time()).unwrap();
        assert_eq!(name, "PPTX_Videos_20240309_140507");
    }

    #[test]
    fn test_invalid_timestamp_format() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path(), "Clips", "%Q");
        assert!(matches!(
            manager.directory_name(fixed_time()),
            Err(VidError::Config { .. })
        ));
    }

    #[test]
    fn test_same_second_runs_get_distinct_directories() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());

        let first = manager.create_run_directory_at(fixed_time()).unwrap();
        let second = manager.create_run_directory_at(fixed_time()).unwrap();
        let third = manager.create_run_directory_at(fixed_time()).unwrap();

        assert_eq!(first, temp_dir.path().join("PPTX_Videos_20240309_140507"));
        assert_eq!(second, temp_dir.path().join("PPTX_Videos_20240309_140507_2"));
        assert_eq!(third, temp_dir.path().join("PPTX_Videos_20240309_140507_3"));
        assert!(first.is_dir() && second.is_dir() && third.is_dir());
    }

    #[test]
    fn test_base_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("out");
        let dir = manager(&base).create_run_directory().unwrap();
        assert!(dir.starts_with(&base));
        assert!(fs::read_dir(&dir).unwrap().next().is_none());
    }

    #[test]
    fn test_outcome_from_error() {
        let archive = VidError::Archive {
            message: "bad".to_string(),
        };
        assert_eq!(
            RunOutcome::from_error(&archive).abort_kind(),
            Some(AbortKind::Archive)
        );
        assert_eq!(
            RunOutcome::from_error(&VidError::Cancelled).abort_kind(),
            Some(AbortKind::Cancelled)
        );
        let odd = VidError::Unexpected {
            message: "boom".to_string(),
        };
        assert_eq!(
            RunOutcome::from_error(&odd).abort_kind(),
            Some(AbortKind::Unexpected)
        );
        assert_eq!(RunOutcome::Completed.abort_kind(), None);
    }

    #[test]
    fn test_error_details_and_success() {
        let clean = report(RunOutcome::Completed, Vec::new());
        assert!(clean.is_success());
        assert_eq!(clean.summary_line(), "0 video(s) extracted (0 B)");

        let noisy = report(
            RunOutcome::Completed,
            vec!["first".to_string(), "second".to_string()],
        );
        assert!(!noisy.is_success());
        assert_eq!(noisy.error_details(), "first\n\nsecond");
        assert!(noisy.summary_line().ends_with("2 error(s)"));
    }

    #[test]
    fn test_report_serializes_outcome_tag() {
        let aborted = report(
            RunOutcome::from_error(&VidError::MediaDirectoryNotFound {
                prefix: "ppt/media/".to_string(),
            }),
            vec!["Media directory not found in package: ppt/media/".to_string()],
        );
        let json = serde_json::to_value(&aborted).unwrap();
        assert_eq!(json["outcome"]["status"], "aborted");
        assert_eq!(json["outcome"]["kind"], "missing_media_directory");
    }
}
