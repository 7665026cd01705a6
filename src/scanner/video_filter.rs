use crate::error::{ErrorRecorder, Result, VidError};
use crate::scanner::signature::{self, FileKind, SNIFF_LEN};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Decides whether a media file is a video by looking at its content.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoFilter;

impl VideoFilter {
    pub fn new() -> Self {
        Self
    }

    /// Detect the type of the file at `path` from its leading bytes.
    pub fn detect(&self, path: &Path) -> Result<Option<FileKind>> {
        let classification_error = |source: std::io::Error| VidError::Classification {
            filename: display_name(path),
            source,
        };

        let file = File::open(path).map_err(classification_error)?;
        let mut header = Vec::with_capacity(SNIFF_LEN);
        file.take(SNIFF_LEN as u64)
            .read_to_end(&mut header)
            .map_err(classification_error)?;

        Ok(signature::sniff(&header))
    }

    /// The detected kind when the file is a video. Detection failures are
    /// recorded under the file's base name and treated as "not a video".
    pub fn video_kind<E: ErrorRecorder + ?Sized>(
        &self,
        path: &Path,
        errors: &mut E,
    ) -> Option<FileKind> {
        match self.detect(path) {
            Ok(Some(kind)) if kind.is_video() => Some(kind),
            Ok(Some(kind)) => {
                log::debug!("{} detected as {}, skipping", display_name(path), kind.mime);
                None
            }
            Ok(None) => {
                log::debug!("{} has no recognised signature", display_name(path));
                None
            }
            Err(err) => {
                log::warn!("{}", err);
                errors.record(err.to_string());
                None
            }
        }
    }

    pub fn is_video<E: ErrorRecorder + ?Sized>(&self, path: &Path, errors: &mut E) -> bool {
        self.video_kind(path, errors).is_some()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
