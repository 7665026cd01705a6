use crate::error::{Result, VidError};
use crate::scanner::signature::{self, FileKind, SNIFF_LEN};
use crate::ui::GracefulShutdown;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone)]
pub struct UnpackProgress {
    pub entries_processed: usize,
    pub total_entries: usize,
}

impl UnpackProgress {
    pub fn fraction(&self) -> f64 {
        if self.total_entries == 0 {
            1.0
        } else {
            self.entries_processed as f64 / self.total_entries as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaExtraction {
    pub total_entries: usize,
    pub media_entries: usize,
    /// Where the media directory lands inside the scratch tree
    pub media_dir: PathBuf,
}

/// A media entry as stored in the package, read without unpacking.
#[derive(Debug, Clone, Serialize)]
pub struct PackageMediaEntry {
    pub name: String,
    pub size: u64,
    pub kind: Option<FileKind>,
}

impl PackageMediaEntry {
    pub fn is_video(&self) -> bool {
        self.kind.is_some_and(|k| k.is_video())
    }

    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Unpacks the media folder of a ZIP-based package.
pub struct MediaReader {
    prefix: String,
    shutdown: Option<GracefulShutdown>,
}

impl MediaReader {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn media_dir(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(self.prefix.trim_end_matches('/'))
    }

    /// Extract every entry under the media prefix into `scratch_dir`,
    /// keeping its path inside the package. `on_progress` is called after
    /// each entry, media or not.
    pub fn extract_media<F>(
        &self,
        package: &Path,
        scratch_dir: &Path,
        mut on_progress: F,
    ) -> Result<MediaExtraction>
    where
        F: FnMut(&UnpackProgress),
    {
        let mut archive = open_archive(package)?;
        let total_entries = archive.len();
        let mut media_entries = 0;

        fs::create_dir_all(scratch_dir).map_err(|e| archive_io_error(scratch_dir, e))?;

        for index in 0..total_entries {
            if let Some(ref shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if name.starts_with(&self.prefix) {
                let relative = entry.enclosed_name().ok_or_else(|| VidError::Archive {
                    message: format!("unsafe entry path: {}", name),
                })?;
                let target = scratch_dir.join(relative);

                if entry.is_dir() {
                    fs::create_dir_all(&target).map_err(|e| archive_io_error(&target, e))?;
                } else {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| archive_io_error(parent, e))?;
                    }

                    let mut output =
                        File::create(&target).map_err(|e| archive_io_error(&target, e))?;
                    io::copy(&mut entry, &mut output).map_err(|e| VidError::Archive {
                        message: format!("failed to unpack {}: {}", name, e),
                    })?;
                    media_entries += 1;
                    log::debug!("Unpacked {} ({} bytes)", name, entry.size());
                }
            }

            on_progress(&UnpackProgress {
                entries_processed: index + 1,
                total_entries,
            });
        }

        log::info!(
            "Unpacked {} media entries out of {} in {}",
            media_entries,
            total_entries,
            package.display()
        );

        Ok(MediaExtraction {
            total_entries,
            media_entries,
            media_dir: self.media_dir(scratch_dir),
        })
    }

    /// List media entries and sniff their content straight from the package.
    pub fn inspect(&self, package: &Path) -> Result<Vec<PackageMediaEntry>> {
        let mut archive = open_archive(package)?;
        let mut entries = Vec::new();

        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if entry.is_dir() || !entry.name().starts_with(&self.prefix) {
                continue;
            }

            let name = entry.name().to_string();
            let size = entry.size();

            let mut header = Vec::with_capacity(SNIFF_LEN);
            entry
                .take(SNIFF_LEN as u64)
                .read_to_end(&mut header)
                .map_err(|e| VidError::Archive {
                    message: format!("failed to read {}: {}", name, e),
                })?;

            entries.push(PackageMediaEntry {
                name,
                size,
                kind: signature::sniff(&header),
            });
        }

        Ok(entries)
    }
}

fn open_archive(package: &Path) -> Result<ZipArchive<impl Read + Seek>> {
    let file = File::open(package).map_err(|e| archive_io_error(package, e))?;
    let archive = ZipArchive::new(BufReader::new(file))?;
    Ok(archive)
}

fn archive_io_error(path: &Path, error: io::Error) -> VidError {
    VidError::Archive {
        message: format!("{}: {}", path.display(), error),
    }
}
