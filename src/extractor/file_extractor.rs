use crate::error::{Result, VidError};
use crate::scanner::{FileKind, MediaEntry};
use filetime::FileTime;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// A video copied into the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedVideo {
    /// Name of the entry inside the package
    pub source_name: String,
    /// Name in the output directory, after deduplication
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub mime: &'static str,
}

impl ExtractedVideo {
    pub fn was_renamed(&self) -> bool {
        self.source_name != self.file_name
    }
}

pub struct FileOperations {
    buffer_size: usize,
}

impl FileOperations {
    pub fn new() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    /// Copy `entry` to `output_dir/file_name`. The destination must not exist.
    pub fn copy_video(
        &self,
        entry: &MediaEntry,
        kind: FileKind,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<ExtractedVideo> {
        let dest = output_dir.join(file_name);

        let size = self
            .copy_with_times(&entry.path, &dest)
            .map_err(|source| VidError::Copy {
                filename: entry.file_name.clone(),
                source,
            })?;

        Ok(ExtractedVideo {
            source_name: entry.file_name.clone(),
            file_name: file_name.to_string(),
            path: dest,
            size,
            mime: kind.mime,
        })
    }

    /// Content, permissions, then access and modification times.
    fn copy_with_times(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let source_file = fs::File::open(source)?;
        let metadata = source_file.metadata()?;

        let dest_file = OpenOptions::new().write(true).create_new(true).open(dest)?;

        let mut reader = BufReader::with_capacity(self.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192]; // 8KB chunks

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }

        writer.flush()?;
        drop(writer);

        fs::set_permissions(dest, metadata.permissions())?;

        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_times(dest, atime, mtime)?;

        Ok(total_bytes)
    }
}

impl Default for FileOperations {
    fn default() -> Self {
        Self::new()
    }
}
