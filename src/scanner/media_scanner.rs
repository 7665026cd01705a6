use crate::error::{Result, VidError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file found in the extracted media directory.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl MediaEntry {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            file_name,
            size,
        }
    }
}

#[derive(Debug, Default)]
pub struct MediaListing {
    pub entries: Vec<MediaEntry>,
    /// Entries the walker could not read
    pub errors: Vec<String>,
}

impl MediaListing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lists the immediate children of a media directory in file-system order.
#[derive(Debug, Default)]
pub struct MediaScanner;

impl MediaScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan<P: AsRef<Path>>(&self, media_dir: P) -> Result<MediaListing> {
        let media_dir = media_dir.as_ref();

        if !media_dir.is_dir() {
            return Err(VidError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", media_dir.display()),
            )));
        }

        let mut listing = MediaListing::default();

        // Directories are listed too; classification reports them as unreadable
        let walker = WalkDir::new(media_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        listing.errors.push(format!("Permission denied: {}", err));
                    } else {
                        listing.errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            listing
                .entries
                .push(MediaEntry::new(entry.into_path(), size));
        }

        log::debug!(
            "Found {} entries in {}",
            listing.entries.len(),
            media_dir.display()
        );

        Ok(listing)
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_media_entry_creation() {
        let entry = MediaEntry::new(PathBuf::from("/scratch/ppt/media/media1.mp4"), 2048);
        assert_eq!(entry.file_name, "media1.mp4");
        assert_eq!(entry.size, 2048);
    }

    #[test]
    fn test_scan_lists_direct_children_only() {
        let temp_dir = TempDir::new().unwrap();
        let media = temp_dir.path().join("media");
        fs::create_dir_all(media.join("nested")).unwrap();
        fs::write(media.join("image1.png"), b"png").unwrap();
        fs::write(media.join("media1.mp4"), b"mp4").unwrap();
        fs::write(media.join("nested").join("deep.mp4"), b"mp4").unwrap();

        let listing = MediaScanner::new().scan(&media).unwrap();

        let mut names: Vec<_> = listing.entries.iter().map(|e| e.file_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["image1.png", "media1.mp4", "nested"]);
        assert!(listing.errors.is_empty());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let listing = MediaScanner::new().scan(temp_dir.path()).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.len(), 0);
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = MediaScanner::new().scan(temp_dir.path().join("absent"));
        assert!(result.is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
