use crate::error::{Result, VidError};
use std::path::Path;
use std::process::{Command, Stdio};

/// The host's "open this folder" program.
pub fn file_browser_program() -> &'static str {
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let program = "xdg-open";

    program
}

/// Show `dir` in the desktop file browser without waiting for it to close.
pub fn open_in_file_browser(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(VidError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let program = file_browser_program();
    log::debug!("Opening {} with {}", dir.display(), program);

    Command::new(program)
        .arg(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| VidError::Unexpected {
            message: format!("Failed to launch {}: {}", program, e),
        })?;

    Ok(())
}
