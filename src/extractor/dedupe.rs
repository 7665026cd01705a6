use std::path::Path;

/// Split `filename` into base and extension, the extension keeping its dot.
/// A dot that is only preceded by other dots does not start an extension,
/// so `.hidden` has none.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) if filename[..dot].chars().any(|c| c != '.') => filename.split_at(dot),
        _ => (filename, ""),
    }
}

/// A name for `filename` that does not yet exist in `output_dir`:
/// the name itself when free, otherwise `base(n)ext` for the smallest
/// free `n` starting at 1. Nothing is created or reserved.
pub fn dedupe(output_dir: &Path, filename: &str) -> String {
    if !exists(output_dir, filename) {
        return filename.to_string();
    }

    let (base, ext) = split_extension(filename);
    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}({}){}", base, counter, ext);
        if !exists(output_dir, &candidate) {
            log::debug!("{} already exists, using {}", filename, candidate);
            return candidate;
        }
        counter += 1;
    }
}

fn exists(dir: &Path, name: &str) -> bool {
    // Dangling symlinks count as taken
    dir.join(name).symlink_metadata().is_ok()
}
