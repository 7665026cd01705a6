use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const MP4_BYTES: &[u8] =
    b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2\x00\x00\x00\x08free\x00\x00\x00\x10mdat";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

fn write_package(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

fn pptxvid(workspace: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pptxvid").unwrap();
    cmd.arg("--output-dir")
        .arg(workspace.path().join("out"))
        .arg("--scratch-dir")
        .arg(workspace.path().join("scratch"))
        .arg("--output-format")
        .arg("plain");
    cmd
}

fn run_directories(workspace: &TempDir) -> Vec<PathBuf> {
    let out = workspace.path().join("out");
    if !out.exists() {
        return Vec::new();
    }
    fs::read_dir(out).unwrap().map(|e| e.unwrap().path()).collect()
}

#[test]
fn extracts_videos_into_timestamped_directory() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("talk.pptx");
    write_package(
        &package,
        &[
            ("ppt/slides/slide1.xml", b"<p:sld/>"),
            ("ppt/media/image1.png", PNG_BYTES),
            ("ppt/media/media1.mp4", MP4_BYTES),
        ],
    );

    pptxvid(&workspace)
        .arg(&package)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Videos: 1"))
        .stdout(predicate::str::contains("media1.mp4"));

    let dirs = run_directories(&workspace);
    assert_eq!(dirs.len(), 1);
    let name = dirs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("PPTX_Videos_"));
    assert!(dirs[0].join("media1.mp4").is_file());
    assert!(!dirs[0].join("image1.png").exists());
}

#[test]
fn custom_prefix_names_the_directory() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("talk.pptx");
    write_package(&package, &[("ppt/media/media1.mp4", MP4_BYTES)]);

    pptxvid(&workspace)
        .arg(&package)
        .arg("--prefix")
        .arg("Keynote")
        .assert()
        .code(0);

    let dirs = run_directories(&workspace);
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Keynote_"));
}

#[test]
fn wrong_extension_is_rejected_before_anything_is_created() {
    let workspace = TempDir::new().unwrap();
    let document = workspace.path().join("notes.docx");
    fs::write(&document, b"not a presentation").unwrap();

    pptxvid(&workspace)
        .arg(&document)
        .assert()
        .code(3)
        .stderr(predicate::str::contains(".pptx"));

    assert!(!workspace.path().join("out").exists());
    assert!(!workspace.path().join("scratch").exists());
}

#[test]
fn missing_media_directory_leaves_empty_output() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("text-only.pptx");
    write_package(&package, &[("ppt/slides/slide1.xml", b"<p:sld/>")]);

    pptxvid(&workspace)
        .arg(&package)
        .arg("--show-errors")
        .assert()
        .code(5)
        .stdout(predicate::str::contains("Media directory not found"));

    let dirs = run_directories(&workspace);
    assert_eq!(dirs.len(), 1);
    assert_eq!(fs::read_dir(&dirs[0]).unwrap().count(), 0);
}

#[test]
fn corrupt_package_reports_archive_error() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("broken.pptx");
    fs::write(&package, b"PK but not really").unwrap();

    pptxvid(&workspace).arg(&package).assert().code(4);

    let scratch = workspace.path().join("scratch");
    assert!(!scratch.exists() || fs::read_dir(&scratch).unwrap().count() == 0);
}

#[test]
fn dry_run_lists_without_copying() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("talk.pptx");
    write_package(
        &package,
        &[
            ("ppt/media/image1.png", PNG_BYTES),
            ("ppt/media/media1.mp4", MP4_BYTES),
        ],
    );

    pptxvid(&workspace)
        .arg(&package)
        .arg("--dry-run")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("ppt/media/media1.mp4"))
        .stdout(predicate::str::contains("1 of 2 media entries would be extracted"));

    assert!(run_directories(&workspace).is_empty());
}

#[test]
fn json_output_is_machine_readable() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("talk.pptx");
    write_package(&package, &[("ppt/media/media1.mp4", MP4_BYTES)]);

    let output = Command::cargo_bin("pptxvid")
        .unwrap()
        .arg(&package)
        .arg("--output-dir")
        .arg(workspace.path().join("out"))
        .arg("--output-format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["status"], "completed");
    assert_eq!(report["videos"][0]["file_name"], "media1.mp4");
    assert_eq!(report["videos"][0]["mime"], "video/mp4");
}

#[test]
fn generate_config_writes_sample() {
    let workspace = TempDir::new().unwrap();
    let config_path = workspace.path().join("pptxvid.toml");

    Command::cargo_bin("pptxvid")
        .unwrap()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("media_prefix"));
    assert!(content.contains("directory_prefix"));
}

#[test]
fn invalid_config_file_exits_with_config_code() {
    let workspace = TempDir::new().unwrap();
    let config_path = workspace.path().join("broken.toml");
    fs::write(&config_path, "[output\ndirectory_prefix = ").unwrap();

    pptxvid(&workspace)
        .arg(workspace.path().join("talk.pptx"))
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(6);
}

#[test]
fn missing_output_parents_are_created() {
    let workspace = TempDir::new().unwrap();
    let package = workspace.path().join("talk.pptx");
    write_package(&package, &[("ppt/media/media1.mp4", MP4_BYTES)]);
    let base = workspace.path().join("videos").join("2024").join("talks");

    Command::cargo_bin("pptxvid")
        .unwrap()
        .arg(&package)
        .arg("--output-dir")
        .arg(&base)
        .arg("--output-format")
        .arg("plain")
        .assert()
        .code(0);

    let dirs: Vec<PathBuf> = fs::read_dir(&base)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].join("media1.mp4").is_file());
}
