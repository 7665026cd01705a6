use crate::error::{Result, VidError};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Path prefix of embedded media inside the package
    pub media_prefix: String,
    /// Accepted package extensions, compared case-insensitively
    pub package_extensions: Vec<String>,
    /// Parent of the per-run scratch directory (system temp dir when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_directory: PathBuf,
    pub directory_prefix: String,
    pub timestamp_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            media_prefix: "ppt/media/".to_string(),
            package_extensions: vec!["pptx".to_string()],
            scratch_root: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            directory_prefix: "PPTX_Videos".to_string(),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
        }
    }
}

/// `~/Desktop` when it exists, otherwise the home directory, otherwise the
/// working directory.
pub fn default_base_directory() -> PathBuf {
    match home::home_dir() {
        Some(home) => {
            let desktop = home.join("Desktop");
            if desktop.is_dir() {
                desktop
            } else {
                home
            }
        }
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VidError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VidError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| VidError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    /// Nothing is read from disk unless a path is given explicitly.
    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = output_dir.clone();
        }

        if let Some(ref prefix) = cli_args.prefix {
            self.output.directory_prefix = prefix.clone();
        }

        if let Some(ref scratch) = cli_args.scratch_root {
            self.extraction.scratch_root = Some(scratch.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.package_extensions.is_empty() {
            return Err(VidError::Config {
                message: "At least one package extension must be specified".to_string(),
            });
        }

        if self
            .extraction
            .package_extensions
            .iter()
            .any(|e| e.trim().is_empty() || e.starts_with('.'))
        {
            return Err(VidError::Config {
                message: "Package extensions must be non-empty and given without a leading dot"
                    .to_string(),
            });
        }

        if self.extraction.media_prefix.is_empty() || !self.extraction.media_prefix.ends_with('/')
        {
            return Err(VidError::Config {
                message: format!(
                    "Media prefix must be a directory path ending in '/': {:?}",
                    self.extraction.media_prefix
                ),
            });
        }

        let prefix = &self.output.directory_prefix;
        if prefix.is_empty() || prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(VidError::Config {
                message: format!("Invalid output directory prefix: {:?}", prefix),
            });
        }

        let format = &self.output.timestamp_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| item == Item::Error) {
            return Err(VidError::Config {
                message: format!("Invalid timestamp format: {:?}", format),
            });
        }

        // Missing directories are created by the run
        let base = &self.output.base_directory;
        if base.exists() && !base.is_dir() {
            return Err(VidError::Config {
                message: format!("Output location is not a directory: {}", base.display()),
            });
        }

        Ok(())
    }

    /// Whether `path` carries one of the accepted package extensions.
    pub fn is_package_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.extraction
                    .package_extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub scratch_root: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_scratch_root(mut self, scratch_root: Option<PathBuf>) -> Self {
        self.scratch_root = scratch_root;
        self
    }
}
