use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported input file: {path}")]
    InvalidInput { path: String, expected: Vec<String> },

    #[error("Failed to read package: {message}")]
    Archive { message: String },

    #[error("Media directory not found in package: {prefix}")]
    MediaDirectoryNotFound { prefix: String },

    #[error("Failed to detect file type: {filename}")]
    Classification {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {filename}: {source}")]
    Copy {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for VidError {
    fn user_message(&self) -> String {
        match self {
            VidError::InvalidInput { path, expected } => {
                format!(
                    "Only {} files are supported: {}",
                    expected
                        .iter()
                        .map(|e| format!(".{}", e))
                        .collect::<Vec<_>>()
                        .join(", "),
                    path
                )
            }
            VidError::Archive { message } => {
                format!("Could not read package: {}", message)
            }
            VidError::MediaDirectoryNotFound { prefix } => {
                format!("Media directory not found ({})", prefix)
            }
            VidError::Classification { filename, .. } => {
                format!("File type detection failed: {}", filename)
            }
            VidError::Copy { filename, source } => {
                format!("Could not copy {}: {}", filename, source)
            }
            VidError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            VidError::Cancelled => "Operation was cancelled by user".to_string(),
            VidError::Unexpected { message } => {
                format!("Fatal error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            VidError::InvalidInput { .. } => Some(
                "Choose a PowerPoint package saved in the Open XML format (.pptx).".to_string()
            ),
            VidError::Archive { .. } => Some(
                "Check that the file is not damaged and opens in PowerPoint. Legacy .ppt files are not ZIP packages.".to_string()
            ),
            VidError::MediaDirectoryNotFound { .. } => Some(
                "The presentation does not embed any media. Linked videos are stored outside the package.".to_string()
            ),
            VidError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            VidError::Io(_) => Some(
                "Ensure you have the necessary read/write permissions for the output directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for VidError {
    fn from(error: zip::result::ZipError) -> Self {
        use zip::result::ZipError;

        match error {
            ZipError::Io(e) => VidError::Archive {
                message: e.to_string(),
            },
            ZipError::InvalidArchive(msg) => VidError::Archive {
                message: format!("not a valid ZIP package ({})", msg),
            },
            ZipError::UnsupportedArchive(msg) => VidError::Archive {
                message: format!("unsupported ZIP feature ({})", msg),
            },
            other => VidError::Archive {
                message: other.to_string(),
            },
        }
    }
}

impl From<toml::de::Error> for VidError {
    fn from(error: toml::de::Error) -> Self {
        VidError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VidError>;

/// Destination for non-fatal, per-file errors collected during a run.
pub trait ErrorRecorder {
    fn record(&mut self, message: String);
}

impl ErrorRecorder for Vec<String> {
    fn record(&mut self, message: String) {
        self.push(message);
    }
}
