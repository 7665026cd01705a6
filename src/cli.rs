use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pptxvid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract embedded videos from PowerPoint presentations")]
#[command(
    long_about = "pptxvid unpacks the media folder of a .pptx presentation, keeps the files \
                  whose content is a video, and copies them into a fresh timestamped directory."
)]
#[command(before_help = "🎬 pptxvid - PowerPoint Video Extractor")]
#[command(after_help = "EXAMPLES:\n  \
    pptxvid talk.pptx\n  \
    pptxvid talk.pptx --output-dir ~/Videos --prefix Talk --open\n  \
    pptxvid talk.pptx --dry-run\n  \
    pptxvid talk.pptx --output-format json --show-errors\n  \
    pptxvid --generate-config --config pptxvid.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Presentation package to extract videos from
    #[arg(required_unless_present = "generate_config")]
    pub package: Option<PathBuf>,

    /// Directory in which the timestamped output directory is created
    #[arg(short, long, help = "Base directory for output (default: ~/Desktop)")]
    pub output_dir: Option<PathBuf>,

    /// Name prefix of the output directory
    #[arg(short, long, help = "Output directory prefix (default: PPTX_Videos)")]
    pub prefix: Option<String>,

    /// Parent directory for the temporary unpacking area
    #[arg(long, help = "Where to unpack the package (default: system temp dir)")]
    pub scratch_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print every recorded error after the summary
    #[arg(long, help = "Show full error details after the summary")]
    pub show_errors: bool,

    /// Open the output directory when done
    #[arg(long, help = "Open the output directory in the file browser")]
    pub open: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "List the videos that would be extracted without copying them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_output_dir(self.output_dir.clone())
            .with_prefix(self.prefix.clone())
            .with_scratch_root(self.scratch_dir.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `env_logger` filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "pptxvid=error";
        }

        match self.verbose {
            0 => "pptxvid=warn",
            1 => "pptxvid=info",
            _ => "pptxvid=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["pptxvid", "talk.pptx"]).unwrap();
        assert_eq!(cli.package, Some(PathBuf::from("talk.pptx")));
        assert!(!cli.dry_run);
        assert_eq!(cli.log_filter(), "pptxvid=warn");
    }

    #[test]
    fn test_package_required_unless_generating_config() {
        assert!(Cli::try_parse_from(["pptxvid", "--open"]).is_err());

        let cli = Cli::try_parse_from(["pptxvid", "--generate-config"]).unwrap();
        assert!(cli.generate_config);
        assert!(cli.package.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pptxvid", "a.pptx", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_verbosity_and_log_filter() {
        let cli = Cli::try_parse_from(["pptxvid", "a.pptx", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
        assert_eq!(cli.log_filter(), "pptxvid=debug");

        let cli = Cli::try_parse_from(["pptxvid", "a.pptx", "-q"]).unwrap();
        assert_eq!(cli.verbosity_level(), 0);
        assert_eq!(cli.log_filter(), "pptxvid=error");
    }

    #[test]
    fn test_overrides_reach_config() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let out = temp_dir.path().join("videos");
        let cli = Cli::try_parse_from([
            "pptxvid",
            "a.pptx",
            "--output-dir",
            out.to_str().unwrap(),
            "--prefix",
            "Talk",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.output.base_directory, out);
        assert_eq!(config.output.directory_prefix, "Talk");
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let cli = Cli::try_parse_from(["pptxvid", "a.pptx", "--prefix", "a/b"]).unwrap();
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_output_format_mapping() {
        let cli =
            Cli::try_parse_from(["pptxvid", "a.pptx", "--output-format", "json"]).unwrap();
        assert_eq!(OutputMode::from(cli.output_format), OutputMode::Json);
    }
}
