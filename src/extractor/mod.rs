pub mod dedupe;
pub mod file_extractor;
pub mod output_manager;

pub use dedupe::dedupe;
pub use file_extractor::{ExtractedVideo, FileOperations};
pub use output_manager::{AbortKind, ExtractionReport, OutputManager, RunOutcome};
