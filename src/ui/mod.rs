pub mod launcher;
pub mod output;
pub mod progress;
pub mod signals;

pub use launcher::open_in_file_browser;
pub use output::{OutputFormatter, OutputMode};
pub use progress::{ProgressManager, RunProgress};
pub use signals::GracefulShutdown;
