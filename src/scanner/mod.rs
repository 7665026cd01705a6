pub mod media_scanner;
pub mod signature;
pub mod video_filter;

pub use media_scanner::{MediaEntry, MediaListing, MediaScanner};
pub use signature::FileKind;
pub use video_filter::VideoFilter;
