pub mod media_reader;

pub use media_reader::{MediaExtraction, MediaReader, PackageMediaEntry, UnpackProgress};
