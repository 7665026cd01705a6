//! Content-based file type detection.
//!
//! Only the leading bytes of a file are inspected. Names and extensions are
//! never consulted.

use serde::Serialize;

/// Number of leading bytes needed to recognise every known signature.
pub const SNIFF_LEN: usize = 262;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileKind {
    pub mime: &'static str,
    pub extension: &'static str,
}

impl FileKind {
    const fn new(mime: &'static str, extension: &'static str) -> Self {
        Self { mime, extension }
    }

    /// Top-level MIME type, e.g. `video` for `video/mp4`.
    pub fn category(&self) -> &'static str {
        self.mime.split('/').next().unwrap_or("")
    }

    pub fn is_video(&self) -> bool {
        self.category() == "video"
    }
}

const MP4: FileKind = FileKind::new("video/mp4", "mp4");
const M4V: FileKind = FileKind::new("video/x-m4v", "m4v");
const MOV: FileKind = FileKind::new("video/quicktime", "mov");
const THREE_GP: FileKind = FileKind::new("video/3gpp", "3gp");
const THREE_G2: FileKind = FileKind::new("video/3gpp2", "3g2");
const MKV: FileKind = FileKind::new("video/x-matroska", "mkv");
const WEBM: FileKind = FileKind::new("video/webm", "webm");
const AVI: FileKind = FileKind::new("video/x-msvideo", "avi");
const WMV: FileKind = FileKind::new("video/x-ms-wmv", "wmv");
const FLV: FileKind = FileKind::new("video/x-flv", "flv");
const MPEG: FileKind = FileKind::new("video/mpeg", "mpg");

const M4A: FileKind = FileKind::new("audio/mp4", "m4a");
const MP3: FileKind = FileKind::new("audio/mpeg", "mp3");
const WAV: FileKind = FileKind::new("audio/x-wav", "wav");
const OGG: FileKind = FileKind::new("audio/ogg", "ogg");
const FLAC: FileKind = FileKind::new("audio/x-flac", "flac");

const PNG: FileKind = FileKind::new("image/png", "png");
const JPEG: FileKind = FileKind::new("image/jpeg", "jpg");
const GIF: FileKind = FileKind::new("image/gif", "gif");
const BMP: FileKind = FileKind::new("image/bmp", "bmp");
const TIFF: FileKind = FileKind::new("image/tiff", "tif");
const WEBP: FileKind = FileKind::new("image/webp", "webp");
const HEIC: FileKind = FileKind::new("image/heic", "heic");
const HEIF: FileKind = FileKind::new("image/heif", "heif");
const AVIF: FileKind = FileKind::new("image/avif", "avif");
const EMF: FileKind = FileKind::new("image/emf", "emf");
const WMF: FileKind = FileKind::new("image/wmf", "wmf");

const ZIP: FileKind = FileKind::new("application/zip", "zip");
const PDF: FileKind = FileKind::new("application/pdf", "pdf");

/// Identify `buf`, the leading bytes of a file. `None` when nothing matches.
pub fn sniff(buf: &[u8]) -> Option<FileKind> {
    if let Some(kind) = sniff_iso_bmff(buf) {
        return Some(kind);
    }

    match buf {
        [0x1A, 0x45, 0xDF, 0xA3, ..] => Some(sniff_ebml(buf)),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'A', b'V', b'I', b' ', ..] => Some(AVI),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(WAV),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(WEBP),
        [0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, ..] => Some(WMV),
        [b'F', b'L', b'V', 0x01, ..] => Some(FLV),
        [0x00, 0x00, 0x01, 0xB0..=0xBF, ..] => Some(MPEG),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(PNG),
        [0xFF, 0xD8, 0xFF, ..] => Some(JPEG),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(GIF),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(TIFF),
        [0xD7, 0xCD, 0xC6, 0x9A, ..] => Some(WMF),
        [0x01, 0x00, 0x00, 0x00, ..] if buf.get(40..44) == Some(&b" EMF"[..]) => Some(EMF),
        [b'I', b'D', b'3', ..] | [0xFF, 0xFB | 0xF3 | 0xF2, ..] => Some(MP3),
        [b'O', b'g', b'g', b'S', ..] => Some(OGG),
        [b'f', b'L', b'a', b'C', ..] => Some(FLAC),
        [b'P', b'K', 0x03, 0x04, ..] => Some(ZIP),
        [b'%', b'P', b'D', b'F', ..] => Some(PDF),
        [b'B', b'M', ..] if buf.len() >= 14 => Some(BMP),
        _ => None,
    }
}

/// ISO base media files (MP4 family, QuickTime, HEIF): an `ftyp` box whose
/// major brand names the format. Files without a leading `ftyp` box are not
/// identified.
fn sniff_iso_bmff(buf: &[u8]) -> Option<FileKind> {
    if buf.get(4..8)? != b"ftyp" {
        return None;
    }

    let brand = buf.get(8..12)?;
    match brand {
        b"qt  " => Some(MOV),
        b"M4V " | b"M4VH" | b"M4VP" => Some(M4V),
        b"M4A " | b"M4B " | b"M4P " | b"F4A " | b"F4B " => Some(M4A),
        b"heic" | b"heix" | b"heim" | b"heis" | b"hevc" | b"hevx" => Some(HEIC),
        b"mif1" | b"msf1" => Some(HEIF),
        b"avif" | b"avis" => Some(AVIF),
        [b'3', b'g', b'2', _] => Some(THREE_G2),
        [b'3', b'g', b'p', _] => Some(THREE_GP),
        b"avc1" | b"dash" | b"iso2" | b"iso3" | b"iso4" | b"iso5" | b"iso6" | b"isom"
        | b"mmp4" | b"mp41" | b"mp42" | b"mp4v" | b"mp71" | b"MSNV" | b"NDAS" | b"NDSC"
        | b"NSDC" | b"NDSH" | b"NDSM" | b"NDSP" | b"NDSS" | b"NDXC" | b"NDXH" | b"NDXM"
        | b"NDXP" | b"NDXS" | b"F4V " | b"F4P " | b"XAVC" => Some(MP4),
        _ => None,
    }
}

/// EBML containers: WebM when the doctype says so, Matroska otherwise.
fn sniff_ebml(buf: &[u8]) -> FileKind {
    if buf.windows(4).any(|w| w == b"webm") {
        WEBM
    } else {
        MKV
    }
}
