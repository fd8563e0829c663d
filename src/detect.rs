//! Image format detection from magic bytes.

use crate::error::{Error, Result};
use crate::model::Encoding;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Image container formats accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// OpenEXR (linear, floating point)
    OpenExr,
    /// Radiance RGBE (linear)
    Radiance,
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// TIFF (linear only when it stores float samples)
    Tiff,
    /// Windows bitmap
    Bmp,
}

impl SourceFormat {
    /// Encoding the format normally carries.
    ///
    /// TIFF is reported as display-encoded here; the loader revisits the
    /// decision once the sample type is known.
    pub fn default_encoding(&self) -> Encoding {
        match self {
            SourceFormat::OpenExr | SourceFormat::Radiance => Encoding::Linear,
            _ => Encoding::Display,
        }
    }

    /// Matching format of the `image` crate.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            SourceFormat::OpenExr => image::ImageFormat::OpenExr,
            SourceFormat::Radiance => image::ImageFormat::Hdr,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Tiff => image::ImageFormat::Tiff,
            SourceFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceFormat::OpenExr => "OpenEXR",
            SourceFormat::Radiance => "Radiance HDR",
            SourceFormat::Png => "PNG",
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::Bmp => "BMP",
        };
        f.write_str(name)
    }
}

/// OpenEXR magic number: 0x762f3101 (little-endian)
const EXR_MAGIC: &[u8] = &[0x76, 0x2F, 0x31, 0x01];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const HEADER_LEN: usize = 16;

/// Detect the image format from a file path.
///
/// # Returns
/// * `Ok(SourceFormat)` if the header is recognized
/// * `Err(Error::NotFound)` if the file does not exist
/// * `Err(Error::Decode)` if the header is unknown
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::read(path, e))?;
    let reader = BufReader::new(file);
    let mut header = Vec::with_capacity(HEADER_LEN);
    reader
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| Error::read(path, e))?;
    detect_format_from_bytes(&header).map_err(|_| Error::decode(path, "unrecognized image header"))
}

/// Detect the image format from the leading bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(EXR_MAGIC) {
        return Ok(SourceFormat::OpenExr);
    }

    // Radiance files start with "#?RADIANCE" or "#?RGBE"
    if data.starts_with(b"#?") {
        return Ok(SourceFormat::Radiance);
    }

    if data.starts_with(PNG_MAGIC) {
        return Ok(SourceFormat::Png);
    }

    if data.starts_with(JPEG_MAGIC) {
        return Ok(SourceFormat::Jpeg);
    }

    // TIFF: II*\0 (little-endian) or MM\0* (big-endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Ok(SourceFormat::Tiff);
    }

    if data.starts_with(b"BM") {
        return Ok(SourceFormat::Bmp);
    }

    Err(Error::decode("<memory>", "unrecognized image header"))
}

/// Check if bytes start with a supported image header.
pub fn is_supported_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
