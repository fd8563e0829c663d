//! Image loader built on the `image` crate.

use std::path::Path;

use image::{ColorType, DynamicImage};
use rayon::prelude::*;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{Encoding, ImageSource};

use super::options::LoadOptions;

/// Loads image files into [`ImageSource`] values.
///
/// Nothing is cached: every call reads the file again.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    options: LoadOptions,
}

impl ImageLoader {
    /// Create a loader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom options.
    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Loader options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load one image file.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ImageSource> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::read(path, e))?;

        let image = self.decode(&data, path)?;
        log::debug!(
            "loaded {} ({}x{}, {} channels, {})",
            path.display(),
            image.width,
            image.height,
            image.channels,
            image.encoding
        );
        Ok(image.with_path(path))
    }

    /// Load an image from bytes.
    pub fn load_bytes(&self, data: &[u8]) -> Result<ImageSource> {
        self.decode(data, Path::new("<memory>"))
    }

    /// Load many images, keeping input order.
    ///
    /// With `parallel` enabled the files are decoded on the rayon pool; the
    /// result order still follows `paths`, and the first failing path in
    /// input order is reported.
    pub fn load_all<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<Vec<ImageSource>> {
        if self.options.parallel && paths.len() > 1 {
            let results: Vec<Result<ImageSource>> =
                paths.par_iter().map(|p| self.load(p)).collect();
            results.into_iter().collect()
        } else {
            paths.iter().map(|p| self.load(p)).collect()
        }
    }

    fn decode(&self, data: &[u8], path: &Path) -> Result<ImageSource> {
        let format = detect_format_from_bytes(data)
            .map_err(|_| Error::decode(path, "unsupported or unrecognized image format"))?;

        let dynamic = image::load_from_memory_with_format(data, format.image_format())
            .map_err(|e| Error::decode(path, e.to_string()))?;

        let encoding = self
            .options
            .encoding
            .unwrap_or_else(|| detect_encoding(format, dynamic.color()));

        Ok(into_source(dynamic, encoding))
    }
}

/// Encoding implied by the container and its sample type.
fn detect_encoding(format: SourceFormat, color: ColorType) -> Encoding {
    match format {
        SourceFormat::Tiff if is_float(color) => Encoding::Linear,
        _ => format.default_encoding(),
    }
}

fn is_float(color: ColorType) -> bool {
    matches!(color, ColorType::Rgb32F | ColorType::Rgba32F)
}

fn is_gray(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
    )
}

fn into_source(dynamic: DynamicImage, encoding: Encoding) -> ImageSource {
    let color = dynamic.color();
    let (width, height) = (dynamic.width(), dynamic.height());

    let (channels, data) = if color.has_alpha() {
        (4, dynamic.to_rgba32f().into_raw())
    } else {
        (3, dynamic.to_rgb32f().into_raw())
    };

    ImageSource {
        path: None,
        width,
        height,
        channels,
        data,
        encoding,
        source_is_grayscale: is_gray(color),
    }
}
