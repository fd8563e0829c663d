//! Decoded raster images.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the samples of an image relate to light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Values are proportional to radiance (renderer output, EXR/HDR)
    Linear,
    /// Values already carry a display transfer function (PNG/JPEG)
    Display,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Linear => write!(f, "linear"),
            Encoding::Display => write!(f, "display"),
        }
    }
}

/// A loaded raster image.
///
/// Samples are `f32`, interleaved, row-major, `channels` per pixel
/// (3 = RGB, 4 = RGBA). Display-encoded sources are normalized to `0.0..=1.0`;
/// linear sources keep their radiance values unclamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    /// File the image was loaded from, if any
    pub path: Option<PathBuf>,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Samples per pixel
    pub channels: u8,

    /// Pixel samples
    pub data: Vec<f32>,

    /// Whether `data` is linear or display encoded
    pub encoding: Encoding,

    /// The file stored a single gray channel that was expanded to RGB
    pub source_is_grayscale: bool,
}

impl ImageSource {
    /// Create an image from raw samples.
    ///
    /// Returns `None` when `data` does not hold `width * height * channels`
    /// samples or `channels` is not 3 or 4.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<f32>,
        encoding: Encoding,
    ) -> Option<Self> {
        if !(channels == 3 || channels == 4) {
            return None;
        }
        if data.len() != width as usize * height as usize * channels as usize {
            return None;
        }
        Some(Self {
            path: None,
            width,
            height,
            channels,
            data,
            encoding,
            source_is_grayscale: false,
        })
    }

    /// Create an RGB image filled with one color.
    pub fn solid(width: u32, height: u32, rgb: [f32; 3], encoding: Encoding) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            path: None,
            width,
            height,
            channels: 3,
            data,
            encoding,
            source_is_grayscale: false,
        }
    }

    /// Attach the origin path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Origin path, or `<memory>` for images not loaded from disk.
    pub fn display_path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new("<memory>"))
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the image has an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Whether the samples are linear light.
    pub fn is_linear(&self) -> bool {
        self.encoding == Encoding::Linear
    }

    /// Height divided by width.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f64 / self.width as f64
    }

    /// Samples of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.data.get(start..start + c)
    }

    /// Color samples per pixel: 3 for RGB(A), 1 for gray buffers.
    pub fn color_channels(&self) -> usize {
        if self.channels >= 3 {
            3
        } else {
            1
        }
    }

    /// Pixels as RGB triples. Gray samples are replicated and alpha is dropped.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        let c = (self.channels as usize).max(1);
        self.data.chunks_exact(c).map(|px| match *px {
            [r, g, b, ..] => [r, g, b],
            [v, ..] => [v; 3],
            [] => [0.0; 3],
        })
    }

    /// Check that the image can be drawn.
    ///
    /// Rejects empty images, channel counts other than 3 or 4, and buffers
    /// that do not hold `width * height * channels` samples. Struct literals
    /// skip the checks in [`ImageSource::from_raw`].
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.pixel_count() == 0 {
            return Err(format!("image has zero size ({}x{})", self.width, self.height));
        }
        if !(self.channels == 3 || self.channels == 4) {
            return Err(format!("unsupported channel count {}", self.channels));
        }
        let expected = self.pixel_count() * self.channels as usize;
        if self.data.len() != expected {
            return Err(format!(
                "{} samples for {}x{}x{}",
                self.data.len(),
                self.width,
                self.height,
                self.channels
            ));
        }
        Ok(())
    }

    /// Smallest and largest color sample (alpha ignored).
    pub fn value_range(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for px in self.rgb_pixels() {
            for v in px {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_validates_length() {
        assert!(ImageSource::from_raw(2, 2, 3, vec![0.0; 12], Encoding::Linear).is_some());
        assert!(ImageSource::from_raw(2, 2, 3, vec![0.0; 11], Encoding::Linear).is_none());
        assert!(ImageSource::from_raw(2, 2, 2, vec![0.0; 8], Encoding::Linear).is_none());
    }

    #[test]
    fn test_pixel_access() {
        let mut img = ImageSource::solid(3, 2, [0.1, 0.2, 0.3], Encoding::Linear);
        img.data[(1 * 3 + 2) * 3] = 5.0;
        assert_eq!(img.pixel(2, 1).unwrap()[0], 5.0);
        assert_eq!(img.pixel(0, 0).unwrap(), &[0.1, 0.2, 0.3]);
        assert!(img.pixel(3, 0).is_none());
    }

    #[test]
    fn test_value_range_ignores_alpha() {
        let img = ImageSource::from_raw(
            1,
            2,
            4,
            vec![0.5, 2.0, 0.25, 9.0, 0.0, 1.0, 1.0, 9.0],
            Encoding::Linear,
        )
        .unwrap();
        assert_eq!(img.value_range(), (0.0, 2.0));
    }

    #[test]
    fn test_check_rejects_malformed_images() {
        assert!(ImageSource::solid(2, 1, [0.0; 3], Encoding::Linear).check().is_ok());
        assert!(ImageSource::solid(0, 0, [0.0; 3], Encoding::Linear).check().is_err());
        assert!(ImageSource::solid(0, 4, [0.0; 3], Encoding::Linear).check().is_err());

        let mut short = ImageSource::solid(2, 2, [0.0; 3], Encoding::Linear);
        short.data.pop();
        assert!(short.check().is_err());
    }

    #[test]
    fn test_gray_literal_does_not_panic() {
        let gray = ImageSource {
            path: None,
            width: 2,
            height: 1,
            channels: 1,
            data: vec![0.25, 3.0],
            encoding: Encoding::Linear,
            source_is_grayscale: true,
        };
        assert!(gray.check().is_err());
        assert_eq!(gray.value_range(), (0.25, 3.0));
        assert_eq!(gray.rgb_pixels().nth(1), Some([3.0; 3]));

        let mut empty = gray.clone();
        empty.channels = 0;
        assert_eq!(empty.value_range(), (0.25, 3.0));
    }

    #[test]
    fn test_display_path() {
        let img = ImageSource::solid(1, 1, [0.0; 3], Encoding::Display);
        assert_eq!(img.display_path(), Path::new("<memory>"));
        let img = img.with_path("a.exr");
        assert_eq!(img.display_path(), Path::new("a.exr"));
    }
}
