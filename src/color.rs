//! Linear-light to display conversion.
//!
//! Conversion always allocates a new [`ImageSource`]; the source buffer is
//! left untouched so one loaded image can feed several figures. Applying the
//! conversion twice is wrong: the transfer function is not idempotent.

use serde::{Deserialize, Serialize};

use crate::model::{Encoding, ImageSource};

/// Display transfer curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// Piecewise sRGB curve (IEC 61966-2-1)
    #[default]
    Srgb,
    /// Pure power curve `v^(1/g)`
    Gamma(f32),
}

impl TransferFunction {
    /// Encode one linear value; input must already be clamped to `[0, 1]`.
    pub fn encode(&self, v: f32) -> f32 {
        match *self {
            TransferFunction::Srgb => srgb_encode(v),
            TransferFunction::Gamma(g) if g > 0.0 => v.powf(1.0 / g),
            TransferFunction::Gamma(_) => v,
        }
    }
}

/// Linear to display mapping applied per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    /// Exposure adjustment in stops, applied as `2^stops` before encoding
    pub exposure: f32,

    /// Transfer curve
    pub transfer: TransferFunction,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            transfer: TransferFunction::Srgb,
        }
    }
}

impl DisplayTransform {
    /// sRGB with no exposure change.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exposure in stops.
    pub fn with_exposure(mut self, stops: f32) -> Self {
        self.exposure = stops;
        self
    }

    /// Set the transfer curve.
    pub fn with_transfer(mut self, transfer: TransferFunction) -> Self {
        self.transfer = transfer;
        self
    }

    /// Map one linear color sample to `[0, 1]` display space.
    pub fn map(&self, v: f32) -> f32 {
        let scaled = v * self.scale();
        // NaN from broken renders maps to black
        let clamped = if scaled.is_nan() {
            0.0
        } else {
            scaled.clamp(0.0, 1.0)
        };
        self.transfer.encode(clamped)
    }

    /// Convert an image, returning a new display-encoded copy.
    pub fn apply(&self, image: &ImageSource) -> ImageSource {
        let c = (image.channels as usize).max(1);
        let color = image.color_channels();
        let mut data = Vec::with_capacity(image.data.len());
        for px in image.data.chunks_exact(c) {
            for (i, &v) in px.iter().enumerate() {
                // alpha is clamped, never encoded
                data.push(if i < color { self.map(v) } else { v.clamp(0.0, 1.0) });
            }
        }

        ImageSource {
            path: image.path.clone(),
            width: image.width,
            height: image.height,
            channels: image.channels,
            data,
            encoding: Encoding::Display,
            source_is_grayscale: image.source_is_grayscale,
        }
    }

    fn scale(&self) -> f32 {
        if self.exposure == 0.0 {
            1.0
        } else {
            self.exposure.exp2()
        }
    }
}

/// sRGB transfer function for one value in `[0, 1]`.
pub fn srgb_encode(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Apply the sRGB display transfer to a linear image.
///
/// Output values are clamped to `[0, 1]`; alpha is clamped but not encoded.
pub fn linear_to_display(image: &ImageSource) -> ImageSource {
    DisplayTransform::default().apply(image)
}

/// Quantize a display-encoded image to 8-bit RGB, dropping alpha.
pub fn quantize_rgb8(image: &ImageSource) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.pixel_count() * 3);
    for px in image.rgb_pixels() {
        for v in px {
            let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
            out.push((255.0 * v + 0.5) as u8);
        }
    }
    out
}
