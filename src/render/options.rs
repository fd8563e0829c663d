//! Rendering options and configuration.

use crate::model::Length;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options for laying out and writing a figure.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How grids are arranged relative to each other
    pub direction: LayoutDirection,

    /// Gap between neighbouring cells of a grid
    pub cell_spacing: Length,

    /// Gap between grids
    pub grid_spacing: Length,

    /// Font size for titles and captions, in points
    pub font_size: f64,

    /// Directory to write cell images to (HTML only; embedded when unset)
    pub image_dir: Option<PathBuf>,

    /// Prefix for image paths in HTML output (e.g., "./images/")
    pub image_path_prefix: String,

    /// Scale images without smoothing (CSS `image-rendering`, PDF `/Interpolate`)
    pub pixelated: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout direction.
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Place grids side by side.
    pub fn horizontal(mut self) -> Self {
        self.direction = LayoutDirection::Horizontal;
        self
    }

    /// Set the gap between cells.
    pub fn with_cell_spacing(mut self, spacing: Length) -> Self {
        self.cell_spacing = spacing;
        self
    }

    /// Set the gap between grids.
    pub fn with_grid_spacing(mut self, spacing: Length) -> Self {
        self.grid_spacing = spacing;
        self
    }

    /// Set the label font size in points.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size.max(1.0);
        self
    }

    /// Write HTML cell images into a directory instead of embedding them.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Enable or disable nearest-neighbour scaling in HTML.
    pub fn with_pixelated(mut self, pixelated: bool) -> Self {
        self.pixelated = pixelated;
        self
    }

    /// Height of a title or caption band, in points.
    pub fn label_band(&self) -> f64 {
        self.font_size * 1.6
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::Vertical,
            cell_spacing: Length::mm(0.5),
            grid_spacing: Length::mm(2.0),
            font_size: 7.0,
            image_dir: None,
            image_path_prefix: String::new(),
            pixelated: true,
        }
    }
}

/// Arrangement of grids within the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Grids stacked top to bottom, each spanning the full width
    #[default]
    Vertical,
    /// Grids side by side, sharing one height
    Horizontal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .horizontal()
            .with_font_size(9.0)
            .with_cell_spacing(Length::mm(1.0))
            .with_image_dir("./images")
            .with_image_prefix("images/");

        assert_eq!(options.direction, LayoutDirection::Horizontal);
        assert_eq!(options.font_size, 9.0);
        assert!((options.cell_spacing.to_mm() - 1.0).abs() < 1e-9);
        assert_eq!(options.image_dir, Some(PathBuf::from("./images")));
        assert_eq!(options.image_path_prefix, "images/");
    }

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.direction, LayoutDirection::Vertical);
        assert!(options.image_dir.is_none());
        assert!(options.pixelated);
        assert!((options.label_band() - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_font_size_floor() {
        assert_eq!(RenderOptions::new().with_font_size(0.0).font_size, 1.0);
    }
}
