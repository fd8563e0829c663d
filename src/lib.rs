//! # gridfig
//!
//! Comparison-grid figures from rendered image variants.
//!
//! This library loads a set of images (typically linear-light HDR renders
//! of one scene at increasing sample counts or with different techniques),
//! converts them for display, arranges them in row-major grids and writes a
//! single-page PDF or a self-contained HTML document at a given width.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gridfig::{build_grid, load_images, Document, Length};
//!
//! fn main() -> gridfig::Result<()> {
//!     let paths: Vec<String> = ["embree", "octree"]
//!         .iter()
//!         .flat_map(|accel| (0..14).map(move |i| format!("ajax_{}_{}spp.exr", accel, 1 << i)))
//!         .collect();
//!
//!     let images = load_images(&paths)?;
//!     let grid = build_grid(2, 14, images)?;
//!
//!     let mut doc = Document::for_path(Length::cm(18.0), "ajax.pdf")?;
//!     doc.add_grid(grid)?;
//!     doc.render_to_file()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Formats**: OpenEXR, Radiance HDR, PNG, JPEG, TIFF, BMP
//! - **Color**: sRGB or gamma display transfer with exposure
//! - **Output**: PDF (lopdf) and HTML, behind a pluggable backend trait
//! - **Layout**: grids stacked vertically or side by side at a fixed width
//! - **Parallel loading**: Uses Rayon, results stay in input order
//! - **Manifests**: whole figures described in JSON

pub mod assemble;
pub mod backend;
pub mod color;
pub mod detect;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use assemble::{build_grid, build_grid_with, Conversion};
pub use backend::{BackendRegistry, FigureBackend, HtmlBackend, OutputFormat, PdfBackend};
pub use color::{linear_to_display, quantize_rgb8, DisplayTransform, TransferFunction};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_supported_bytes, SourceFormat};
pub use error::{Error, Result};
pub use loader::{ImageLoader, LoadOptions};
pub use manifest::{FigureManifest, GridManifest};
pub use model::{
    Cell, Document, DocumentState, Encoding, Grid, GridSpec, ImageSource, Length, Metadata,
};
pub use render::{FigureStats, Layout, LayoutDirection, RenderOptions, RenderResult};

use std::path::{Path, PathBuf};

/// Load one image file.
///
/// # Example
///
/// ```no_run
/// use gridfig::load_image;
///
/// let image = load_image("ajax_embree_1spp.exr").unwrap();
/// println!("{}x{}", image.width, image.height);
/// ```
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageSource> {
    ImageLoader::new().load(path)
}

/// Load many image files in parallel, preserving input order.
///
/// Fails with the first error in input order.
pub fn load_images<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Vec<ImageSource>> {
    ImageLoader::new().load_all(paths)
}

/// Place grids side by side at `width_cm` and write them to `filename`.
///
/// The output format follows the file extension.
///
/// # Example
///
/// ```no_run
/// use gridfig::{build_grid, horizontal_figure, load_images};
///
/// let left = build_grid(1, 2, load_images(&["a.exr", "b.exr"])?)?;
/// let right = build_grid(1, 1, load_images(&["ref.exr"])?)?;
/// horizontal_figure(vec![left, right], 18.0, "comparison.pdf")?;
/// # Ok::<(), gridfig::Error>(())
/// ```
pub fn horizontal_figure(
    grids: Vec<Grid>,
    width_cm: f64,
    filename: impl AsRef<Path>,
) -> Result<RenderResult> {
    let mut doc = Document::for_path(Length::cm(width_cm), filename.as_ref())?
        .with_options(RenderOptions::new().horizontal());
    for grid in grids {
        doc.add_grid(grid)?;
    }
    doc.render_to_file()
}

/// Builder for loading grids and writing figures.
///
/// # Example
///
/// ```no_run
/// use gridfig::Gridfig;
///
/// let fig = Gridfig::new().with_width_cm(12.0).with_exposure(1.0);
/// let grid = fig.load_grid(1, 2, &["a.exr", "b.exr"])?;
/// fig.write(vec![grid], "figure.html")?;
/// # Ok::<(), gridfig::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Gridfig {
    load_options: LoadOptions,
    render_options: RenderOptions,
    transform: DisplayTransform,
    width: Length,
    metadata: Metadata,
}

impl Gridfig {
    /// Create a builder with an 18 cm figure width.
    pub fn new() -> Self {
        Self {
            load_options: LoadOptions::default(),
            render_options: RenderOptions::default(),
            transform: DisplayTransform::default(),
            width: Length::cm(18.0),
            metadata: Metadata::default(),
        }
    }

    /// Disable parallel loading.
    pub fn sequential(mut self) -> Self {
        self.load_options = self.load_options.sequential();
        self
    }

    /// Treat every input as the given encoding regardless of format.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.load_options = self.load_options.with_encoding(encoding);
        self
    }

    /// Exposure in stops for linear images.
    pub fn with_exposure(mut self, stops: f32) -> Self {
        self.transform = self.transform.with_exposure(stops);
        self
    }

    /// Display transfer function for linear images.
    pub fn with_transfer(mut self, transfer: TransferFunction) -> Self {
        self.transform = self.transform.with_transfer(transfer);
        self
    }

    /// Figure width in centimetres.
    pub fn with_width_cm(mut self, cm: f64) -> Self {
        self.width = Length::cm(cm);
        self
    }

    /// Place grids side by side.
    pub fn horizontal(mut self) -> Self {
        self.render_options = self.render_options.horizontal();
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Load `rows * cols` images and assemble them row-major.
    pub fn load_grid<P: AsRef<Path> + Sync>(
        &self,
        rows: usize,
        cols: usize,
        paths: &[P],
    ) -> Result<Grid> {
        // Shape errors should not wait for decoding.
        let spec = GridSpec::new(rows, cols)?;
        if paths.len() != spec.len() {
            return Err(Error::ShapeMismatch {
                rows,
                cols,
                images: paths.len(),
            });
        }
        let images = ImageLoader::with_options(self.load_options.clone()).load_all(paths)?;
        build_grid_with(rows, cols, images, Conversion::LinearToDisplay(self.transform))
    }

    /// Create an empty document for `path` with the builder's settings.
    pub fn document(&self, path: impl Into<PathBuf>) -> Result<Document> {
        Ok(Document::for_path(self.width, path)?
            .with_options(self.render_options.clone())
            .with_metadata(self.metadata.clone()))
    }

    /// Write `grids` to `path`.
    pub fn write(&self, grids: Vec<Grid>, path: impl Into<PathBuf>) -> Result<RenderResult> {
        let mut doc = self.document(path)?;
        for grid in grids {
            doc.add_grid(grid)?;
        }
        doc.render_to_file()
    }
}

impl Default for Gridfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gridfig_builder() {
        let fig = Gridfig::new()
            .sequential()
            .with_exposure(-1.0)
            .with_width_cm(12.0)
            .horizontal()
            .with_title("Cornell box");

        assert!(!fig.load_options.parallel);
        assert_eq!(fig.transform.exposure, -1.0);
        assert!((fig.width.to_cm() - 12.0).abs() < 1e-9);
        assert_eq!(fig.render_options.direction, LayoutDirection::Horizontal);
        assert_eq!(fig.metadata.title.as_deref(), Some("Cornell box"));
    }

    #[test]
    fn test_gridfig_default() {
        let fig = Gridfig::default();
        assert!(fig.load_options.parallel);
        assert_eq!(fig.render_options.direction, LayoutDirection::Vertical);
        assert!(fig.metadata.is_empty());
    }

    #[test]
    fn test_load_grid_shape_checked_before_loading() {
        let paths = vec!["missing.exr"; 27];
        assert!(matches!(
            Gridfig::new().load_grid(2, 14, &paths),
            Err(Error::ShapeMismatch {
                rows: 2,
                cols: 14,
                images: 27
            })
        ));
    }

    #[test]
    fn test_load_image_missing() {
        assert!(matches!(
            load_image("no/such/render.exr"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_document_format_from_extension() {
        let doc = Gridfig::new().document("figure.htm").unwrap();
        assert_eq!(doc.format(), OutputFormat::Html);
        assert!(Gridfig::new().document("figure.png").is_err());
    }

    #[test]
    fn test_horizontal_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("side_by_side.html");

        let grids: Vec<Grid> = (0..2)
            .map(|_| {
                let image = ImageSource::solid(3, 3, [0.5; 3], Encoding::Linear);
                build_grid(1, 2, vec![image.clone(), image]).unwrap()
            })
            .collect();

        let result = horizontal_figure(grids, 18.0, &path).unwrap();
        assert_eq!(result.mime_type, "text/html");
        assert_eq!(result.stats.grid_count, 2);
        assert_eq!(result.stats.cell_count, 4);
        assert!(path.exists());
    }
}
