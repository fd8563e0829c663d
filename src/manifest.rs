//! JSON figure manifests.
//!
//! A manifest describes one figure document: where it goes, how wide it is,
//! and which images make up each grid.
//!
//! ```json
//! {
//!   "output": "ajax.pdf",
//!   "width_cm": 18.0,
//!   "grids": [{
//!     "rows": 2,
//!     "cols": 14,
//!     "template": "ajax_{row}_{col}spp.exr",
//!     "row_values": ["embree", "octree"],
//!     "col_values": ["1", "2", "4", "8", "16", "32", "64",
//!                    "128", "256", "512", "1024", "2048", "4096", "8192"],
//!     "row_titles": ["Embree", "Octree"]
//!   }]
//! }
//! ```

use crate::assemble::{build_grid_with, Conversion};
use crate::backend::OutputFormat;
use crate::color::DisplayTransform;
use crate::error::{Error, Result};
use crate::loader::{ImageLoader, LoadOptions};
use crate::model::{Document, Grid, ImageSource, Length, Metadata};
use crate::render::{LayoutDirection, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

fn default_width_cm() -> f64 {
    18.0
}

/// A figure document described in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureManifest {
    /// Output file; relative paths resolve against the manifest directory
    pub output: PathBuf,

    /// Output format; taken from the output extension when unset
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Figure width in centimetres
    #[serde(default = "default_width_cm")]
    pub width_cm: f64,

    /// Grid arrangement
    #[serde(default)]
    pub layout: LayoutDirection,

    /// Document title (metadata)
    #[serde(default)]
    pub title: Option<String>,

    /// Grid sections in order
    pub grids: Vec<GridManifest>,
}

/// One grid section of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridManifest {
    /// Number of rows
    pub rows: usize,

    /// Number of columns
    pub cols: usize,

    /// Explicit image list in row-major order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<PathBuf>,

    /// Path template with `{row}` and `{col}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Values substituted for `{row}`, one per row
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_values: Vec<String>,

    /// Values substituted for `{col}`, one per column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub col_values: Vec<String>,

    /// Row-major captions; empty strings leave a cell uncaptioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<Vec<String>>,

    /// Row titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_titles: Option<Vec<String>>,

    /// Column titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_titles: Option<Vec<String>>,

    /// Grid title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Exposure in stops applied to linear images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f32>,
}

impl FromStr for FigureManifest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let manifest: FigureManifest = serde_json::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }
}

impl FigureManifest {
    /// Read a manifest file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        text.parse::<FigureManifest>()
            .map_err(|e| match e {
                Error::Manifest(msg) => Error::Manifest(format!("{}: {}", path.display(), msg)),
                other => other,
            })
    }

    /// Check structural constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.grids.is_empty() {
            return Err(Error::Manifest("no grids".into()));
        }
        if !self.width_cm.is_finite() || self.width_cm <= 0.0 {
            return Err(Error::Manifest(format!(
                "width_cm must be positive, got {}",
                self.width_cm
            )));
        }
        for (i, grid) in self.grids.iter().enumerate() {
            grid.validate()
                .map_err(|msg| Error::Manifest(format!("grid {}: {}", i, msg)))?;
        }
        Ok(())
    }

    /// Output format, from `format` or the output extension.
    pub fn output_format(&self) -> Result<OutputFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => OutputFormat::from_path(&self.output),
        }
    }

    /// Output path resolved against `base_dir`.
    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        resolve(base_dir, &self.output)
    }

    /// Load every image and build the document.
    pub fn into_document(self, base_dir: &Path, options: &LoadOptions) -> Result<Document> {
        let format = self.output_format()?;
        let output = self.output_path(base_dir);
        let render_options = RenderOptions::new().with_direction(self.layout);

        let mut doc = Document::new(Length::cm(self.width_cm), format)?
            .with_destination(output)
            .with_options(render_options);
        if let Some(title) = self.title {
            doc = doc.with_metadata(Metadata::with_title(title));
        }

        let loader = ImageLoader::with_options(options.clone());
        for (i, grid) in self.grids.into_iter().enumerate() {
            let paths: Vec<PathBuf> = grid
                .image_paths()
                .into_iter()
                .map(|p| resolve(base_dir, &p))
                .collect();
            log::info!(
                "grid {}: loading {} images ({}x{})",
                i,
                paths.len(),
                grid.rows,
                grid.cols
            );
            let images = loader.load_all(&paths)?;
            doc.add_grid(grid.build(images)?)?;
        }
        Ok(doc)
    }
}

impl GridManifest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.rows == 0 || self.cols == 0 {
            return Err(format!("grid of {}x{} has no cells", self.rows, self.cols));
        }
        match (&self.template, self.images.is_empty()) {
            (Some(_), false) => return Err("both images and template given".into()),
            (None, true) => return Err("either images or template is required".into()),
            (Some(_), true) => {
                if self.row_values.len() != self.rows {
                    return Err(format!(
                        "{} row_values for {} rows",
                        self.row_values.len(),
                        self.rows
                    ));
                }
                if self.col_values.len() != self.cols {
                    return Err(format!(
                        "{} col_values for {} columns",
                        self.col_values.len(),
                        self.cols
                    ));
                }
            }
            (None, false) => {}
        }
        if let Some(captions) = &self.captions {
            if captions.len() != self.rows * self.cols {
                return Err(format!(
                    "{} captions for {} cells",
                    captions.len(),
                    self.rows * self.cols
                ));
            }
        }
        Ok(())
    }

    /// Image paths in row-major order, as written in the manifest.
    ///
    /// Template placeholders are substituted verbatim; file names are never
    /// guessed or corrected.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        match &self.template {
            Some(template) => {
                let mut paths = Vec::with_capacity(self.rows * self.cols);
                for row in &self.row_values {
                    for col in &self.col_values {
                        let path = template.replace("{row}", row).replace("{col}", col);
                        paths.push(PathBuf::from(path));
                    }
                }
                paths
            }
            None => self.images.clone(),
        }
    }

    fn build(self, images: Vec<ImageSource>) -> Result<Grid> {
        let transform = DisplayTransform::new().with_exposure(self.exposure.unwrap_or(0.0));
        let mut grid = build_grid_with(
            self.rows,
            self.cols,
            images,
            Conversion::LinearToDisplay(transform),
        )?;

        if let Some(titles) = self.row_titles {
            grid.set_row_titles(titles)?;
        }
        if let Some(titles) = self.col_titles {
            grid.set_col_titles(titles)?;
        }
        if let Some(title) = self.title {
            grid.set_title(title);
        }
        if let Some(captions) = self.captions {
            for (index, caption) in captions.into_iter().enumerate() {
                if caption.is_empty() {
                    continue;
                }
                let (row, col) = grid.spec().position(index);
                grid.set_caption(row, col, caption)?;
            }
        }
        Ok(grid)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
