//! Document-level types.

use super::Grid;
use crate::backend::{FigureBackend, OutputFormat};
use crate::error::{Error, Result};
use crate::render::{self, RenderOptions, RenderResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Points per inch (PostScript / PDF user space unit).
const POINTS_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f64 = 25.4;

/// A physical length, stored in points.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Length(f64);

impl Length {
    /// Length in points (1/72 inch).
    pub fn points(pt: f64) -> Self {
        Self(pt)
    }

    /// Length in inches.
    pub fn inches(inches: f64) -> Self {
        Self(inches * POINTS_PER_INCH)
    }

    /// Length in millimetres.
    pub fn mm(mm: f64) -> Self {
        Self(mm / MM_PER_INCH * POINTS_PER_INCH)
    }

    /// Length in centimetres.
    pub fn cm(cm: f64) -> Self {
        Self::mm(cm * 10.0)
    }

    /// Value in points.
    pub fn to_points(self) -> f64 {
        self.0
    }

    /// Value in millimetres.
    pub fn to_mm(self) -> f64 {
        self.0 / POINTS_PER_INCH * MM_PER_INCH
    }

    /// Value in centimetres.
    pub fn to_cm(self) -> f64 {
        self.to_mm() / 10.0
    }
}

/// Lifecycle of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Grids may still be added
    Building,
    /// Output was produced; the grid list is frozen
    Rendered,
}

/// Document metadata written into the output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Figure title
    pub title: Option<String>,

    /// Author
    pub author: Option<String>,

    /// Subject / description
    pub subject: Option<String>,

    /// Creation date; omitted from the output when unset
    pub created: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.created.is_none()
    }
}

/// A figure document: one or more grids rendered at a fixed width.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Layout and output options
    pub options: RenderOptions,

    grids: Vec<Grid>,
    width: Length,
    format: OutputFormat,
    destination: Option<PathBuf>,
    state: DocumentState,
}

impl Document {
    /// Create an empty document.
    pub fn new(width: Length, format: OutputFormat) -> Result<Self> {
        let pt = width.to_points();
        if !pt.is_finite() || pt <= 0.0 {
            return Err(Error::InvalidWidth(pt));
        }
        Ok(Self {
            metadata: Metadata::default(),
            options: RenderOptions::default(),
            grids: Vec::new(),
            width,
            format,
            destination: None,
            state: DocumentState::Building,
        })
    }

    /// Create a document writing to `path`, with the format taken from its
    /// extension.
    pub fn for_path(width: Length, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = OutputFormat::from_path(&path)?;
        Ok(Self::new(width, format)?.with_destination(path))
    }

    /// Set the destination path.
    pub fn with_destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    /// Set render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append a grid section.
    pub fn add_grid(&mut self, grid: Grid) -> Result<()> {
        if self.state == DocumentState::Rendered {
            return Err(Error::AlreadyRendered);
        }
        self.grids.push(grid);
        Ok(())
    }

    /// Grid sections in order.
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    /// Number of grids.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    /// Check if the document has no grids.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Target width.
    pub fn width(&self) -> Length {
        self.width
    }

    /// Output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Destination path, if set.
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Render to memory and freeze the grid list.
    ///
    /// Rendering again produces byte-identical output.
    pub fn render(&mut self) -> Result<RenderResult> {
        let result = render::render_document(self)?;
        self.state = DocumentState::Rendered;
        Ok(result)
    }

    /// Render with a custom backend and freeze the grid list.
    pub fn render_with(&mut self, backend: &dyn FigureBackend) -> Result<RenderResult> {
        let result = render::render_with(self, backend)?;
        self.state = DocumentState::Rendered;
        Ok(result)
    }

    /// Render and write to the destination path.
    pub fn render_to_file(&mut self) -> Result<RenderResult> {
        let path = self
            .destination
            .clone()
            .ok_or_else(|| Error::Render("document has no destination path".into()))?;
        self.render_to(path)
    }

    /// Render and write to `path`.
    pub fn render_to(&mut self, path: impl AsRef<Path>) -> Result<RenderResult> {
        let path = path.as_ref();
        let result = self.render()?;
        std::fs::write(path, &result.content)
            .map_err(|e| Error::Render(format!("cannot write {}: {}", path.display(), e)))?;
        log::info!(
            "wrote {} ({} bytes, {} grids)",
            path.display(),
            result.content_len(),
            self.grids.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let width = Length::cm(18.0);
        assert!((width.to_points() - 510.236).abs() < 1e-3);
        assert!((width.to_mm() - 180.0).abs() < 1e-9);
        assert!((Length::inches(1.0).to_points() - 72.0).abs() < 1e-12);
        assert!((Length::points(72.0).to_cm() - 2.54).abs() < 1e-12);
    }

    #[test]
    fn test_document_rejects_bad_width() {
        assert!(matches!(
            Document::new(Length::cm(0.0), OutputFormat::Pdf),
            Err(Error::InvalidWidth(_))
        ));
        assert!(matches!(
            Document::new(Length::cm(-3.0), OutputFormat::Html),
            Err(Error::InvalidWidth(_))
        ));
        assert!(Document::new(Length::points(f64::NAN), OutputFormat::Pdf).is_err());
    }

    #[test]
    fn test_document_for_path() {
        let doc = Document::for_path(Length::cm(18.0), "ajax.pdf").unwrap();
        assert_eq!(doc.format(), OutputFormat::Pdf);
        assert_eq!(doc.destination(), Some(Path::new("ajax.pdf")));
        assert_eq!(doc.state(), DocumentState::Building);
        assert!(doc.is_empty());

        assert!(Document::for_path(Length::cm(18.0), "ajax.docx").is_err());
    }

    #[test]
    fn test_render_without_destination() {
        let mut doc = Document::new(Length::cm(10.0), OutputFormat::Pdf).unwrap();
        assert!(matches!(doc.render_to_file(), Err(Error::Render(_))));
    }

    #[test]
    fn test_metadata_is_empty() {
        assert!(Metadata::default().is_empty());
        assert!(!Metadata::with_title("Ajax").is_empty());
    }
}
