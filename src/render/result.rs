//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use super::Layout;

/// Result of rendering a document.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// The rendered document bytes
    pub content: Vec<u8>,

    /// MIME type of the content
    pub mime_type: &'static str,

    /// Figure statistics
    pub stats: FigureStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: Vec<u8>, mime_type: &'static str, stats: FigureStats) -> Self {
        Self {
            content,
            mime_type,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics about a rendered figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureStats {
    /// Number of grid sections
    pub grid_count: u32,

    /// Number of image cells
    pub cell_count: u32,

    /// Number of captions, row titles, column titles and grid titles
    pub label_count: u32,

    /// Figure width in points
    pub width_pt: f64,

    /// Figure height in points
    pub height_pt: f64,
}

impl FigureStats {
    /// Collect statistics from a computed layout.
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            grid_count: layout.grids.len() as u32,
            cell_count: layout.cell_count() as u32,
            label_count: layout.text_boxes().count() as u32,
            width_pt: layout.width,
            height_pt: layout.height,
        }
    }
}
