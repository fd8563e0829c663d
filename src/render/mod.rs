//! Rendering module: layout plus dispatch to an output backend.

mod layout;
mod options;
mod result;

pub use layout::{CellBox, GridBox, Layout, Rect, TextBox};
pub use options::{LayoutDirection, RenderOptions};
pub use result::{FigureStats, RenderResult};

use crate::backend::{BackendRegistry, FigureBackend};
use crate::error::{Error, Result};
use crate::model::Document;

/// Render a document with the backend registered for its output format.
///
/// Does not change the document state; use [`Document::render`] for that.
pub fn render_document(doc: &Document) -> Result<RenderResult> {
    let registry = BackendRegistry::with_defaults();
    let backend = registry.get_by_name(doc.format().name()).ok_or_else(|| {
        Error::Render(format!("no backend for format: {}", doc.format().name()))
    })?;
    render_with(doc, backend.as_ref())
}

/// Render a document with an explicit backend.
pub fn render_with(doc: &Document, backend: &dyn FigureBackend) -> Result<RenderResult> {
    if doc.is_empty() {
        return Err(Error::EmptyDocument);
    }
    for grid in doc.grids() {
        grid.validate()?;
    }

    let layout = Layout::compute(doc)?;
    log::info!(
        "rendering {} cells in {} grids with {} backend",
        layout.cell_count(),
        layout.grids.len(),
        backend.name()
    );

    let content = backend.render(doc, &layout)?;
    Ok(RenderResult::new(
        content,
        backend.mime_type(),
        FigureStats::from_layout(&layout),
    ))
}
