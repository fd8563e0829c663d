//! Output backends for figure documents.
//!
//! A backend turns a laid-out [`Document`] into bytes. Backends are looked up
//! by name or by file extension through a [`BackendRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use gridfig::backend::{BackendRegistry, HtmlBackend};
//! use std::sync::Arc;
//!
//! let mut registry = BackendRegistry::new();
//! registry.register(Arc::new(HtmlBackend::new()));
//! assert!(registry.supports("html"));
//! ```

mod html;
mod pdf;

pub use html::HtmlBackend;
pub use pdf::PdfBackend;

use crate::error::{Error, Result};
use crate::model::Document;
use crate::render::Layout;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Output format of a figure document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single-page PDF
    #[default]
    Pdf,

    /// Self-contained HTML
    Html,
}

impl OutputFormat {
    /// Backend name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
        }
    }

    /// Default file extension.
    pub fn extension(&self) -> &'static str {
        self.name()
    }

    /// Format for a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "html" | "htm" => Ok(OutputFormat::Html),
            other => Err(Error::Render(format!("unsupported output format: {}", other))),
        }
    }

    /// Format implied by a file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            Error::Render(format!(
                "cannot infer output format of {}: no extension",
                path.display()
            ))
        })?;
        Self::from_extension(ext)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for figure backends.
///
/// Implement this trait to add support for a new output format.
pub trait FigureBackend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this backend.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    /// Write a laid-out document.
    ///
    /// Output must depend only on the document and layout so that rendering
    /// twice yields identical bytes.
    fn render(&self, doc: &Document, layout: &Layout) -> Result<Vec<u8>>;

    /// Check if this backend supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for figure backends.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn FigureBackend>>,
    by_name: HashMap<String, Arc<dyn FigureBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF and HTML backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfBackend::new()));
        registry.register(Arc::new(HtmlBackend::new()));
        registry
    }

    /// Register a backend for all its supported extensions.
    pub fn register(&mut self, backend: Arc<dyn FigureBackend>) {
        for ext in backend.supported_extensions() {
            self.backends.insert(ext.to_lowercase(), backend.clone());
        }
        self.by_name.insert(backend.name().to_lowercase(), backend);
    }

    /// Get a backend by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FigureBackend>> {
        self.backends.get(&ext.to_lowercase()).cloned()
    }

    /// Get a backend by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FigureBackend>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.backends.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.backends.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Get the backend for a destination path.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn FigureBackend>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Render(format!("{} has no extension", path.display())))?;

        self.get_by_extension(ext)
            .ok_or_else(|| Error::Render(format!("no backend for extension: {}", ext)))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
