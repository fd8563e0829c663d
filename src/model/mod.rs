//! Figure model types.
//!
//! Images are loaded into [`ImageSource`] values, placed into [`Grid`]s and
//! collected in a [`Document`] which owns everything until it is rendered.

mod document;
mod grid;
mod image;

pub use document::{Document, DocumentState, Length, Metadata};
pub use grid::{Cell, Grid, GridSpec};
pub use image::{Encoding, ImageSource};
