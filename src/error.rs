//! Error types for gridfig library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gridfig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building a figure.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An input image path does not resolve to a file.
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A path exists but could not be read (a directory, missing permissions).
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The image format is unsupported or the data is corrupt.
    #[error("Failed to decode {}: {message}", .path.display())]
    Decode {
        /// Path of the image (`<memory>` for byte input)
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// The number of images does not fill the grid exactly.
    #[error("Grid of {rows}x{cols} needs {} images, got {images}", .rows * .cols)]
    ShapeMismatch {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
        /// Number of images supplied
        images: usize,
    },

    /// Render was attempted on a document without grids.
    #[error("Document has no grids to render")]
    EmptyDocument,

    /// Error while laying out or writing the output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Grid dimensions or titles are invalid.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Target width must be positive.
    #[error("Invalid figure width: {0} pt (must be > 0)")]
    InvalidWidth(f64),

    /// Cell position is outside the grid.
    #[error("Cell ({row}, {col}) is out of range (grid is {rows}x{cols})")]
    CellOutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
    },

    /// A grid cell has no image assigned.
    #[error("Cell ({row}, {col}) has no image")]
    MissingCell {
        /// Row of the empty cell
        row: usize,
        /// Column of the empty cell
        col: usize,
    },

    /// Grids cannot be added once the document was rendered.
    #[error("Document was already rendered; no further grids may be added")]
    AlreadyRendered,

    /// Figure manifest could not be read.
    #[error("Manifest error: {0}")]
    Manifest(String),
}

impl Error {
    /// Create a decode error for the given path.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map a failed read of `path`; a missing file becomes `NotFound`.
    pub fn read(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path),
            _ => Error::Read { path, source: err },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Render(format!("PDF error: {}", err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::decode("<memory>", err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Manifest(err.to_string())
    }
}
