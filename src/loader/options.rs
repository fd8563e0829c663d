//! Loading options and configuration.

use crate::model::Encoding;

/// Options for loading images.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Decode several images on the rayon pool
    pub parallel: bool,

    /// Force the encoding flag instead of detecting it from the format
    pub encoding: Option<Encoding>,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel loading.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel loading.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Treat every loaded image as having the given encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            encoding: None,
        }
    }
}
