//! Image loading module.

mod image_loader;
mod options;

pub use image_loader::ImageLoader;
pub use options::LoadOptions;
