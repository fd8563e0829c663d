//! Grid assembly from flat image lists.
//!
//! Images are placed row-major: the image at flat index `col + cols * row`
//! lands in cell `(row, col)`. Display conversion happens here, once per
//! image, at insertion time (see [`Conversion`]).

use crate::color::DisplayTransform;
use crate::error::{Error, Result};
use crate::model::{Grid, GridSpec, ImageSource};

/// Conversion applied to each image as it is inserted into a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// Insert images unchanged
    None,
    /// Encode linear images for display; display-encoded images pass through
    LinearToDisplay(DisplayTransform),
}

impl Default for Conversion {
    fn default() -> Self {
        Conversion::LinearToDisplay(DisplayTransform::default())
    }
}

impl Conversion {
    /// Convert one image according to the policy.
    pub fn apply(&self, image: ImageSource) -> ImageSource {
        match self {
            Conversion::None => image,
            Conversion::LinearToDisplay(transform) if image.is_linear() => transform.apply(&image),
            Conversion::LinearToDisplay(_) => {
                log::debug!(
                    "{} is already display encoded, inserting as-is",
                    image.display_path().display()
                );
                image
            }
        }
    }
}

/// Build a grid, converting linear images with the default sRGB transform.
///
/// Fails with `ShapeMismatch` unless `images.len() == rows * cols`.
pub fn build_grid(rows: usize, cols: usize, images: Vec<ImageSource>) -> Result<Grid> {
    build_grid_with(rows, cols, images, Conversion::default())
}

/// Build a grid with an explicit conversion policy.
pub fn build_grid_with(
    rows: usize,
    cols: usize,
    images: Vec<ImageSource>,
    conversion: Conversion,
) -> Result<Grid> {
    let spec = GridSpec::new(rows, cols)?;
    if images.len() != spec.len() {
        return Err(Error::ShapeMismatch {
            rows,
            cols,
            images: images.len(),
        });
    }

    let mut grid = Grid::new(rows, cols)?;
    let mut first_size = None;
    for (index, image) in images.into_iter().enumerate() {
        let (row, col) = spec.position(index);

        let size = (image.width, image.height);
        match first_size {
            None => first_size = Some(size),
            Some(first) if first != size => log::warn!(
                "{} is {}x{}, first image of the grid is {}x{}; it will be scaled into the cell",
                image.display_path().display(),
                size.0,
                size.1,
                first.0,
                first.1
            ),
            Some(_) => {}
        }

        grid.set_image(row, col, conversion.apply(image))?;
    }

    log::debug!("assembled {}x{} grid", rows, cols);
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Encoding;

    /// 1x1 image whose red channel encodes its flat index.
    fn tagged(index: usize, encoding: Encoding) -> ImageSource {
        ImageSource::solid(1, 1, [index as f32, 0.0, 0.0], encoding)
    }

    #[test]
    fn test_row_major_placement_non_square() {
        let images: Vec<_> = (0..28).map(|i| tagged(i, Encoding::Display)).collect();
        let grid = build_grid(2, 14, images).unwrap();

        for row in 0..2 {
            for col in 0..14 {
                let cell = grid.get(row, col).unwrap();
                assert_eq!(cell.image.data[0], (col + 14 * row) as f32);
                assert_eq!((cell.row, cell.col), (row, col));
            }
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let images: Vec<_> = (0..27).map(|i| tagged(i, Encoding::Display)).collect();
        let err = build_grid(2, 14, images).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                rows: 2,
                cols: 14,
                images: 27
            }
        ));
    }

    #[test]
    fn test_zero_rows_rejected() {
        assert!(matches!(
            build_grid(0, 3, Vec::new()),
            Err(Error::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_linear_images_converted_once() {
        let linear = ImageSource::solid(1, 1, [1.0, 0.0, 0.0], Encoding::Linear);
        let display = ImageSource::solid(1, 1, [0.25, 0.0, 0.0], Encoding::Display);
        let grid = build_grid(1, 2, vec![linear, display]).unwrap();

        let first = &grid.get(0, 0).unwrap().image;
        assert_eq!(first.encoding, Encoding::Display);
        assert!((first.data[0] - 1.0).abs() < 1e-6);

        // already display encoded: untouched
        assert_eq!(grid.get(0, 1).unwrap().image.data[0], 0.25);
    }

    #[test]
    fn test_conversion_none_keeps_linear() {
        let linear = ImageSource::solid(1, 1, [0.18; 3], Encoding::Linear);
        let grid = build_grid_with(1, 1, vec![linear], Conversion::None).unwrap();
        let image = &grid.get(0, 0).unwrap().image;
        assert_eq!(image.encoding, Encoding::Linear);
        assert_eq!(image.data[0], 0.18);
    }

    #[test]
    fn test_shared_source_reused() {
        let source = ImageSource::solid(2, 2, [0.5; 3], Encoding::Linear);
        let a = build_grid(1, 1, vec![source.clone()]).unwrap();
        let b = build_grid(1, 1, vec![source.clone()]).unwrap();
        assert_eq!(a.get(0, 0).unwrap().image, b.get(0, 0).unwrap().image);
        assert!(source.is_linear());
    }
}
