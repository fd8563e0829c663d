//! Grid and cell types.

use super::ImageSource;
use crate::error::{Error, Result};

/// Shape of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    /// Number of rows (>= 1)
    pub rows: usize,
    /// Number of columns (>= 1)
    pub cols: usize,
}

impl GridSpec {
    /// Create a grid shape; both dimensions must be at least one.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGrid(format!(
                "grid needs at least one row and one column, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self { rows, cols })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false; a valid spec has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major flat index of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> usize {
        col + self.cols * row
    }

    /// `(row, col)` of a row-major flat index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    fn check(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::CellOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.index(row, col))
    }
}

/// One populated grid position.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Image shown in the cell (already converted for display)
    pub image: ImageSource,
    /// Optional caption drawn below the image
    pub caption: Option<String>,
}

/// A rows x cols arrangement of image cells.
#[derive(Debug, Clone)]
pub struct Grid {
    spec: GridSpec,
    cells: Vec<Option<Cell>>,
    row_titles: Option<Vec<String>>,
    col_titles: Option<Vec<String>>,
    title: Option<String>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let spec = GridSpec::new(rows, cols)?;
        Ok(Self {
            spec,
            cells: vec![None; spec.len()],
            row_titles: None,
            col_titles: None,
            title: None,
        })
    }

    /// Grid shape.
    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.spec.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.spec.cols
    }

    /// Place an image at `(row, col)`, replacing any previous one.
    pub fn set_image(&mut self, row: usize, col: usize, image: ImageSource) -> Result<()> {
        let index = self.spec.check(row, col)?;
        let caption = self.cells[index].take().and_then(|c| c.caption);
        self.cells[index] = Some(Cell {
            row,
            col,
            image,
            caption,
        });
        Ok(())
    }

    /// Set the caption of a populated cell.
    pub fn set_caption(&mut self, row: usize, col: usize, caption: impl Into<String>) -> Result<()> {
        let index = self.spec.check(row, col)?;
        match self.cells[index].as_mut() {
            Some(cell) => {
                cell.caption = Some(caption.into());
                Ok(())
            }
            None => Err(Error::MissingCell { row, col }),
        }
    }

    /// Cell at `(row, col)` if populated.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        let index = self.spec.check(row, col).ok()?;
        self.cells[index].as_ref()
    }

    /// Populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Number of populated cells.
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// First empty position in row-major order.
    pub fn first_missing(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|c| c.is_none())
            .map(|i| self.spec.position(i))
    }

    /// Fail with `MissingCell` unless every position has an image.
    pub fn validate(&self) -> Result<()> {
        match self.first_missing() {
            Some((row, col)) => Err(Error::MissingCell { row, col }),
            None => Ok(()),
        }
    }

    /// Set one title per row, drawn left of the row.
    pub fn set_row_titles<S: Into<String>>(&mut self, titles: Vec<S>) -> Result<()> {
        if titles.len() != self.spec.rows {
            return Err(Error::InvalidGrid(format!(
                "{} row titles for {} rows",
                titles.len(),
                self.spec.rows
            )));
        }
        self.row_titles = Some(titles.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Set one title per column, drawn above the column.
    pub fn set_col_titles<S: Into<String>>(&mut self, titles: Vec<S>) -> Result<()> {
        if titles.len() != self.spec.cols {
            return Err(Error::InvalidGrid(format!(
                "{} column titles for {} columns",
                titles.len(),
                self.spec.cols
            )));
        }
        self.col_titles = Some(titles.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Set the grid title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Row titles, if set.
    pub fn row_titles(&self) -> Option<&[String]> {
        self.row_titles.as_deref()
    }

    /// Column titles, if set.
    pub fn col_titles(&self) -> Option<&[String]> {
        self.col_titles.as_deref()
    }

    /// Grid title, if set.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Whether any cell has a caption.
    pub fn has_captions(&self) -> bool {
        self.cells().any(|c| c.caption.is_some())
    }

    /// Height / width ratio used for every cell: that of the first image.
    pub fn cell_aspect(&self) -> f64 {
        self.cells().next().map(|c| c.image.aspect()).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Encoding;

    fn tile() -> ImageSource {
        ImageSource::solid(4, 2, [0.5; 3], Encoding::Display)
    }

    #[test]
    fn test_spec_rejects_zero() {
        assert!(matches!(GridSpec::new(0, 3), Err(Error::InvalidGrid(_))));
        assert!(matches!(GridSpec::new(3, 0), Err(Error::InvalidGrid(_))));
    }

    #[test]
    fn test_spec_index_round_trip() {
        let spec = GridSpec::new(2, 14).unwrap();
        assert_eq!(spec.index(1, 3), 17);
        assert_eq!(spec.position(17), (1, 3));
        assert_eq!(spec.len(), 28);
    }

    #[test]
    fn test_set_image_out_of_range() {
        let mut grid = Grid::new(2, 2).unwrap();
        let err = grid.set_image(2, 0, tile()).unwrap_err();
        assert!(matches!(err, Error::CellOutOfRange { row: 2, col: 0, .. }));
    }

    #[test]
    fn test_validate_reports_first_missing() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set_image(0, 0, tile()).unwrap();
        grid.set_image(0, 1, tile()).unwrap();
        grid.set_image(1, 1, tile()).unwrap();
        assert!(matches!(
            grid.validate(),
            Err(Error::MissingCell { row: 1, col: 0 })
        ));
        grid.set_image(1, 0, tile()).unwrap();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.populated(), 4);
    }

    #[test]
    fn test_caption_requires_image() {
        let mut grid = Grid::new(1, 2).unwrap();
        assert!(grid.set_caption(0, 0, "1 spp").is_err());
        grid.set_image(0, 0, tile()).unwrap();
        grid.set_caption(0, 0, "1 spp").unwrap();
        assert_eq!(grid.get(0, 0).unwrap().caption.as_deref(), Some("1 spp"));
        assert!(grid.has_captions());
    }

    #[test]
    fn test_replacing_image_keeps_caption() {
        let mut grid = Grid::new(1, 1).unwrap();
        grid.set_image(0, 0, tile()).unwrap();
        grid.set_caption(0, 0, "embree").unwrap();
        grid.set_image(0, 0, tile()).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().caption.as_deref(), Some("embree"));
    }

    #[test]
    fn test_titles_must_match_shape() {
        let mut grid = Grid::new(2, 3).unwrap();
        assert!(grid.set_row_titles(vec!["embree"]).is_err());
        grid.set_row_titles(vec!["embree", "octree"]).unwrap();
        assert!(grid.set_col_titles(vec!["1", "2"]).is_err());
        grid.set_col_titles(vec!["1", "2", "4"]).unwrap();
        assert_eq!(grid.row_titles().unwrap()[1], "octree");
        assert_eq!(grid.col_titles().unwrap().len(), 3);
    }

    #[test]
    fn test_cell_aspect_from_first_image() {
        let mut grid = Grid::new(1, 2).unwrap();
        assert_eq!(grid.cell_aspect(), 1.0);
        grid.set_image(0, 1, tile()).unwrap();
        assert_eq!(grid.cell_aspect(), 0.5);
    }
}
