//! Figure layout shared by all backends.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! figure and y growing downwards. Backends with a bottom-up coordinate
//! system (PDF) flip y themselves.
//!
//! A grid with `R` rows, `C` columns and cell aspect `a` (height / width)
//! has a fixed part (spacing, title bands, caption bands) and a part that
//! scales with the cell width `cw`:
//!
//! ```text
//! width  = fixed_w + C * cw
//! height = fixed_h + R * cw * a
//! ```
//!
//! Vertical layouts solve `width = W` per grid. Horizontal layouts solve for
//! the common height `H` such that the grid widths plus gaps sum to `W`.

use crate::error::{Error, Result};
use crate::model::{Document, Grid};

use super::{LayoutDirection, RenderOptions};

/// Axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A positioned piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// Area the text is centered in
    pub rect: Rect,
    /// Text content
    pub text: String,
    /// Runs bottom to top (row titles)
    pub rotated: bool,
}

/// Placement of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBox {
    /// Row index within the grid
    pub row: usize,
    /// Column index within the grid
    pub col: usize,
    /// Image area
    pub image: Rect,
    /// Caption below the image
    pub caption: Option<TextBox>,
}

/// Placement of one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBox {
    /// Outer bounds including titles
    pub bounds: Rect,
    /// Grid title above everything else
    pub title: Option<TextBox>,
    /// Column titles above the first row
    pub col_titles: Vec<TextBox>,
    /// Row titles left of each row
    pub row_titles: Vec<TextBox>,
    /// Cells in row-major order
    pub cells: Vec<CellBox>,
}

/// Computed placement of a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Figure width in points (the configured width)
    pub width: f64,
    /// Figure height in points
    pub height: f64,
    /// Grids in document order
    pub grids: Vec<GridBox>,
}

impl Layout {
    /// Lay out every grid of a document.
    pub fn compute(doc: &Document) -> Result<Self> {
        if doc.is_empty() {
            return Err(Error::EmptyDocument);
        }
        let options = &doc.options;
        let width = doc.width().to_points();
        let metrics: Vec<GridMetrics> = doc
            .grids()
            .iter()
            .map(|g| GridMetrics::new(g, options))
            .collect::<Result<_>>()?;

        let gap = options.grid_spacing.to_points();
        let mut grids = Vec::with_capacity(metrics.len());

        let height = match options.direction {
            LayoutDirection::Vertical => {
                let mut y = 0.0;
                for (i, (grid, m)) in doc.grids().iter().zip(&metrics).enumerate() {
                    let cw = (width - m.fixed_w) / m.cols;
                    check_cell_width(cw, i)?;
                    let placed = m.place(grid, 0.0, y, cw);
                    y = placed.bounds.bottom() + gap;
                    grids.push(placed);
                }
                y - gap
            }
            LayoutDirection::Horizontal => {
                let n = metrics.len() as f64;
                let sum_k: f64 = metrics.iter().map(|m| m.k()).sum();
                let sum_fixed_w: f64 = metrics.iter().map(|m| m.fixed_w).sum();
                let sum_k_fixed_h: f64 = metrics.iter().map(|m| m.k() * m.fixed_h).sum();
                let height = (width - (n - 1.0) * gap - sum_fixed_w + sum_k_fixed_h) / sum_k;

                let mut x = 0.0;
                for (i, (grid, m)) in doc.grids().iter().zip(&metrics).enumerate() {
                    let cw = (height - m.fixed_h) / (m.rows * m.aspect);
                    check_cell_width(cw, i)?;
                    let placed = m.place(grid, x, 0.0, cw);
                    x = placed.bounds.right() + gap;
                    grids.push(placed);
                }
                height
            }
        };

        log::debug!(
            "layout: {} grids, {:.2} x {:.2} pt",
            grids.len(),
            width,
            height
        );

        Ok(Self {
            width,
            height,
            grids,
        })
    }

    /// Total number of placed cells.
    pub fn cell_count(&self) -> usize {
        self.grids.iter().map(|g| g.cells.len()).sum()
    }

    /// Every text box (titles and captions) in drawing order.
    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.grids.iter().flat_map(|g| {
            g.title
                .iter()
                .chain(g.col_titles.iter())
                .chain(g.row_titles.iter())
                .chain(g.cells.iter().filter_map(|c| c.caption.as_ref()))
        })
    }
}

fn check_cell_width(cw: f64, grid: usize) -> Result<()> {
    if !cw.is_finite() || cw <= 0.0 {
        return Err(Error::Render(format!(
            "figure width too small for grid {} (cell width {:.3} pt)",
            grid, cw
        )));
    }
    Ok(())
}

/// Size terms of one grid, see the module docs.
struct GridMetrics {
    rows: f64,
    cols: f64,
    aspect: f64,
    spacing: f64,
    band: f64,
    left: f64,
    title_h: f64,
    col_title_h: f64,
    caption_h: f64,
    fixed_w: f64,
    fixed_h: f64,
}

impl GridMetrics {
    fn new(grid: &Grid, options: &RenderOptions) -> Result<Self> {
        for cell in grid.cells() {
            cell.image.check().map_err(|msg| {
                Error::Render(format!(
                    "cell ({}, {}) {}: {}",
                    cell.row,
                    cell.col,
                    cell.image.display_path().display(),
                    msg
                ))
            })?;
        }

        let aspect = grid.cell_aspect();
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(Error::Render("grid contains an image with zero size".into()));
        }

        let rows = grid.rows() as f64;
        let cols = grid.cols() as f64;
        let spacing = options.cell_spacing.to_points();
        let band = options.label_band();

        let left = if grid.row_titles().is_some() {
            band + spacing
        } else {
            0.0
        };
        let title_h = if grid.title().is_some() { band } else { 0.0 };
        let col_title_h = if grid.col_titles().is_some() { band } else { 0.0 };
        let caption_h = if grid.has_captions() { band } else { 0.0 };

        let fixed_w = left + (cols - 1.0) * spacing;
        let fixed_h = title_h + col_title_h + rows * caption_h + (rows - 1.0) * spacing;

        Ok(Self {
            rows,
            cols,
            aspect,
            spacing,
            band,
            left,
            title_h,
            col_title_h,
            caption_h,
            fixed_w,
            fixed_h,
        })
    }

    /// Width gained per point of common height (horizontal layouts).
    fn k(&self) -> f64 {
        self.cols / (self.rows * self.aspect)
    }

    fn place(&self, grid: &Grid, x0: f64, y0: f64, cw: f64) -> GridBox {
        let ch = cw * self.aspect;
        let width = self.fixed_w + self.cols * cw;
        let height = self.fixed_h + self.rows * ch;
        let cells_x = x0 + self.left;
        let cells_w = width - self.left;

        let title = grid.title().map(|t| TextBox {
            rect: Rect::new(cells_x, y0, cells_w, self.band),
            text: t.to_string(),
            rotated: false,
        });

        let col_x = |col: usize| cells_x + col as f64 * (cw + self.spacing);
        let row_y = |row: usize| {
            y0 + self.title_h + self.col_title_h + row as f64 * (ch + self.caption_h + self.spacing)
        };

        let col_titles = grid
            .col_titles()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(col, text)| TextBox {
                rect: Rect::new(col_x(col), y0 + self.title_h, cw, self.band),
                text: text.clone(),
                rotated: false,
            })
            .collect();

        let row_titles = grid
            .row_titles()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(row, text)| TextBox {
                rect: Rect::new(x0, row_y(row), self.band, ch),
                text: text.clone(),
                rotated: true,
            })
            .collect();

        let cells = grid
            .cells()
            .map(|cell| {
                let image = Rect::new(col_x(cell.col), row_y(cell.row), cw, ch);
                let caption = cell.caption.as_ref().map(|text| TextBox {
                    rect: Rect::new(image.x, image.bottom(), cw, self.caption_h),
                    text: text.clone(),
                    rotated: false,
                });
                CellBox {
                    row: cell.row,
                    col: cell.col,
                    image,
                    caption,
                }
            })
            .collect();

        GridBox {
            bounds: Rect::new(x0, y0, width, height),
            title,
            col_titles,
            row_titles,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OutputFormat;
    use crate::model::{Encoding, ImageSource, Length};

    fn grid(rows: usize, cols: usize, w: u32, h: u32) -> Grid {
        let mut grid = Grid::new(rows, cols).unwrap();
        for row in 0..rows {
            for col in 0..cols {
                grid.set_image(row, col, ImageSource::solid(w, h, [0.5; 3], Encoding::Display))
                    .unwrap();
            }
        }
        grid
    }

    fn document(options: RenderOptions, grids: Vec<Grid>) -> Document {
        let mut doc = Document::new(Length::points(100.0), OutputFormat::Pdf)
            .unwrap()
            .with_options(options);
        for g in grids {
            doc.add_grid(g).unwrap();
        }
        doc
    }

    fn no_spacing() -> RenderOptions {
        RenderOptions::new()
            .with_cell_spacing(Length::points(0.0))
            .with_grid_spacing(Length::points(10.0))
    }

    #[test]
    fn test_vertical_fills_width() {
        let doc = document(no_spacing(), vec![grid(2, 4, 4, 4)]);
        let layout = Layout::compute(&doc).unwrap();

        assert_eq!(layout.cell_count(), 8);
        assert!((layout.width - 100.0).abs() < 1e-9);
        assert!((layout.height - 50.0).abs() < 1e-9);

        let last = &layout.grids[0].cells[7];
        assert_eq!((last.row, last.col), (1, 3));
        assert!((last.image.right() - 100.0).abs() < 1e-9);
        assert!((last.image.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_stacks_grids() {
        let doc = document(no_spacing(), vec![grid(1, 2, 4, 4), grid(1, 1, 4, 2)]);
        let layout = Layout::compute(&doc).unwrap();

        // 50 + 10 gap + 50
        assert!((layout.grids[1].bounds.y - 60.0).abs() < 1e-9);
        assert!((layout.height - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_shares_height() {
        let options = no_spacing().horizontal();
        let doc = document(options, vec![grid(1, 2, 4, 4), grid(2, 2, 4, 4)]);
        let layout = Layout::compute(&doc).unwrap();

        let a = &layout.grids[0].bounds;
        let b = &layout.grids[1].bounds;
        assert!((a.height - b.height).abs() < 1e-9);
        assert!((a.width + 10.0 + b.width - 100.0).abs() < 1e-9);
        assert!((b.right() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_spacing_and_labels_keep_total_width() {
        let mut g = grid(2, 3, 8, 4);
        g.set_row_titles(vec!["embree", "octree"]).unwrap();
        g.set_col_titles(vec!["1 spp", "2 spp", "4 spp"]).unwrap();
        g.set_caption(1, 2, "4 spp").unwrap();
        g.set_title("ajax");
        let options = RenderOptions::new().with_cell_spacing(Length::points(2.0));
        let doc = document(options, vec![g]);
        let layout = Layout::compute(&doc).unwrap();

        let gb = &layout.grids[0];
        assert!((gb.bounds.width - 100.0).abs() < 1e-9);
        assert!((gb.cells[2].image.right() - 100.0).abs() < 1e-9);
        assert_eq!(gb.row_titles.len(), 2);
        assert!(gb.row_titles[0].rotated);
        assert_eq!(gb.col_titles.len(), 3);
        assert!(gb.cells[5].caption.is_some());
        assert_eq!(layout.text_boxes().count(), 1 + 3 + 2 + 1);
        // column title sits directly above the first row
        assert!((gb.col_titles[0].rect.bottom() - gb.cells[0].image.y).abs() < 1e-9);
    }

    #[test]
    fn test_too_narrow_fails() {
        let options = RenderOptions::new().with_cell_spacing(Length::points(50.0));
        let doc = document(options, vec![grid(1, 3, 4, 4)]);
        assert!(matches!(Layout::compute(&doc), Err(Error::Render(_))));
    }

    #[test]
    fn test_zero_size_image_fails() {
        let doc = document(RenderOptions::new(), vec![grid(1, 1, 0, 0)]);
        assert!(matches!(Layout::compute(&doc), Err(Error::Render(_))));

        // a later malformed cell is caught even when the first is fine
        let mut mixed = grid(1, 2, 4, 4);
        mixed
            .set_image(0, 1, ImageSource::solid(0, 0, [0.0; 3], Encoding::Display))
            .unwrap();
        let doc = document(RenderOptions::new(), vec![mixed]);
        match Layout::compute(&doc) {
            Err(Error::Render(msg)) => assert!(msg.contains("cell (0, 1)")),
            other => panic!("expected Render, got {:?}", other.map(|l| l.cell_count())),
        }
    }

    #[test]
    fn test_empty_document() {
        let doc = document(RenderOptions::new(), vec![]);
        assert!(matches!(Layout::compute(&doc), Err(Error::EmptyDocument)));
    }
}
