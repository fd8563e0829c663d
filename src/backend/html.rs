//! Self-contained HTML output.
//!
//! Cells are absolutely positioned `<img>` elements sized in millimetres, so
//! the page prints at the configured figure width.

use super::{escape_html, FigureBackend};
use crate::color::quantize_rgb8;
use crate::error::{Error, Result};
use crate::model::{Document, ImageSource, Length};
use crate::render::{Layout, Rect, TextBox};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::fmt::Write as _;
use std::path::Path;

/// HTML backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlBackend;

impl HtmlBackend {
    /// Create a new HTML backend.
    pub fn new() -> Self {
        Self
    }
}

impl FigureBackend for HtmlBackend {
    fn name(&self) -> &str {
        "html"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn mime_type(&self) -> &'static str {
        "text/html"
    }

    fn render(&self, doc: &Document, layout: &Layout) -> Result<Vec<u8>> {
        let options = &doc.options;
        let mut out = String::new();

        let title = doc
            .metadata
            .title
            .as_deref()
            .or_else(|| doc.grids().first().and_then(|g| g.title()))
            .unwrap_or("figure");

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape_html(title));
        if let Some(author) = &doc.metadata.author {
            let _ = writeln!(out, "<meta name=\"author\" content=\"{}\">", escape_html(author));
        }
        out.push_str("<style>\n");
        let _ = writeln!(
            out,
            ".figure {{ position: relative; width: {}mm; height: {}mm; }}",
            mm(layout.width),
            mm(layout.height)
        );
        let _ = writeln!(
            out,
            ".figure img {{ position: absolute; display: block;{} }}",
            if options.pixelated {
                " image-rendering: pixelated;"
            } else {
                ""
            }
        );
        let _ = writeln!(
            out,
            ".figure .label {{ position: absolute; display: flex; align-items: center; \
             justify-content: center; white-space: nowrap; \
             font-family: Helvetica, Arial, sans-serif; font-size: {}pt; }}",
            fmt(options.font_size)
        );
        out.push_str(".figure .rotated { transform: rotate(-90deg); }\n");
        out.push_str("</style>\n</head>\n<body>\n<div class=\"figure\">\n");

        if let Some(dir) = &options.image_dir {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::Render(format!("cannot create image directory {}: {}", dir.display(), e))
            })?;
        }

        for (g, (grid, placed)) in doc.grids().iter().zip(&layout.grids).enumerate() {
            for (cell, cell_box) in grid.cells().zip(&placed.cells) {
                let src = match &options.image_dir {
                    Some(dir) => {
                        let file_name = format!("g{}_r{}_c{}.png", g, cell.row, cell.col);
                        write_png(&dir.join(&file_name), &cell.image)?;
                        format!("{}{}", options.image_path_prefix, file_name)
                    }
                    None => format!(
                        "data:image/png;base64,{}",
                        STANDARD.encode(encode_png(&cell.image)?)
                    ),
                };

                let alt = match &cell.caption {
                    Some(caption) => caption.clone(),
                    None => cell.image.display_path().display().to_string(),
                };
                let _ = writeln!(
                    out,
                    "<img src=\"{}\" alt=\"{}\" style=\"{}\">",
                    escape_html(&src),
                    escape_html(&alt),
                    position(&cell_box.image)
                );
            }
        }

        for text in layout.text_boxes() {
            push_label(&mut out, text);
        }

        out.push_str("</div>\n</body>\n</html>\n");
        Ok(out.into_bytes())
    }
}

fn push_label(out: &mut String, text: &TextBox) {
    let (class, rect) = if text.rotated {
        // Swap the box around its center; the CSS rotation swaps it back.
        let r = &text.rect;
        let cx = r.x + r.width / 2.0;
        let cy = r.y + r.height / 2.0;
        let swapped = Rect::new(cx - r.height / 2.0, cy - r.width / 2.0, r.height, r.width);
        ("label rotated", swapped)
    } else {
        ("label", text.rect)
    };
    let _ = writeln!(
        out,
        "<div class=\"{}\" style=\"{}\">{}</div>",
        class,
        position(&rect),
        escape_html(&text.text)
    );
}

fn position(rect: &Rect) -> String {
    format!(
        "left: {}mm; top: {}mm; width: {}mm; height: {}mm;",
        mm(rect.x),
        mm(rect.y),
        mm(rect.width),
        mm(rect.height)
    )
}

fn mm(points: f64) -> String {
    fmt(Length::points(points).to_mm())
}

/// Fixed precision keeps the output byte-stable.
fn fmt(v: f64) -> String {
    let s = format!("{:.3}", v);
    if s == "-0.000" {
        "0.000".to_string()
    } else {
        s
    }
}

fn encode_png(image: &ImageSource) -> Result<Vec<u8>> {
    let rgb = quantize_rgb8(image);
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive);
    encoder
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| {
            Error::Render(format!(
                "cannot encode {} as PNG: {}",
                image.display_path().display(),
                e
            ))
        })?;
    Ok(buffer)
}

fn write_png(path: &Path, image: &ImageSource) -> Result<()> {
    let png = encode_png(image)?;
    std::fs::write(path, png)
        .map_err(|e| Error::Render(format!("cannot write {}: {}", path.display(), e)))?;
    log::debug!("wrote cell image {}", path.display());
    Ok(())
}
