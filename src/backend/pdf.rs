//! Single-page PDF output built with lopdf.

use super::FigureBackend;
use crate::color::quantize_rgb8;
use crate::error::{Error, Result};
use crate::model::{Document, ImageSource, Metadata};
use crate::render::{Layout, TextBox};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use std::io::Write;

/// Font resource name of the label font.
const FONT_NAME: &str = "F1";

/// Average Helvetica glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.5;

/// Baseline offset from the vertical center, as a fraction of the font size.
const BASELINE_DROP: f64 = 0.35;

/// PDF backend.
///
/// Every cell becomes one `DeviceRGB` 8-bit image XObject named `Im{n}`,
/// numbered in row-major order across all grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfBackend;

impl PdfBackend {
    /// Create a new PDF backend.
    pub fn new() -> Self {
        Self
    }
}

impl FigureBackend for PdfBackend {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, doc: &Document, layout: &Layout) -> Result<Vec<u8>> {
        let mut pdf = lopdf::Document::with_version("1.5");
        let page_height = layout.height;
        let font_size = doc.options.font_size;

        let mut xobjects = Dictionary::new();
        let mut ops = Vec::new();
        let mut index = 0usize;

        for (grid, placed) in doc.grids().iter().zip(&layout.grids) {
            for (cell, cell_box) in grid.cells().zip(&placed.cells) {
                let name = format!("Im{}", index);
                let id = add_image(&mut pdf, &cell.image, doc.options.pixelated)?;
                xobjects.set(name.as_str(), id);

                let r = cell_box.image;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        real(r.width),
                        real(0.0),
                        real(0.0),
                        real(r.height),
                        real(r.x),
                        real(page_height - r.bottom()),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                ops.push(Operation::new("Q", vec![]));

                log::debug!(
                    "cell ({}, {}) of {}x{} px at {:.2},{:.2}",
                    cell.row,
                    cell.col,
                    cell.image.width,
                    cell.image.height,
                    r.x,
                    r.y
                );
                index += 1;
            }
        }

        for text in layout.text_boxes() {
            push_text(&mut ops, text, font_size, page_height);
        }

        let content = Content { operations: ops }.encode()?;
        let content_id = pdf.add_object(Stream::new(Dictionary::new(), content));

        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
            "XObject" => xobjects,
        });

        let pages_id = pdf.new_object_id();
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(layout.width), real(page_height)],
            "Contents" => content_id,
            "Resources" => resources_id,
        });

        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1_i64,
            }),
        );

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);

        if !doc.metadata.is_empty() {
            let info_id = pdf.add_object(info_dictionary(&doc.metadata));
            pdf.trailer.set("Info", info_id);
        }

        let mut buffer = Vec::new();
        pdf.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn add_image(pdf: &mut lopdf::Document, image: &ImageSource, pixelated: bool) -> Result<ObjectId> {
    let rgb = quantize_rgb8(image);
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Interpolate" => !pixelated,
        "Filter" => "FlateDecode",
    };
    Ok(pdf.add_object(Stream::new(dict, deflate(&rgb)?)))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::Render(format!("image compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Error::Render(format!("image compression failed: {}", e)))
}

/// Append a centered label. Rotated labels run bottom to top.
fn push_text(ops: &mut Vec<Operation>, text: &TextBox, size: f64, page_height: f64) {
    let width = text_width(&text.text, size);
    let r = &text.rect;
    let cx = r.x + r.width / 2.0;
    let cy = page_height - (r.y + r.height / 2.0);

    let matrix = if text.rotated {
        [0.0, 1.0, -1.0, 0.0, cx + BASELINE_DROP * size, cy - width / 2.0]
    } else {
        [1.0, 0.0, 0.0, 1.0, cx - width / 2.0, cy - BASELINE_DROP * size]
    };

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_NAME.as_bytes().to_vec()), real(size)],
    ));
    ops.push(Operation::new("Tm", matrix.iter().map(|v| real(*v)).collect()));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(win_ansi(&text.text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * GLYPH_ADVANCE * size
}

/// Encode text for the standard Helvetica font. Characters outside Latin-1
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b >= 0x20 => b,
            _ => b'?',
        })
        .collect()
}

fn info_dictionary(metadata: &Metadata) -> Dictionary {
    let mut info = Dictionary::new();
    if let Some(title) = &metadata.title {
        info.set("Title", Object::string_literal(win_ansi(title)));
    }
    if let Some(author) = &metadata.author {
        info.set("Author", Object::string_literal(win_ansi(author)));
    }
    if let Some(subject) = &metadata.subject {
        info.set("Subject", Object::string_literal(win_ansi(subject)));
    }
    if let Some(created) = &metadata.created {
        let date = created.format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("CreationDate", Object::string_literal(date));
    }
    info.set("Producer", Object::string_literal("gridfig"));
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OutputFormat;
    use crate::model::{Encoding, Grid, Length};
    use chrono::TimeZone;

    fn sample_document(rows: usize, cols: usize) -> Document {
        let mut grid = Grid::new(rows, cols).unwrap();
        for row in 0..rows {
            for col in 0..cols {
                let v = (row * cols + col) as f32 / (rows * cols) as f32;
                grid.set_image(row, col, ImageSource::solid(4, 4, [v; 3], Encoding::Display))
                    .unwrap();
            }
        }
        let mut doc = Document::new(Length::cm(18.0), OutputFormat::Pdf).unwrap();
        doc.add_grid(grid).unwrap();
        doc
    }

    fn render(doc: &Document) -> Vec<u8> {
        let layout = Layout::compute(doc).unwrap();
        PdfBackend::new().render(doc, &layout).unwrap()
    }

    #[test]
    fn test_pdf_header_and_media_box() {
        let doc = sample_document(1, 2);
        let bytes = render(&doc);
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        let pages = pdf.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = pages[&1];
        let page = pdf.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap() as f64;
        assert!((width - Length::cm(18.0).to_points()).abs() < 0.01);
    }

    #[test]
    fn test_draw_order_is_row_major() {
        let doc = sample_document(2, 3);
        let pdf = lopdf::Document::load_mem(&render(&doc)).unwrap();
        let page_id = pdf.get_pages()[&1];
        let content = pdf.get_and_decode_page_content(page_id).unwrap();

        let names: Vec<String> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Do")
            .map(|op| String::from_utf8(op.operands[0].as_name().unwrap().to_vec()).unwrap())
            .collect();
        assert_eq!(names, vec!["Im0", "Im1", "Im2", "Im3", "Im4", "Im5"]);
    }

    #[test]
    fn test_info_only_with_metadata() {
        let doc = sample_document(1, 1);
        let pdf = lopdf::Document::load_mem(&render(&doc)).unwrap();
        assert!(pdf.trailer.get(b"Info").is_err());

        let mut doc = sample_document(1, 1);
        doc.metadata = Metadata::with_title("Ajax");
        doc.metadata.created = Some(chrono::Utc.with_ymd_and_hms(2021, 5, 1, 12, 0, 0).unwrap());
        let bytes = render(&doc);
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(pdf.trailer.get(b"Info").is_ok());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("D:20210501120000Z"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let doc = sample_document(2, 2);
        assert_eq!(render(&doc), render(&doc));
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("4 spp"), b"4 spp".to_vec());
        assert_eq!(win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("\u{3b1}\n"), b"??".to_vec());
    }

    #[test]
    fn test_text_width() {
        assert!((text_width("abcd", 10.0) - 20.0).abs() < 1e-12);
        assert_eq!(text_width("", 7.0), 0.0);
    }
}
