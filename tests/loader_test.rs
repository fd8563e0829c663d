//! Integration tests for image loading and display conversion.

use gridfig::{
    build_grid, detect_format_from_path, linear_to_display, quantize_rgb8, Encoding, Error,
    ImageLoader, LoadOptions, SourceFormat,
};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::path::{Path, PathBuf};

fn write_exr(path: &Path, value: f32) {
    let img: ImageBuffer<Rgb<f32>, Vec<f32>> =
        ImageBuffer::from_pixel(2, 2, Rgb([value, value * 0.5, 0.0]));
    DynamicImage::ImageRgb32F(img)
        .save_with_format(path, ImageFormat::OpenExr)
        .unwrap();
}

fn write_png(path: &Path, width: u32) {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, 2, Rgb([10, 20, 30]));
    DynamicImage::ImageRgb8(img).save(path).unwrap();
}

#[test]
fn test_exr_is_linear_and_unclamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cornell_box.exr");
    write_exr(&path, 2.5);

    assert_eq!(detect_format_from_path(&path).unwrap(), SourceFormat::OpenExr);

    let image = ImageLoader::new().load(&path).unwrap();
    assert_eq!(image.encoding, Encoding::Linear);
    assert_eq!(image.path.as_deref(), Some(path.as_path()));
    let px = image.pixel(0, 0).unwrap();
    assert!((px[0] - 2.5).abs() < 1e-3);
    assert!((px[1] - 1.25).abs() < 1e-3);

    // Conversion clamps for display.
    let display = linear_to_display(&image);
    assert_eq!(display.encoding, Encoding::Display);
    assert!((display.pixel(0, 0).unwrap()[0] - 1.0).abs() < 1e-6);
    assert_eq!(quantize_rgb8(&display)[..3], [255, 255, 0]);
}

#[test]
fn test_load_all_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (1..=12)
        .map(|w| {
            let path = dir.path().join(format!("variant_{:02}.png", w));
            write_png(&path, w);
            path
        })
        .collect();

    for options in [LoadOptions::new(), LoadOptions::new().sequential()] {
        let images = ImageLoader::with_options(options).load_all(&paths).unwrap();
        let widths: Vec<u32> = images.iter().map(|i| i.width).collect();
        assert_eq!(widths, (1..=12).collect::<Vec<u32>>());
        for (image, path) in images.iter().zip(&paths) {
            assert_eq!(image.path.as_ref(), Some(path));
        }
    }
}

#[test]
fn test_corrupt_file_fails_with_decode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.exr");
    std::fs::write(&path, b"v/1\x01 but truncated").unwrap();

    match ImageLoader::new().load(&path) {
        Err(Error::Decode { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Decode, got {:?}", other.map(|i| i.width)),
    }
}

#[test]
fn test_first_error_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    write_png(&good, 2);
    let first_missing = dir.path().join("a_missing.png");
    let second_missing = dir.path().join("b_missing.png");

    let paths = vec![good, first_missing.clone(), second_missing];
    match ImageLoader::new().load_all(&paths) {
        Err(Error::NotFound(p)) => assert_eq!(p, first_missing),
        other => panic!("expected NotFound, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn test_mixed_encodings_in_one_grid() {
    let dir = tempfile::tempdir().unwrap();
    let exr = dir.path().join("render.exr");
    let png = dir.path().join("reference.png");
    write_exr(&exr, 0.0);
    write_png(&png, 2);

    let images = ImageLoader::new().load_all(&[exr, png]).unwrap();
    let grid = build_grid(1, 2, images).unwrap();

    let converted = &grid.get(0, 0).unwrap().image;
    assert_eq!(converted.encoding, Encoding::Display);
    assert!(quantize_rgb8(converted).iter().all(|&v| v == 0));

    // Display-encoded input is not encoded a second time.
    let reference = &grid.get(0, 1).unwrap().image;
    assert_eq!(quantize_rgb8(reference)[..3], [10, 20, 30]);
}

#[test]
fn test_unreadable_path_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ajax.ao.spp1.embree.exr");
    std::fs::create_dir(&path).unwrap();

    let err = ImageLoader::new().load(&path).unwrap_err();
    assert!(matches!(err, Error::Read { .. }), "got {:?}", err);
    assert!(err.to_string().contains("ajax.ao.spp1.embree.exr"));

    let err = detect_format_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("ajax.ao.spp1.embree.exr"));
}
