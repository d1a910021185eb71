use std::io::Cursor;
use std::path::PathBuf;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn fitted_load_stretches_to_canvas() {
    let dir = PathBuf::from("target").join("unit-assets");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fit.png");
    image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let canvas = Canvas::portrait(18, 32).unwrap();
    let img = load_image_fitted(&path, canvas).unwrap();
    assert_eq!((img.width, img.height), (18, 32));
    assert_eq!(img.rgba8_premul.len(), 18 * 32 * 4);
    assert_eq!(&img.rgba8_premul[..4], &[255, 0, 0, 255]);
}

#[test]
fn missing_file_is_an_error() {
    let canvas = Canvas::portrait(18, 32).unwrap();
    assert!(load_image_fitted(&PathBuf::from("target/unit-assets/nope.png"), canvas).is_err());
}
