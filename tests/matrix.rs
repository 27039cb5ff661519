use huginn_minutiae::loader::decode_image;
use huginn_minutiae::{HuginnMinutiaeError, PixelMatrix};
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

fn unwrap_matrix(result: Result<PixelMatrix, HuginnMinutiaeError>) -> PixelMatrix {
    match result {
        Ok(matrix) => matrix,
        Err(e) => panic!("Failed to build matrix: {e}"),
    }
}

#[test]
fn test_from_vec_rejects_wrong_length() {
    match PixelMatrix::from_vec(3, 2, vec![0.0; 5]) {
        Err(HuginnMinutiaeError::DimensionMismatch { expected, .. }) => {
            assert_eq!(expected, (3, 2));
        }
        other => panic!("Expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_row_major_layout() {
    let m = unwrap_matrix(PixelMatrix::from_vec(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
    assert_eq!(m.dimensions(), (3, 2));
    assert_eq!(m.get(2, 0), 2.0);
    assert_eq!(m.get(0, 1), 3.0);
    assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
}

#[test]
fn test_set_then_get() {
    let mut m = PixelMatrix::new(4, 4);
    m.set(3, 2, 42.5);
    assert_eq!(m.get(3, 2), 42.5);
    assert_eq!(m.get(2, 3), 0.0);
}

#[test]
fn test_empty_matrix() {
    let m = PixelMatrix::new(0, 7);
    assert!(m.is_empty());
    assert!(m.as_slice().is_empty());
}

#[test]
fn test_gray_image_conversion() {
    let img = GrayImage::from_fn(5, 3, |x, y| Luma([(x * 10 + y) as u8]));
    let m = PixelMatrix::from_gray_image(&img);

    assert_eq!(m.dimensions(), (5, 3));
    assert_eq!(m.get(4, 2), 42.0);
    assert_eq!(m.to_gray_image(), img);
}

#[test]
fn test_to_gray_image_clamps() {
    let m = unwrap_matrix(PixelMatrix::from_vec(3, 1, vec![-20.0, 300.0, f64::NAN]));
    let img = m.to_gray_image();
    assert_eq!(img.get_pixel(0, 0).0, [0]);
    assert_eq!(img.get_pixel(1, 0).0, [255]);
    assert_eq!(img.get_pixel(2, 0).0, [0]);
}

#[test]
fn test_decode_png_from_memory() {
    let img = GrayImage::from_fn(8, 6, |x, y| Luma([(x * 30 + y) as u8]));
    let mut bytes = Vec::new();
    if let Err(e) = img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        panic!("Failed to encode PNG: {e}");
    }

    let m = unwrap_matrix(decode_image(&bytes));
    assert_eq!(m.dimensions(), (8, 6));
    assert_eq!(m.get(7, 5), 215.0);
}

#[test]
fn test_decode_rejects_empty_and_garbage() {
    assert!(matches!(decode_image(&[]), Err(HuginnMinutiaeError::Decode(_))));
    assert!(matches!(decode_image(b"not an image"), Err(HuginnMinutiaeError::Decode(_))));
}

#[test]
fn test_load_missing_file_is_decode_error() {
    let result = huginn_minutiae::loader::load_image("/nonexistent/finger.png");
    assert!(matches!(result, Err(HuginnMinutiaeError::Decode(_))));
}
