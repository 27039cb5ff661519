use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use std::path::Path;
use tracing::debug;

/// Decodes an image file into a grayscale pixel matrix.
///
/// Any format enabled on the `image` crate is accepted; color images are converted to
/// luma first.
///
/// # Errors
/// Returns `Decode` when the file cannot be read or decoded.
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelMatrix, HuginnMinutiaeError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| HuginnMinutiaeError::Decode(format!("{}: {e}", path.display())))?;
    debug!("Decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(PixelMatrix::from_gray_image(&img.to_luma8()))
}

/// Decodes an in-memory encoded image, e.g. an uploaded file body.
pub fn decode_image(bytes: &[u8]) -> Result<PixelMatrix, HuginnMinutiaeError> {
    if bytes.is_empty() {
        return Err(HuginnMinutiaeError::Decode("input image data is empty".to_string()));
    }
    let img = image::load_from_memory(bytes)?;
    Ok(PixelMatrix::from_gray_image(&img.to_luma8()))
}
