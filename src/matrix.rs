use crate::error::HuginnMinutiaeError;
use image::{GrayImage, Luma};

/// A fixed-size 2-D grid of `f64` intensity samples stored row-major.
///
/// Every stage of the pipeline reads from and writes into `PixelMatrix` values. Dimensions
/// are fixed at construction; coordinate access outside of them panics.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMatrix {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl PixelMatrix {
    /// Creates a zero-filled matrix.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Creates a matrix with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self { width, height, data: vec![value; width.saturating_mul(height)] }
    }

    /// Wraps row-major samples.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` when `data.len() != width * height`.
    pub fn from_vec(
        width: usize,
        height: usize,
        data: Vec<f64>,
    ) -> Result<Self, HuginnMinutiaeError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(HuginnMinutiaeError::DimensionMismatch {
                expected: (width, height),
                found: (data.len(), 1),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Converts an 8-bit grayscale image, one sample per pixel.
    pub fn from_gray_image(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|Luma([v])| f64::from(*v)).collect();
        Self { width: width as usize, height: height as usize, data }
    }

    /// Converts back to an 8-bit grayscale image, clamping and rounding each sample.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let v = self.get(x as usize, y as usize);
            let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) };
            Luma([v.round() as u8])
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Reads the sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics when `(x, y)` lies outside the matrix.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Writes the sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics when `(x, y)` lies outside the matrix.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Reads with replicated borders, for neighbourhood filters.
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(cx, cy)
    }

    /// Reads `(x, y)` or `0.0` when outside the matrix.
    pub fn get_or_zero(&self, x: isize, y: isize) -> f64 {
        if self.in_bounds(x, y) {
            self.get(x as usize, y as usize)
        } else {
            0.0
        }
    }

    pub fn row(&self, y: usize) -> &[f64] {
        let start = self.index(0, y);
        &self.data[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Checks that `other` can be used together with `self` in one pass.
    pub fn ensure_same_dimensions(&self, other: &PixelMatrix) -> Result<(), HuginnMinutiaeError> {
        if self.dimensions() != other.dimensions() {
            return Err(HuginnMinutiaeError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} matrix",
            self.width,
            self.height
        );
        y * self.width + x
    }
}
