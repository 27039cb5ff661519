//! Foreground segmentation and ridge binarization.
//!
//! Both stages work on the normalized image and produce `0.0`/`1.0` matrices.

use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use crate::minutiae::Frame;
use crate::parallel::RegionExecutor;

pub const FOREGROUND: f64 = 1.0;
pub const BACKGROUND: f64 = 0.0;

/// Marks pixels whose local standard deviation exceeds `threshold` as foreground.
///
/// Flat areas (blank paper, saturated regions) carry no ridge structure and end up as
/// background.
pub fn segment(
    executor: &RegionExecutor,
    normalized: &PixelMatrix,
    radius: usize,
    threshold: f64,
) -> Result<PixelMatrix, HuginnMinutiaeError> {
    let r = radius as isize;
    let mut mask = PixelMatrix::new(normalized.width(), normalized.height());

    executor.run(normalized, &mut mask, |src, band| {
        for y in band.rows() {
            for x in 0..src.width() {
                let (_, variance) = local_moments(src, x, y, r);
                let value = if variance.sqrt() > threshold { FOREGROUND } else { BACKGROUND };
                band.set(x, y, value);
            }
        }
    })?;

    Ok(mask)
}

/// Bounding box of the foreground pixels, or an empty frame when there are none.
pub fn frame(mask: &PixelMatrix) -> Frame {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;

    for y in 0..mask.height() {
        for (x, v) in mask.row(y).iter().enumerate() {
            if *v < 0.5 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => Frame::new(x0 as i32, y0 as i32, x1 as i32 + 1, y1 as i32 + 1),
        None => Frame::default(),
    }
}

/// Marks ridge pixels: foreground pixels darker than the mean of their window.
pub fn binarize(
    executor: &RegionExecutor,
    normalized: &PixelMatrix,
    mask: &PixelMatrix,
    radius: usize,
) -> Result<PixelMatrix, HuginnMinutiaeError> {
    normalized.ensure_same_dimensions(mask)?;

    let r = radius as isize;
    let mut binary = PixelMatrix::new(normalized.width(), normalized.height());

    executor.run(normalized, &mut binary, |src, band| {
        for y in band.rows() {
            for x in 0..src.width() {
                if mask.get(x, y) < 0.5 {
                    band.set(x, y, BACKGROUND);
                    continue;
                }
                let (mean, _) = local_moments(src, x, y, r);
                let value = if src.get(x, y) < mean { FOREGROUND } else { BACKGROUND };
                band.set(x, y, value);
            }
        }
    })?;

    Ok(binary)
}

/// Mean and variance over the in-bounds part of the window centred on `(x, y)`.
fn local_moments(src: &PixelMatrix, x: usize, y: usize, r: isize) -> (f64, f64) {
    let (mut sum, mut sum_sq, mut n) = (0.0, 0.0, 0usize);
    for dy in -r..=r {
        for dx in -r..=r {
            let (px, py) = (x as isize + dx, y as isize + dy);
            if src.in_bounds(px, py) {
                let v = src.get(px as usize, py as usize);
                sum += v;
                sum_sq += v * v;
                n += 1;
            }
        }
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, variance)
}
