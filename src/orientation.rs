//! Sobel gradients and the ridge orientation field.

use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use crate::parallel::RegionExecutor;
use std::f64::consts::PI;

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Horizontal and vertical intensity gradients.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub gx: PixelMatrix,
    pub gy: PixelMatrix,
}

/// Applies both 3×3 Sobel kernels, one region pass each.
pub fn sobel(
    executor: &RegionExecutor,
    input: &PixelMatrix,
) -> Result<Gradients, HuginnMinutiaeError> {
    let mut gx = PixelMatrix::new(input.width(), input.height());
    let mut gy = PixelMatrix::new(input.width(), input.height());

    executor.run(input, &mut gx, |src, band| convolve3(src, band, &SOBEL_X))?;
    executor.run(input, &mut gy, |src, band| convolve3(src, band, &SOBEL_Y))?;

    Ok(Gradients { gx, gy })
}

fn convolve3(src: &PixelMatrix, band: &mut crate::parallel::Band<'_>, kernel: &[[f64; 3]; 3]) {
    for y in band.rows() {
        for x in 0..src.width() {
            let mut acc = 0.0;
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, k) in row.iter().enumerate() {
                    acc += k * src.get_clamped(x as isize + kx as isize - 1, y as isize + ky as isize - 1);
                }
            }
            band.set(x, y, acc);
        }
    }
}

/// Ridge orientation per pixel in `[0, π)`, from gradient moments over a
/// `(2 * radius + 1)²` window.
///
/// Gradients point across ridges, so the dominant gradient direction is turned by a
/// quarter turn. Windows without any gradient energy get orientation `0`.
pub fn orientation_field(
    executor: &RegionExecutor,
    gradients: &Gradients,
    radius: usize,
) -> Result<PixelMatrix, HuginnMinutiaeError> {
    let Gradients { gx, gy } = gradients;
    gx.ensure_same_dimensions(gy)?;

    let r = radius as isize;
    let mut field = PixelMatrix::new(gx.width(), gx.height());

    executor.run(gx, &mut field, |gx, band| {
        for y in band.rows() {
            for x in 0..gx.width() {
                let (mut vx, mut vy) = (0.0, 0.0);
                for dy in -r..=r {
                    for dx in -r..=r {
                        let (px, py) = (x as isize + dx, y as isize + dy);
                        if !gx.in_bounds(px, py) {
                            continue;
                        }
                        let (gxv, gyv) = (gx.get(px as usize, py as usize), gy.get(px as usize, py as usize));
                        vx += 2.0 * gxv * gyv;
                        vy += gxv * gxv - gyv * gyv;
                    }
                }
                let theta = if vx == 0.0 && vy == 0.0 {
                    0.0
                } else {
                    (0.5 * vx.atan2(vy) + PI / 2.0).rem_euclid(PI)
                };
                band.set(x, y, theta);
            }
        }
    })?;

    Ok(field)
}
