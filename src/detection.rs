//! Minutiae detection on a thinned skeleton.
//!
//! This stage needs global connectivity (ridge walks can leave any band) and runs
//! sequentially in row-major order, which fixes the extraction order of the result.

use crate::matrix::PixelMatrix;
use crate::minutiae::{angle_difference, Minutia, MinutiaKind};
use crate::thinning::{neighbourhood, transitions, RING};

type Point = (isize, isize);

/// Crossing number of a skeleton pixel: 1 for a ridge ending, 2 inside a ridge, 3 for a
/// bifurcation.
pub fn crossing_number(skeleton: &PixelMatrix, x: usize, y: usize) -> usize {
    transitions(&neighbourhood(skeleton, x, y))
}

/// Scans the skeleton and classifies every ridge pixel by its crossing number.
///
/// # Parameters
/// - `skeleton`: one-pixel-wide ridge map, ridge pixels `>= 0.5`.
/// - `mask`: foreground mask with the same dimensions.
/// - `orientation`: ridge orientation field, used when a ridge walk is inconclusive.
/// - `border_margin`: minutiae whose `(2m + 1)²` neighbourhood leaves the image or touches
///   background are dropped.
/// - `trace_length`: maximum number of pixels followed per branch.
pub fn detect_minutiae(
    skeleton: &PixelMatrix,
    mask: &PixelMatrix,
    orientation: &PixelMatrix,
    border_margin: usize,
    trace_length: usize,
) -> Vec<Minutia> {
    let mut minutiae = Vec::new();

    for y in 0..skeleton.height() {
        for x in 0..skeleton.width() {
            if skeleton.get(x, y) < 0.5 {
                continue;
            }

            let ring = neighbourhood(skeleton, x, y);
            let kind = match transitions(&ring) {
                1 => MinutiaKind::RidgeEnding,
                3 => MinutiaKind::Bifurcation,
                _ => continue,
            };

            if !is_inside_foreground(mask, x, y, border_margin) {
                continue;
            }

            let angle = ridge_angle(skeleton, (x as isize, y as isize), &ring, kind, trace_length)
                .unwrap_or_else(|| orientation.get(x, y));

            minutiae.push(Minutia::new(x as i32, y as i32, angle, kind));
        }
    }

    minutiae
}

fn is_inside_foreground(mask: &PixelMatrix, x: usize, y: usize, margin: usize) -> bool {
    let m = margin as isize;
    for dy in -m..=m {
        for dx in -m..=m {
            let (px, py) = (x as isize + dx, y as isize + dy);
            if !mask.in_bounds(px, py) || mask.get(px as usize, py as usize) < 0.5 {
                return false;
            }
        }
    }
    true
}

/// Contiguous runs of set neighbours around the ring, one run per outgoing branch.
fn branch_runs(ring: &[bool; 8]) -> Vec<Vec<Point>> {
    let Some(gap) = ring.iter().position(|v| !v) else {
        return Vec::new();
    };

    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut previous = false;
    for k in 1..=8 {
        let i = (gap + k) % 8;
        if ring[i] {
            if !previous {
                runs.push(Vec::new());
            }
            if let Some(run) = runs.last_mut() {
                run.push(RING[i]);
            }
        }
        previous = ring[i];
    }
    runs
}

/// Direction of the minutia in radians.
///
/// Endings point along their ridge, away from the free end. Bifurcations point along the
/// stem: of the three branches, the one left over after taking the pair with the smallest
/// angle between them.
fn ridge_angle(
    skeleton: &PixelMatrix,
    origin: Point,
    ring: &[bool; 8],
    kind: MinutiaKind,
    trace_length: usize,
) -> Option<f64> {
    let runs = branch_runs(ring);

    let mut blocked: Vec<Point> = vec![origin];
    blocked.extend(runs.iter().flatten().map(|(dx, dy)| (origin.0 + dx, origin.1 + dy)));

    let directions: Vec<f64> = runs
        .iter()
        .filter_map(|run| {
            let (dx, dy) = run.iter().find(|(dx, dy)| *dx == 0 || *dy == 0).or(run.first())?;
            let end = walk(skeleton, (origin.0 + dx, origin.1 + dy), &blocked, trace_length);
            Some(((end.1 - origin.1) as f64).atan2((end.0 - origin.0) as f64))
        })
        .collect();

    match (kind, directions.as_slice()) {
        (MinutiaKind::RidgeEnding, [direction]) => Some(*direction),
        (MinutiaKind::Bifurcation, [a, b, c]) => {
            let pairs = [
                (angle_difference(*a, *b), *c),
                (angle_difference(*a, *c), *b),
                (angle_difference(*b, *c), *a),
            ];
            pairs
                .iter()
                .min_by(|l, r| l.0.total_cmp(&r.0))
                .map(|(_, stem)| *stem)
        }
        _ => None,
    }
}

/// Follows the skeleton from `first` until a junction, a dead end, or `trace_length`
/// pixels, and returns the last pixel reached.
fn walk(skeleton: &PixelMatrix, first: Point, blocked: &[Point], trace_length: usize) -> Point {
    let mut visited: Vec<Point> = blocked.to_vec();
    let mut current = first;

    for _ in 1..trace_length {
        let (cx, cy) = (current.0 as usize, current.1 as usize);
        if crossing_number(skeleton, cx, cy) >= 3 {
            break;
        }

        let candidates: Vec<Point> = RING
            .iter()
            .map(|(dx, dy)| (current.0 + dx, current.1 + dy))
            .filter(|&(px, py)| skeleton.get_or_zero(px, py) >= 0.5)
            .filter(|p| !visited.contains(p))
            .collect();

        // staircase ridges offer an orthogonal and a diagonal step; take the orthogonal one
        let next = candidates
            .iter()
            .find(|(px, py)| *px == current.0 || *py == current.1)
            .or(candidates.first())
            .copied();

        let Some(next) = next else {
            break;
        };
        visited.extend(candidates);
        current = next;
    }

    current
}
