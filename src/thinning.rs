//! Zhang–Suen thinning of a binary ridge map down to a one-pixel-wide skeleton.

use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use crate::parallel::{Band, RegionExecutor};
use tracing::{debug, trace};

/// 8-neighbourhood offsets in ring order: N, NE, E, SE, S, SW, W, NW.
pub(crate) const RING: [(isize, isize); 8] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

/// Set/unset state of the 8 neighbours of `(x, y)` in [`RING`] order; outside is unset.
pub(crate) fn neighbourhood(m: &PixelMatrix, x: usize, y: usize) -> [bool; 8] {
    let mut ring = [false; 8];
    for (slot, (dx, dy)) in ring.iter_mut().zip(RING) {
        *slot = m.get_or_zero(x as isize + dx, y as isize + dy) >= 0.5;
    }
    ring
}

/// Number of unset→set transitions walking once around the ring.
pub(crate) fn transitions(ring: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !ring[i] && ring[(i + 1) % 8]).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubIteration {
    /// Peels south-east boundary and north-west corner pixels.
    First,
    /// Peels north-west boundary and south-east corner pixels.
    Second,
}

/// Thins `binary`, taking ownership of it; ridge pixels are `1.0`.
///
/// Each sub-iteration is a region pass reading the previous state, so the result does not
/// depend on the band layout. Stops as soon as a full iteration changes nothing, or after
/// `max_iterations`.
pub fn thin(
    executor: &RegionExecutor,
    binary: PixelMatrix,
    max_iterations: usize,
) -> Result<PixelMatrix, HuginnMinutiaeError> {
    let mut current = binary;
    let mut scratch = PixelMatrix::new(current.width(), current.height());

    for iteration in 0..max_iterations {
        let mut removed = 0;
        for step in [SubIteration::First, SubIteration::Second] {
            executor.run(&current, &mut scratch, |src, band| thin_band(src, band, step))?;
            removed += count_removed(&current, &scratch);
            std::mem::swap(&mut current, &mut scratch);
        }

        trace!("Thinning iteration {iteration}: removed {removed} pixels");
        if removed == 0 {
            return Ok(current);
        }
    }

    debug!("Thinning stopped after {max_iterations} iterations without converging");
    Ok(current)
}

fn thin_band(src: &PixelMatrix, band: &mut Band<'_>, step: SubIteration) {
    for y in band.rows() {
        for x in 0..src.width() {
            let keep = src.get(x, y) >= 0.5 && !is_removable(&neighbourhood(src, x, y), step);
            band.set(x, y, if keep { 1.0 } else { 0.0 });
        }
    }
}

fn is_removable(ring: &[bool; 8], step: SubIteration) -> bool {
    let [p2, _, p4, _, p6, _, p8, _] = *ring;
    let set = ring.iter().filter(|v| **v).count();

    if !(2..=6).contains(&set) || transitions(ring) != 1 {
        return false;
    }

    match step {
        SubIteration::First => !(p2 && p4 && p6) && !(p4 && p6 && p8),
        SubIteration::Second => !(p2 && p4 && p8) && !(p2 && p6 && p8),
    }
}

fn count_removed(before: &PixelMatrix, after: &PixelMatrix) -> usize {
    before
        .as_slice()
        .iter()
        .zip(after.as_slice())
        .filter(|(b, a)| **b >= 0.5 && **a < 0.5)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_line_end_is_kept() {
        // . . .
        // X X .
        // . . .
        let ring = [false, false, false, false, false, false, true, false];
        assert_eq!(transitions(&ring), 1);
        assert!(!is_removable(&ring, SubIteration::First));
        assert!(!is_removable(&ring, SubIteration::Second));
    }

    #[test]
    fn south_boundary_removed_in_first_pass_only() {
        // X X X
        // X X X
        // . . .
        let ring = [true, true, true, false, false, false, true, true];
        assert!(is_removable(&ring, SubIteration::First));
        assert!(!is_removable(&ring, SubIteration::Second));
    }
}
