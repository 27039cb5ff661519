use crate::config::MatchConfig;
use crate::minutiae::{angle_difference, wrap_angle, DetectionResult, Minutia};
use crate::output::{MatchOutcome, MatchedPair};
use std::cmp::Ordering;
use tracing::trace;

/// Rotation about the origin followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: f64,
    pub tx: f64,
    pub ty: f64,
    cos: f64,
    sin: f64,
}

impl RigidTransform {
    pub fn new(rotation: f64, tx: f64, ty: f64) -> Self {
        Self { rotation, tx, ty, cos: rotation.cos(), sin: rotation.sin() }
    }

    /// The transform that rotates by `rotation` and then moves `from` exactly onto `to`.
    pub fn aligning(from: &Minutia, to: &Minutia, rotation: f64) -> Self {
        let (cos, sin) = (rotation.cos(), rotation.sin());
        let (fx, fy) = (f64::from(from.x), f64::from(from.y));
        let tx = f64::from(to.x) - (cos * fx - sin * fy);
        let ty = f64::from(to.y) - (sin * fx + cos * fy);
        Self { rotation, tx, ty, cos, sin }
    }

    /// Position and angle of `m` after the transform.
    pub fn apply(&self, m: &Minutia) -> (f64, f64, f64) {
        let (x, y) = (f64::from(m.x), f64::from(m.y));
        (
            self.cos * x - self.sin * y + self.tx,
            self.sin * x + self.cos * y + self.ty,
            wrap_angle(m.angle + self.rotation),
        )
    }
}

/// Compares minutiae sets under an unknown rigid transform.
///
/// Every compatible pair of minutiae is tried as an anchor for a rotation/translation
/// hypothesis; the hypothesis that brings the most other minutiae into agreement wins.
#[derive(Debug, Clone, Default)]
pub struct MinutiaeMatcher {
    config: MatchConfig,
}

impl MinutiaeMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Whether `outcome` reaches the configured inlier threshold.
    pub fn is_match(&self, outcome: &MatchOutcome) -> bool {
        outcome.is_match(self.config.min_inliers)
    }

    /// Matches `probe` against `candidate`.
    ///
    /// Symmetric: the search always runs over the two sets in a canonical order, so
    /// swapping the arguments gives the same score and mirrored pairs.
    pub fn match_features(
        &self,
        probe: &DetectionResult,
        candidate: &DetectionResult,
    ) -> MatchOutcome {
        if probe.total_cmp(candidate) == Ordering::Greater {
            let pairs = self.best_alignment(&candidate.minutiae, &probe.minutiae);
            MatchOutcome::new(pairs, candidate.len(), probe.len()).swapped()
        } else {
            let pairs = self.best_alignment(&probe.minutiae, &candidate.minutiae);
            MatchOutcome::new(pairs, probe.len(), candidate.len())
        }
    }

    fn best_alignment(&self, a: &[Minutia], b: &[Minutia]) -> Vec<MatchedPair> {
        let upper_bound = a.len().min(b.len());
        let mut best: Vec<MatchedPair> = Vec::new();
        let mut taken = vec![false; b.len()];

        'anchors: for anchor_a in a {
            for anchor_b in b {
                if best.len() >= upper_bound {
                    break 'anchors;
                }
                if anchor_a.kind != anchor_b.kind {
                    continue;
                }

                let rotation = wrap_angle(anchor_b.angle - anchor_a.angle);
                if rotation.abs() > self.config.max_rotation {
                    continue;
                }

                let transform = RigidTransform::aligning(anchor_a, anchor_b, rotation);
                if let Some(pairs) = self.inliers(a, b, &transform, best.len(), &mut taken) {
                    trace!(
                        "New best hypothesis: rotation={:.3} tx={:.1} ty={:.1} inliers={}",
                        transform.rotation,
                        transform.tx,
                        transform.ty,
                        pairs.len()
                    );
                    best = pairs;
                }
            }
        }

        best
    }

    /// Greedily pairs every minutia of `a`, in order, with the nearest free compatible
    /// minutia of `b` under `transform`.
    ///
    /// Returns `None` as soon as the hypothesis can no longer beat `to_beat` inliers.
    fn inliers(
        &self,
        a: &[Minutia],
        b: &[Minutia],
        transform: &RigidTransform,
        to_beat: usize,
        taken: &mut [bool],
    ) -> Option<Vec<MatchedPair>> {
        taken.fill(false);
        let mut pairs = Vec::new();

        for (k, m) in a.iter().enumerate() {
            if pairs.len() + (a.len() - k) <= to_beat {
                return None;
            }

            let (x, y, angle) = transform.apply(m);
            let mut nearest: Option<(usize, f64, f64)> = None;

            for (l, c) in b.iter().enumerate() {
                if taken[l] || c.kind != m.kind {
                    continue;
                }
                let angle_error = angle_difference(angle, c.angle);
                if angle_error > self.config.angle_tolerance {
                    continue;
                }
                let distance = (x - f64::from(c.x)).hypot(y - f64::from(c.y));
                if distance > self.config.distance_tolerance {
                    continue;
                }
                if nearest.map_or(true, |(_, d, _)| distance < d) {
                    nearest = Some((l, distance, angle_error));
                }
            }

            if let Some((l, distance, angle_error)) = nearest {
                taken[l] = true;
                pairs.push(MatchedPair { probe: *m, candidate: b[l], distance, angle_error });
            }
        }

        (pairs.len() > to_beat).then_some(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minutiae::MinutiaKind;
    use std::f64::consts::PI;

    #[test]
    fn aligning_maps_anchor_exactly() {
        let from = Minutia::new(10, 20, 0.3, MinutiaKind::RidgeEnding);
        let to = Minutia::new(-4, 7, 1.1, MinutiaKind::RidgeEnding);
        let t = RigidTransform::aligning(&from, &to, wrap_angle(to.angle - from.angle));

        let (x, y, angle) = t.apply(&from);
        assert!((x - -4.0).abs() < 1e-9);
        assert!((y - 7.0).abs() < 1e-9);
        assert!((angle - 1.1).abs() < 1e-9);
    }

    #[test]
    fn quarter_turn() {
        let t = RigidTransform::new(PI / 2.0, 0.0, 0.0);
        let (x, y, _) = t.apply(&Minutia::new(1, 0, 0.0, MinutiaKind::Bifurcation));
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }
}
