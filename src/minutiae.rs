use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Kind of ridge feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MinutiaKind {
    /// A ridge that stops.
    RidgeEnding,
    /// A ridge that splits in two.
    Bifurcation,
}

/// A ridge feature point with its position and local ridge direction in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minutia {
    pub x: i32,
    pub y: i32,
    pub angle: f64,
    pub kind: MinutiaKind,
}

impl Minutia {
    pub fn new(x: i32, y: i32, angle: f64, kind: MinutiaKind) -> Self {
        Self { x, y, angle, kind }
    }

    /// Total order used to canonicalize feature sets: position, kind, then angle bits.
    pub fn total_cmp(&self, other: &Minutia) -> Ordering {
        self.y
            .cmp(&other.y)
            .then(self.x.cmp(&other.x))
            .then(self.kind.cmp(&other.kind))
            .then(self.angle.total_cmp(&other.angle))
    }
}

/// Bounding box of the segmented fingerprint area, half-open on the max side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Frame {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Minutiae extracted from one fingerprint image, in extraction order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub frame: Frame,
    pub minutiae: Vec<Minutia>,
}

impl DetectionResult {
    pub fn new(frame: Frame, minutiae: Vec<Minutia>) -> Self {
        Self { frame, minutiae }
    }

    pub fn len(&self) -> usize {
        self.minutiae.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }

    pub fn count_of(&self, kind: MinutiaKind) -> usize {
        self.minutiae.iter().filter(|m| m.kind == kind).count()
    }

    /// Compares two feature sets element by element with [`Minutia::total_cmp`].
    pub fn total_cmp(&self, other: &DetectionResult) -> Ordering {
        self.minutiae
            .len()
            .cmp(&other.minutiae.len())
            .then_with(|| {
                self.minutiae
                    .iter()
                    .zip(&other.minutiae)
                    .map(|(a, b)| a.total_cmp(b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }

    /// Short stable digest of the text signature, for cache keys and logs.
    pub fn template_hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.to_string().as_bytes()))[..12].to_string()
    }

    /// Encodes as JSON.
    pub fn to_json(&self) -> Result<String, crate::HuginnMinutiaeError> {
        serde_json::to_string(self)
            .map_err(|e| crate::HuginnMinutiaeError::Parse(format!("JSON encode: {e}")))
    }

    /// Decodes from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::HuginnMinutiaeError> {
        serde_json::from_str(json)
            .map_err(|e| crate::HuginnMinutiaeError::Parse(format!("JSON decode: {e}")))
    }
}

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Smallest absolute difference between two angles, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_angle(a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(-5.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn angle_difference_wraps() {
        assert!((angle_difference(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
    }
}
