use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use crate::parallel::RegionExecutor;
use tracing::debug;

/// Upper bound of the canonical intensity range.
pub const MAX_INTENSITY: f64 = 255.0;

/// Value written to every pixel of a flat image.
pub const DEGENERATE_FILL: f64 = MAX_INTENSITY / 2.0;

/// Observed intensity extrema of a matrix, fixed for one normalization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationMetadata {
    pub min: f64,
    pub max: f64,
}

impl NormalizationMetadata {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scans `matrix` for its minimum and maximum, skipping NaN samples.
    ///
    /// An empty or all-NaN matrix yields `{min: 0, max: 0}`.
    pub fn from_matrix(matrix: &PixelMatrix) -> Self {
        let (min, max) = matrix
            .as_slice()
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        if min > max {
            Self { min: 0.0, max: 0.0 }
        } else {
            Self { min, max }
        }
    }

    /// True when the range cannot be divided by (flat or non-finite).
    pub fn is_degenerate(&self) -> bool {
        let range = self.max - self.min;
        !range.is_finite() || range <= 0.0
    }
}

/// Rescales `input` linearly from `[metadata.min, metadata.max]` into `[0, 255]`.
///
/// Flat images get the constant [`DEGENERATE_FILL`]. Every output sample is clamped into
/// the canonical range.
pub fn normalize(
    input: &PixelMatrix,
    output: &mut PixelMatrix,
    metadata: NormalizationMetadata,
) -> Result<(), HuginnMinutiaeError> {
    normalize_with(&RegionExecutor::default(), input, output, metadata)
}

/// Same as [`normalize`] on a caller-provided executor.
pub fn normalize_with(
    executor: &RegionExecutor,
    input: &PixelMatrix,
    output: &mut PixelMatrix,
    metadata: NormalizationMetadata,
) -> Result<(), HuginnMinutiaeError> {
    let degenerate = metadata.is_degenerate();
    if degenerate {
        debug!(
            "Degenerate intensity range [{}, {}], filling with {DEGENERATE_FILL}",
            metadata.min, metadata.max
        );
    }

    let NormalizationMetadata { min, max } = metadata;
    let scale = if degenerate { 0.0 } else { MAX_INTENSITY / (max - min) };

    executor.run(input, output, |src, band| {
        for y in band.rows() {
            for x in 0..src.width() {
                let value = if degenerate {
                    DEGENERATE_FILL
                } else {
                    scale_pixel(src.get(x, y), min, scale)
                };
                band.set(x, y, value);
            }
        }
    })
}

/// Convenience: measures the extrema and normalizes into a new matrix.
pub fn normalized(
    executor: &RegionExecutor,
    input: &PixelMatrix,
) -> Result<PixelMatrix, HuginnMinutiaeError> {
    let metadata = NormalizationMetadata::from_matrix(input);
    let mut output = PixelMatrix::new(input.width(), input.height());
    normalize_with(executor, input, &mut output, metadata)?;
    Ok(output)
}

fn scale_pixel(pixel: f64, min: f64, scale: f64) -> f64 {
    let value = (pixel - min) * scale;
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_INTENSITY)
    }
}
