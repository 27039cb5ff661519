use crate::config::ExtractionConfig;
use crate::detection::detect_minutiae;
use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use crate::minutiae::{DetectionResult, MinutiaKind};
use crate::normalize::normalized;
use crate::orientation::{orientation_field, sobel};
use crate::parallel::RegionExecutor;
use crate::segmentation::{binarize, frame, segment};
use crate::thinning::thin;
use tracing::debug;

/// Turns a fingerprint image into its minutiae.
///
/// Pixel-level stages (normalization, gradients, orientation, segmentation, binarization,
/// thinning) run as region passes on the executor; feature detection runs sequentially.
#[derive(Debug, Clone, Default)]
pub struct MinutiaExtractor {
    config: ExtractionConfig,
    executor: RegionExecutor,
}

impl MinutiaExtractor {
    pub fn new(config: ExtractionConfig, executor: RegionExecutor) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts minutiae from `matrix`.
    ///
    /// Running this twice on the same matrix yields the same sequence in the same order,
    /// whatever the executor granularity.
    ///
    /// # Errors
    /// - `NoFeaturesExtracted` when the image has no usable ridge structure.
    /// - `Cancelled` / `WorkerPanicked` from the region passes.
    pub fn extract(&self, matrix: &PixelMatrix) -> Result<DetectionResult, HuginnMinutiaeError> {
        if matrix.is_empty() {
            return Err(HuginnMinutiaeError::NoFeaturesExtracted);
        }

        let config = &self.config;
        let executor = &self.executor;

        let normalized = normalized(executor, matrix)?;
        let gradients = sobel(executor, &normalized)?;
        let orientation = orientation_field(executor, &gradients, config.orientation_radius)?;
        let mask = segment(
            executor,
            &normalized,
            config.segmentation_radius,
            config.segmentation_threshold,
        )?;
        let frame = frame(&mask);
        let binary = binarize(executor, &normalized, &mask, config.binarization_radius)?;
        let skeleton = thin(executor, binary, config.max_thinning_iterations)?;

        let minutiae = detect_minutiae(
            &skeleton,
            &mask,
            &orientation,
            config.border_margin,
            config.trace_length,
        );

        if minutiae.is_empty() {
            debug!("No minutiae found in {}x{} image", matrix.width(), matrix.height());
            return Err(HuginnMinutiaeError::NoFeaturesExtracted);
        }

        let result = DetectionResult::new(frame, minutiae);
        debug!(
            "Extracted {} minutiae ({} endings, {} bifurcations), template {}",
            result.len(),
            result.count_of(MinutiaKind::RidgeEnding),
            result.count_of(MinutiaKind::Bifurcation),
            result.template_hash()
        );
        Ok(result)
    }
}
