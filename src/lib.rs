#![forbid(unsafe_code)]

pub mod config;
pub mod detection;
pub mod display;
pub mod error;
pub mod extraction;
pub mod gallery;
pub mod identification;
pub mod loader;
pub mod matcher;
pub mod matrix;
pub mod minutiae;
pub mod normalize;
pub mod orientation;
pub mod output;
pub mod parallel;
pub mod parse;
pub mod segmentation;
pub mod thinning;

// Re-exports
pub use config::*;
pub use error::*;
pub use extraction::MinutiaExtractor;
pub use gallery::{CandidateRecord, Gallery};
pub use identification::IdentificationSearch;
pub use matcher::{MinutiaeMatcher, RigidTransform};
pub use matrix::PixelMatrix;
pub use minutiae::{DetectionResult, Frame, Minutia, MinutiaKind};
pub use normalize::{normalize, NormalizationMetadata};
pub use output::*;
pub use parallel::{run_in_parallel, Band, RegionExecutor};

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// A fingerprint extraction and identification pipeline.
///
/// The `HuginnMinutiae` struct bundles a validated [`PipelineConfig`] with the extractor,
/// the pairwise matcher and the 1:N search built from it.
#[derive(Debug, Clone)]
pub struct HuginnMinutiae {
    config: PipelineConfig,
    extractor: MinutiaExtractor,
    search: IdentificationSearch,
}

impl HuginnMinutiae {
    /// Creates a new instance of `HuginnMinutiae`.
    ///
    /// # Parameters
    /// - `config`: Extraction tuning, match tolerances and worker count
    ///
    /// # Returns
    /// A ready pipeline, or `Misconfiguration` when `config` does not validate.
    pub fn new(config: PipelineConfig) -> Result<Self, HuginnMinutiaeError> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    /// Attaches a cancel signal observed by every region pass and by the candidate search.
    pub fn with_cancel_signal(self, cancel_signal: Arc<AtomicBool>) -> Self {
        Self::build(self.config, Some(cancel_signal))
    }

    fn build(config: PipelineConfig, cancel_signal: Option<Arc<AtomicBool>>) -> Self {
        let mut executor = RegionExecutor::new(config.workers);
        let mut search =
            IdentificationSearch::new(MinutiaeMatcher::new(config.matching.clone()), config.workers);
        if let Some(cancel) = cancel_signal {
            executor = executor.with_cancel_signal(Arc::clone(&cancel));
            search = search.with_cancel_signal(cancel);
        }
        let extractor = MinutiaExtractor::new(config.extraction.clone(), executor);

        Self { config, extractor, search }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extracts minutiae from an in-memory grayscale matrix.
    pub fn extract(&self, matrix: &PixelMatrix) -> Result<DetectionResult, HuginnMinutiaeError> {
        self.extractor.extract(matrix)
    }

    /// Decodes the image at `path` and extracts its minutiae.
    ///
    /// # Errors
    /// - `Decode` when the file cannot be read or is not a supported image.
    /// - `NoFeaturesExtracted` when the image has no usable ridge structure.
    pub fn extract_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<DetectionResult, HuginnMinutiaeError> {
        let matrix = loader::load_image(path.as_ref())?;
        self.extract(&matrix)
    }

    /// Compares two extracted feature sets.
    pub fn match_features(
        &self,
        probe: &DetectionResult,
        candidate: &DetectionResult,
    ) -> MatchOutcome {
        self.search.matcher().match_features(probe, candidate)
    }

    /// Whether `outcome` clears the configured inlier threshold.
    pub fn is_match(&self, outcome: &MatchOutcome) -> bool {
        self.search.matcher().is_match(outcome)
    }

    /// Finds the best enrolled candidate for an already extracted probe.
    pub fn identify<'a>(
        &self,
        probe: &DetectionResult,
        candidates: &'a [CandidateRecord],
    ) -> Result<IdentificationResult<'a>, HuginnMinutiaeError> {
        self.search.identify(probe, candidates)
    }

    /// Extracts the probe from `matrix` and searches `candidates`.
    ///
    /// Extraction failures are returned before any candidate is examined.
    pub fn identify_matrix<'a>(
        &self,
        matrix: &PixelMatrix,
        candidates: &'a [CandidateRecord],
    ) -> Result<IdentificationResult<'a>, HuginnMinutiaeError> {
        let probe = self.extract(matrix)?;
        self.identify(&probe, candidates)
    }

    /// Decodes and extracts the probe image at `path`, then searches `candidates`.
    pub fn identify_path<'a, P: AsRef<Path>>(
        &self,
        path: P,
        candidates: &'a [CandidateRecord],
    ) -> Result<IdentificationResult<'a>, HuginnMinutiaeError> {
        let probe = self.extract_path(path)?;
        debug!("Probe template {} with {} minutiae", probe.template_hash(), probe.len());
        self.identify(&probe, candidates)
    }
}
