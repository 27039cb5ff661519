use crate::error::HuginnMinutiaeError;
use std::f64::consts::PI;

/// Tuning for the minutia extractor. Radii are in pixels; intensities are on the
/// normalized `[0, 255]` scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Half-size of the gradient window used for the orientation field.
    pub orientation_radius: usize,
    /// Half-size of the window used for local standard deviation.
    pub segmentation_radius: usize,
    /// Minimum local standard deviation for a pixel to count as fingerprint area.
    pub segmentation_threshold: f64,
    /// Half-size of the local-mean window used for binarization.
    pub binarization_radius: usize,
    /// Upper bound on thinning iterations.
    pub max_thinning_iterations: usize,
    /// Minutiae closer than this to background or to the image edge are dropped.
    pub border_margin: usize,
    /// Maximum number of skeleton pixels followed when estimating a minutia angle.
    pub trace_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            orientation_radius: 4,
            segmentation_radius: 4,
            segmentation_threshold: 10.0,
            binarization_radius: 4,
            max_thinning_iterations: 64,
            border_margin: 8,
            trace_length: 8,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), HuginnMinutiaeError> {
        if self.orientation_radius == 0
            || self.segmentation_radius == 0
            || self.binarization_radius == 0
        {
            return Err(HuginnMinutiaeError::Misconfiguration(
                "Window radii must be greater than 0".to_string(),
            ));
        }
        if !self.segmentation_threshold.is_finite() || self.segmentation_threshold < 0.0 {
            return Err(HuginnMinutiaeError::Misconfiguration(format!(
                "Invalid segmentation threshold: {}",
                self.segmentation_threshold
            )));
        }
        if self.max_thinning_iterations == 0 {
            return Err(HuginnMinutiaeError::Misconfiguration(
                "Thinning needs at least one iteration".to_string(),
            ));
        }
        if self.trace_length < 2 {
            return Err(HuginnMinutiaeError::Misconfiguration(
                "Trace length must be at least 2 pixels".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tolerances and acceptance threshold for the minutiae matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Maximum distance in pixels between an aligned probe minutia and its partner.
    pub distance_tolerance: f64,
    /// Maximum angular error in radians between an aligned probe minutia and its partner.
    pub angle_tolerance: f64,
    /// Largest rotation in radians a hypothesis may imply. `π` accepts any rotation.
    pub max_rotation: f64,
    /// Minimum inlier count for two feature sets to be considered the same finger.
    pub min_inliers: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            distance_tolerance: 10.0,
            angle_tolerance: PI / 8.0,
            max_rotation: PI,
            min_inliers: 4,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), HuginnMinutiaeError> {
        if self.min_inliers == 0 {
            return Err(HuginnMinutiaeError::Misconfiguration(
                "Minimum inlier count must be greater than 0".to_string(),
            ));
        }
        if !self.distance_tolerance.is_finite() || self.distance_tolerance < 0.0 {
            return Err(HuginnMinutiaeError::Misconfiguration(format!(
                "Invalid distance tolerance: {}",
                self.distance_tolerance
            )));
        }
        if !(0.0..=PI).contains(&self.angle_tolerance) {
            return Err(HuginnMinutiaeError::Misconfiguration(format!(
                "Angle tolerance must be within [0, π]: {}",
                self.angle_tolerance
            )));
        }
        if !(0.0..=PI).contains(&self.max_rotation) {
            return Err(HuginnMinutiaeError::Misconfiguration(format!(
                "Maximum rotation must be within [0, π]: {}",
                self.max_rotation
            )));
        }
        Ok(())
    }
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub matching: MatchConfig,
    /// Worker threads per stage; `0` uses the available parallelism.
    pub workers: usize,
}

impl PipelineConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_min_inliers(mut self, min_inliers: usize) -> Self {
        self.matching.min_inliers = min_inliers;
        self
    }

    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    pub fn validate(&self) -> Result<(), HuginnMinutiaeError> {
        self.extraction.validate()?;
        self.matching.validate()
    }
}
