use crate::gallery::CandidateRecord;
use crate::minutiae::Minutia;
use serde::{Deserialize, Serialize};

/// A probe minutia paired with a candidate minutia under the winning alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub probe: Minutia,
    pub candidate: Minutia,
    /// Residual distance in pixels after alignment.
    pub distance: f64,
    /// Residual angle in radians after alignment.
    pub angle_error: f64,
}

impl MatchedPair {
    /// The same correspondence seen from the other side.
    pub fn swapped(self) -> Self {
        Self { probe: self.candidate, candidate: self.probe, ..self }
    }
}

/// Result of comparing two minutiae sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Accepted pairs of the best alignment hypothesis.
    pub pairs: Vec<MatchedPair>,
    /// Number of accepted pairs.
    pub score: usize,
    pub probe_count: usize,
    pub candidate_count: usize,
}

impl MatchOutcome {
    pub fn new(pairs: Vec<MatchedPair>, probe_count: usize, candidate_count: usize) -> Self {
        Self { score: pairs.len(), pairs, probe_count, candidate_count }
    }

    /// The same outcome with probe and candidate roles exchanged.
    pub fn swapped(self) -> Self {
        Self {
            pairs: self.pairs.into_iter().map(MatchedPair::swapped).collect(),
            score: self.score,
            probe_count: self.candidate_count,
            candidate_count: self.probe_count,
        }
    }

    pub fn is_match(&self, min_inliers: usize) -> bool {
        self.score >= min_inliers.max(1)
    }

    /// The larger of the two set sizes, used as the display denominator.
    pub fn denominator(&self) -> usize {
        self.probe_count.max(self.candidate_count)
    }

    /// `score / max(probe_count, candidate_count)`, `0.0` for two empty sets.
    pub fn quality(&self) -> f64 {
        match self.denominator() {
            0 => 0.0,
            d => self.score as f64 / d as f64,
        }
    }
}

/// Outcome of a 1:N search.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentificationResult<'a> {
    /// The best-scoring candidate that cleared the inlier threshold.
    Identified {
        candidate: &'a CandidateRecord,
        /// Enrollment position of the candidate.
        index: usize,
        outcome: MatchOutcome,
    },
    /// No candidate cleared the threshold, or there were no candidates.
    NoMatch,
}

impl<'a> IdentificationResult<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, IdentificationResult::Identified { .. })
    }

    pub fn candidate(&self) -> Option<&'a CandidateRecord> {
        match self {
            IdentificationResult::Identified { candidate, .. } => Some(*candidate),
            IdentificationResult::NoMatch => None,
        }
    }

    pub fn score(&self) -> Option<usize> {
        match self {
            IdentificationResult::Identified { outcome, .. } => Some(outcome.score),
            IdentificationResult::NoMatch => None,
        }
    }
}
