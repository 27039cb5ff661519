use crate::error::HuginnMinutiaeError;
use crate::minutiae::DetectionResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// An enrolled identity and the features stored for it at enrollment time.
///
/// Read-only during identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub features: DetectionResult,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, features: DetectionResult) -> Self {
        Self { id: id.into(), features }
    }
}

/// Enrolled candidates in enrollment order.
///
/// The text form is an INI-like database: `[candidate]` sections, each with a `label` line
/// followed by a `sig` line holding the text signature of the stored features. Lines
/// starting with `;` are comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gallery {
    pub candidates: Vec<CandidateRecord>,
}

impl Gallery {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self { candidates }
    }

    /// Reads and parses a gallery file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HuginnMinutiaeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HuginnMinutiaeError::Parse(format!("Failed to read gallery {}: {e}", path.display()))
        })?;
        let gallery: Gallery = content.parse()?;
        debug!("Loaded gallery {} with {} candidates", path.display(), gallery.len());
        Ok(gallery)
    }

    /// Appends a candidate at the end of the enrollment order.
    pub fn enroll(&mut self, candidate: CandidateRecord) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    pub fn find(&self, id: &str) -> Option<&CandidateRecord> {
        self.candidates.iter().find(|c| c.id == id)
    }
}
