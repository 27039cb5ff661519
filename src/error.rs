use thiserror::Error;

/// Error handling during fingerprint image processing, feature parsing and matching.
#[derive(Error, Debug)]
pub enum HuginnMinutiaeError {
    /// The fingerprint image could not be loaded or decoded.
    ///
    /// Fatal to the request. The associated string carries the decoder message.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Source and destination matrices of a region pass have different sizes.
    ///
    /// This is a programming error at the call site and is never user-recoverable.
    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The image yielded no minutiae, so it cannot take part in identification.
    #[error("No features extracted")]
    NoFeaturesExtracted,

    /// A feature signature or gallery file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is missing or invalid.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// A region worker panicked before finishing its band.
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    /// The cancel signal was raised while work was in flight.
    #[error("Cancelled")]
    Cancelled,
}

impl From<image::ImageError> for HuginnMinutiaeError {
    fn from(err: image::ImageError) -> Self {
        HuginnMinutiaeError::Decode(err.to_string())
    }
}
