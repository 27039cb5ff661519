use crate::gallery::{CandidateRecord, Gallery};
use crate::minutiae::{DetectionResult, Frame, Minutia, MinutiaKind};
use crate::output::{IdentificationResult, MatchOutcome};
use core::fmt;
use std::fmt::Formatter;

impl fmt::Display for MinutiaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MinutiaKind::RidgeEnding => "E",
            MinutiaKind::Bifurcation => "B",
        })
    }
}

impl fmt::Display for Minutia {
    /// `x:y:angle:kind`, with the angle in shortest round-trip form.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.x, self.y, self.angle, self.kind)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "frame={}|", self.frame)?;

        for (i, m) in self.minutiae.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CandidateRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "[candidate]")?;
        writeln!(f, "label = {}", self.id)?;
        write!(f, "sig   = {}", self.features)
    }
}

impl fmt::Display for Gallery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matched minutiae: {}/{} (probe={}, candidate={})",
            self.score,
            self.denominator(),
            self.probe_count,
            self.candidate_count
        )
    }
}

impl fmt::Display for IdentificationResult<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IdentificationResult::Identified { candidate, index, outcome } => write!(
                f,
                ".-[ identified ]-\n\
                |\n\
                | id       = {}\n\
                | index    = {}\n\
                | score    = {}\n\
                | quality  = {:.2}\n\
                `----",
                candidate.id,
                index,
                outcome.score,
                outcome.quality()
            ),
            IdentificationResult::NoMatch => f.write_str(".-[ no match ]-\n`----"),
        }
    }
}
