//! 1:N identification over enrolled candidates.
//!
//! Candidates are split into contiguous chunks, one scoped worker per chunk. Each worker
//! reports its best `(score, index)`; the final winner is chosen by highest score and then
//! lowest enrollment index, so the outcome never depends on which worker finishes first.

use crate::error::HuginnMinutiaeError;
use crate::gallery::CandidateRecord;
use crate::matcher::MinutiaeMatcher;
use crate::minutiae::DetectionResult;
use crate::output::{IdentificationResult, MatchOutcome};
use crate::parallel::default_parallelism;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Best accepted candidate seen so far: enrollment index and outcome.
type Ranked = (usize, MatchOutcome);

/// Runs the matcher between one probe and every enrolled candidate.
#[derive(Debug, Clone, Default)]
pub struct IdentificationSearch {
    matcher: MinutiaeMatcher,
    workers: usize,
    cancel_signal: Option<Arc<AtomicBool>>,
}

impl IdentificationSearch {
    /// Creates a search.
    ///
    /// # Parameters
    /// - `matcher`: pairwise matcher, including the minimum inlier threshold.
    /// - `workers`: concurrent comparisons; `0` uses the available parallelism.
    pub fn new(matcher: MinutiaeMatcher, workers: usize) -> Self {
        Self { matcher, workers, cancel_signal: None }
    }

    /// Attaches a cancel signal checked before each candidate comparison.
    pub fn with_cancel_signal(mut self, cancel_signal: Arc<AtomicBool>) -> Self {
        self.cancel_signal = Some(cancel_signal);
        self
    }

    pub fn matcher(&self) -> &MinutiaeMatcher {
        &self.matcher
    }

    /// Finds the enrolled candidate that best matches `probe`.
    ///
    /// Returns `NoMatch` when `candidates` is empty or no candidate reaches the inlier
    /// threshold. Ties on score go to the earliest enrolled candidate.
    ///
    /// # Errors
    /// - `Cancelled` when the cancel signal was raised during the search.
    /// - `WorkerPanicked` when a comparison worker panicked.
    pub fn identify<'a>(
        &self,
        probe: &DetectionResult,
        candidates: &'a [CandidateRecord],
    ) -> Result<IdentificationResult<'a>, HuginnMinutiaeError> {
        if candidates.is_empty() {
            debug!("Empty candidate list, nothing to identify against");
            return Ok(IdentificationResult::NoMatch);
        }

        let workers = match self.workers {
            0 => default_parallelism().get(),
            n => n,
        }
        .min(candidates.len());
        let chunk_size = candidates.len().div_ceil(workers);

        debug!(
            "Identifying probe {} against {} candidates on {} workers",
            probe.template_hash(),
            candidates.len(),
            workers
        );

        let joined = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_id, chunk)| {
                    let offset = chunk_id * chunk_size;
                    scope.spawn(move |_| self.best_in_chunk(probe, chunk, offset))
                })
                .collect();

            handles.into_iter().map(|handle| handle.join()).collect::<Vec<_>>()
        })
        .map_err(|_| HuginnMinutiaeError::WorkerPanicked("identification scope".to_string()))?;

        let mut winner: Option<Ranked> = None;
        for result in joined {
            let local = result.map_err(|_| {
                HuginnMinutiaeError::WorkerPanicked("identification worker".to_string())
            })?;
            if let Some(local) = local {
                winner = Some(match winner {
                    Some(current) => better(current, local),
                    None => local,
                });
            }
        }

        if self.is_cancelled() {
            debug!("Identification cancelled, discarding partial result");
            return Err(HuginnMinutiaeError::Cancelled);
        }

        Ok(match winner {
            Some((index, outcome)) => {
                let candidate = &candidates[index];
                debug!(
                    "Identified `{}` at index {index}: {outcome}",
                    candidate.id
                );
                IdentificationResult::Identified { candidate, index, outcome }
            }
            None => {
                debug!("No candidate reached {} inliers", self.matcher.config().min_inliers);
                IdentificationResult::NoMatch
            }
        })
    }

    fn best_in_chunk(
        &self,
        probe: &DetectionResult,
        chunk: &[CandidateRecord],
        offset: usize,
    ) -> Option<Ranked> {
        let mut best: Option<Ranked> = None;

        for (i, candidate) in chunk.iter().enumerate() {
            if self.is_cancelled() {
                trace!("Cancellation observed, skipping remaining candidates");
                break;
            }

            let outcome = self.matcher.match_features(probe, &candidate.features);
            trace!("Candidate `{}`: {outcome}", candidate.id);

            if !self.matcher.is_match(&outcome) {
                continue;
            }

            let ranked = (offset + i, outcome);
            best = Some(match best {
                Some(current) => better(current, ranked),
                None => ranked,
            });
        }

        best
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_signal.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
    }
}

/// Higher score wins; equal scores go to the lower enrollment index.
fn better(current: Ranked, challenger: Ranked) -> Ranked {
    let challenger_wins = challenger.1.score > current.1.score
        || (challenger.1.score == current.1.score && challenger.0 < current.0);
    if challenger_wins {
        challenger
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(index: usize, score: usize) -> Ranked {
        (index, MatchOutcome { score, ..MatchOutcome::default() })
    }

    #[test]
    fn ties_go_to_earliest_index() {
        assert_eq!(better(ranked(3, 7), ranked(1, 7)).0, 1);
        assert_eq!(better(ranked(1, 7), ranked(3, 7)).0, 1);
        assert_eq!(better(ranked(1, 7), ranked(3, 8)).0, 3);
    }
}
