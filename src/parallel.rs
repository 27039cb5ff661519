//! Region-parallel execution over pixel matrices.
//!
//! A pass splits the destination matrix into contiguous horizontal bands and hands each band
//! to its own scoped worker by exclusive ownership. Workers may read anywhere in the
//! read-only source but can only write the rows of their band, so no locking is needed
//! inside a pass. Every call joins all workers before returning.

use crate::error::HuginnMinutiaeError;
use crate::matrix::PixelMatrix;
use std::any::Any;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Exclusive, writable view over a run of destination rows.
#[derive(Debug)]
pub struct Band<'a> {
    first_row: usize,
    width: usize,
    samples: &'a mut [f64],
}

impl<'a> Band<'a> {
    /// Absolute row indices covered by this band.
    pub fn rows(&self) -> Range<usize> {
        let height = if self.width == 0 { 0 } else { self.samples.len() / self.width };
        self.first_row..self.first_row + height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Reads the destination sample at absolute coordinates `(x, y)`.
    ///
    /// # Panics
    /// Panics when `y` is not one of this band's rows or `x` is out of range.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.samples[self.index(x, y)]
    }

    /// Writes the destination sample at absolute coordinates `(x, y)`.
    ///
    /// # Panics
    /// Panics when `y` is not one of this band's rows or `x` is out of range.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.samples[idx] = value;
    }

    fn index(&self, x: usize, y: usize) -> usize {
        let rows = self.rows();
        assert!(
            x < self.width && rows.contains(&y),
            "pixel ({x}, {y}) outside band rows {rows:?}"
        );
        (y - self.first_row) * self.width + x
    }
}

/// Fan-out/fan-in helper that runs one function per band and joins.
#[derive(Debug, Clone, Default)]
pub struct RegionExecutor {
    granularity: usize,
    cancel_signal: Option<Arc<AtomicBool>>,
}

impl RegionExecutor {
    /// Creates an executor.
    ///
    /// # Parameters
    /// - `granularity`: number of bands per pass; `0` uses the available parallelism.
    pub fn new(granularity: usize) -> Self {
        Self { granularity, cancel_signal: None }
    }

    /// Attaches a cancel signal checked by every worker before it starts its band.
    pub fn with_cancel_signal(mut self, cancel_signal: Arc<AtomicBool>) -> Self {
        self.cancel_signal = Some(cancel_signal);
        self
    }

    pub fn granularity(&self) -> usize {
        self.granularity
    }

    /// Number of bands a pass will use, before capping by the matrix height.
    pub fn workers(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.granularity).unwrap_or_else(default_parallelism)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_signal.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Runs `region_fn` over every band of `destination`, reading from `source`.
    ///
    /// Blocks until every worker has finished.
    ///
    /// # Errors
    /// - `DimensionMismatch` when `source` and `destination` differ in size.
    /// - `WorkerPanicked` when any band function panicked.
    /// - `Cancelled` when the cancel signal was raised; `destination` is then partial and
    ///   must be discarded.
    pub fn run<F>(
        &self,
        source: &PixelMatrix,
        destination: &mut PixelMatrix,
        region_fn: F,
    ) -> Result<(), HuginnMinutiaeError>
    where
        F: Fn(&PixelMatrix, &mut Band<'_>) + Sync,
    {
        source.ensure_same_dimensions(destination)?;

        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Ok(());
        }

        let bands = self.workers().get().min(height);
        let rows_per_band = height.div_ceil(bands);
        trace!("Region pass: {bands} bands of up to {rows_per_band} rows over {width}x{height}");

        let region_fn = &region_fn;
        let cancel_signal = self.cancel_signal.as_deref();

        let outcome = crossbeam::thread::scope(|scope| {
            for (band_id, samples) in
                destination.as_mut_slice().chunks_mut(rows_per_band * width).enumerate()
            {
                scope.spawn(move |_| {
                    if cancel_signal.is_some_and(|c| c.load(Ordering::Relaxed)) {
                        trace!("Band {band_id} skipped after cancellation");
                        return;
                    }
                    let mut band = Band { first_row: band_id * rows_per_band, width, samples };
                    region_fn(source, &mut band);
                });
            }
        });

        if let Err(payload) = outcome {
            return Err(HuginnMinutiaeError::WorkerPanicked(panic_message(payload.as_ref())));
        }

        if self.is_cancelled() {
            debug!("Region pass cancelled, discarding partial output");
            return Err(HuginnMinutiaeError::Cancelled);
        }

        Ok(())
    }
}

/// Runs one region pass with a fresh executor.
///
/// # Parameters
/// - `granularity`: number of bands; `0` uses the available parallelism.
pub fn run_in_parallel<F>(
    source: &PixelMatrix,
    destination: &mut PixelMatrix,
    granularity: usize,
    region_fn: F,
) -> Result<(), HuginnMinutiaeError>
where
    F: Fn(&PixelMatrix, &mut Band<'_>) + Sync,
{
    RegionExecutor::new(granularity).run(source, destination, region_fn)
}

/// Worker count used when no explicit granularity is given.
pub fn default_parallelism() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    // crossbeam collects the payloads of every panicked worker into a Vec
    if let Some(panics) = payload.downcast_ref::<Vec<Box<dyn Any + Send + 'static>>>() {
        return panics
            .first()
            .map(|p| panic_message(p.as_ref()))
            .unwrap_or_else(|| "unknown panic payload".to_string());
    }
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
