use huginn_minutiae::{run_in_parallel, HuginnMinutiaeError, PixelMatrix, RegionExecutor};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn gradient_matrix(width: usize, height: usize) -> PixelMatrix {
    let data = (0..width * height).map(|i| (i % 251) as f64).collect();
    match PixelMatrix::from_vec(width, height, data) {
        Ok(m) => m,
        Err(e) => panic!("Failed to build matrix: {e}"),
    }
}

/// 3x3 box blur reading outside the band, writing only inside it.
fn box_blur(granularity: usize, source: &PixelMatrix) -> PixelMatrix {
    let mut out = PixelMatrix::new(source.width(), source.height());
    let result = run_in_parallel(source, &mut out, granularity, |src, band| {
        for y in band.rows() {
            for x in 0..src.width() {
                let mut acc = 0.0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        acc += src.get_clamped(x as isize + dx, y as isize + dy);
                    }
                }
                band.set(x, y, acc / 9.0);
            }
        }
    });
    if let Err(e) = result {
        panic!("Region pass failed: {e}");
    }
    out
}

#[test]
fn test_rejects_dimension_mismatch() {
    let source = PixelMatrix::new(4, 4);
    let mut destination = PixelMatrix::new(4, 5);
    match run_in_parallel(&source, &mut destination, 2, |_, _| {}) {
        Err(HuginnMinutiaeError::DimensionMismatch { expected, found }) => {
            assert_eq!(expected, (4, 4));
            assert_eq!(found, (4, 5));
        }
        other => panic!("Expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_output_independent_of_granularity() {
    let source = gradient_matrix(37, 23);
    let reference = box_blur(1, &source);

    for granularity in [2, 3, 5, 8, 23, 64, 0] {
        assert_eq!(box_blur(granularity, &source), reference, "granularity {granularity}");
    }
}

#[test]
fn test_every_row_written_exactly_once() {
    let source = PixelMatrix::new(5, 17);
    let mut destination = PixelMatrix::filled(5, 17, -1.0);
    let calls = AtomicUsize::new(0);

    let result = run_in_parallel(&source, &mut destination, 4, |src, band| {
        calls.fetch_add(1, Ordering::Relaxed);
        for y in band.rows() {
            for x in 0..src.width() {
                band.set(x, y, band.get(x, y) + 1.0 + y as f64);
            }
        }
    });
    if let Err(e) = result {
        panic!("Region pass failed: {e}");
    }

    assert_eq!(calls.load(Ordering::Relaxed), 4);
    for y in 0..17 {
        assert!(destination.row(y).iter().all(|v| *v == y as f64));
    }
}

#[test]
fn test_more_bands_than_rows() {
    let source = gradient_matrix(3, 2);
    assert_eq!(box_blur(10, &source), box_blur(1, &source));
}

#[test]
fn test_empty_matrix_is_noop() {
    let source = PixelMatrix::new(0, 0);
    let mut destination = PixelMatrix::new(0, 0);
    assert!(run_in_parallel(&source, &mut destination, 4, |_, _| panic!("unreachable")).is_ok());
}

#[test]
fn test_worker_panic_is_reported() {
    let source = PixelMatrix::new(4, 8);
    let mut destination = PixelMatrix::new(4, 8);

    let result = run_in_parallel(&source, &mut destination, 4, |_, band| {
        if band.rows().contains(&7) {
            panic!("band failure");
        }
    });

    match result {
        Err(HuginnMinutiaeError::WorkerPanicked(msg)) => assert!(msg.contains("band failure")),
        other => panic!("Expected WorkerPanicked, got {other:?}"),
    }
}

#[test]
fn test_cancelled_pass() {
    let cancel = Arc::new(AtomicBool::new(true));
    let executor = RegionExecutor::new(3).with_cancel_signal(Arc::clone(&cancel));
    let source = PixelMatrix::new(4, 9);
    let mut destination = PixelMatrix::new(4, 9);

    let result = executor.run(&source, &mut destination, |_, band| {
        for y in band.rows() {
            band.set(0, y, 1.0);
        }
    });

    assert!(matches!(result, Err(HuginnMinutiaeError::Cancelled)));
    assert!(destination.as_slice().iter().all(|v| *v == 0.0));
}

#[test]
fn test_default_granularity_uses_available_parallelism() {
    let executor = RegionExecutor::default();
    assert_eq!(executor.granularity(), 0);
    assert!(executor.workers().get() >= 1);
    assert_eq!(RegionExecutor::new(6).workers().get(), 6);
}
