use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::detection::domain::cascade_evaluator::CascadeEvaluator;
use crate::detection::domain::cascade_observer::StageStatistics;
use crate::detection::domain::detection_collector::DetectionCollector;
use crate::detection::domain::scale_scanner::{ScaleLevel, ScaleScanner};
use crate::detection::domain::scan_executor::{ScanExecutor, ScanReport};
use crate::shared::error::DetectionError;

const FALLBACK_WORKERS: usize = 4;

/// Executes a scan with a pool of scoped worker threads.
///
/// Layout: `main [enqueue rows] → job queue → N workers → main [merge]`
///
/// Each (level, row) pair is one job. Workers only read the shared
/// evaluator and write to their own collector; results are merged by job
/// index once every worker has finished, so the output order matches
/// [`SequentialScanExecutor`](crate::detection::domain::scan_executor::SequentialScanExecutor).
/// The first error raised by any worker stops the others and is returned.
pub struct ThreadedScanExecutor {
    workers: usize,
}

impl ThreadedScanExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedScanExecutor {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS);
        Self::new(workers)
    }
}

struct RowJob {
    index: usize,
    level: ScaleLevel,
    y: u32,
}

struct RowResult {
    index: usize,
    collector: DetectionCollector,
    windows: usize,
}

type WorkerOutput = (Vec<RowResult>, StageStatistics);

/// Holds the first error raised by any worker; later errors are dropped.
#[derive(Default)]
struct FirstError(OnceLock<DetectionError>);

impl FirstError {
    fn record(&self, error: DetectionError) {
        let _ = self.0.set(error);
    }

    fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    fn into_inner(self) -> Option<DetectionError> {
        self.0.into_inner()
    }
}

impl ScanExecutor for ThreadedScanExecutor {
    fn execute(
        &self,
        scanner: &ScaleScanner,
        evaluator: &CascadeEvaluator<'_>,
        cancelled: &AtomicBool,
    ) -> Result<ScanReport, DetectionError> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<RowJob>();
        let mut index = 0;
        for level in scanner.levels() {
            for y in scanner.rows(&level) {
                if job_tx.send(RowJob { index, level, y }).is_err() {
                    break;
                }
                index += 1;
            }
        }
        drop(job_tx);

        log::debug!("Scanning {index} rows with {} workers", self.workers);

        let failed = FirstError::default();
        let outputs: Vec<WorkerOutput> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let failed = &failed;
                    scope.spawn(move || run_worker(scanner, evaluator, job_rx, cancelled, failed))
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        if let Some(error) = failed.into_inner() {
            return Err(error);
        }
        Ok(merge_outputs(outputs))
    }
}

fn run_worker(
    scanner: &ScaleScanner,
    evaluator: &CascadeEvaluator<'_>,
    job_rx: crossbeam_channel::Receiver<RowJob>,
    cancelled: &AtomicBool,
    failed: &FirstError,
) -> WorkerOutput {
    let mut results = Vec::new();
    let mut statistics = StageStatistics::new();

    for job in job_rx {
        if failed.is_set() {
            break;
        }
        if cancelled.load(Ordering::Relaxed) {
            failed.record(DetectionError::Cancelled);
            break;
        }

        let mut collector = DetectionCollector::new();
        match scanner.scan_row(evaluator, &job.level, job.y, &mut collector, &mut statistics) {
            Ok(windows) => results.push(RowResult {
                index: job.index,
                collector,
                windows,
            }),
            Err(e) => {
                failed.record(e);
                break;
            }
        }
    }

    (results, statistics)
}

/// Orders row results by job index.
fn merge_outputs(outputs: Vec<WorkerOutput>) -> ScanReport {
    let mut rows = Vec::new();
    let mut statistics = StageStatistics::new();
    for (worker_rows, worker_stats) in outputs {
        rows.extend(worker_rows);
        statistics.merge(&worker_stats);
    }
    rows.sort_by_key(|r| r.index);

    let mut collector = DetectionCollector::new();
    let mut windows_evaluated = 0;
    for row in rows {
        windows_evaluated += row.windows;
        collector.extend(row.collector);
    }

    ScanReport {
        regions: collector.into_regions(),
        statistics,
        windows_evaluated,
    }
}
