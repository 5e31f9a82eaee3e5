use crate::detection::domain::scan_executor::{ScanExecutor, SequentialScanExecutor};

use super::threaded_scan_executor::ThreadedScanExecutor;

/// Creates a scan executor for the requested worker count.
///
/// One worker (or zero) scans on the calling thread; anything more uses
/// the threaded executor. Logs which executor is selected.
pub fn create_executor(workers: usize) -> Box<dyn ScanExecutor> {
    if workers > 1 {
        log::info!("Scanning with {workers} worker threads");
        Box::new(ThreadedScanExecutor::new(workers))
    } else {
        log::info!("Scanning on the calling thread");
        Box::new(SequentialScanExecutor)
    }
}
