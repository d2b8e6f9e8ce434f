//! Scan progress reporting.

use std::time::{Duration, Instant};

use dirscope_core::ScanProgress;

/// Which pass of the scan is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Counting entries to establish the progress denominator.
    Counting,
    /// Building the tree.
    Scanning,
}

/// Progress update broadcast to subscribers during a scan.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Current pass.
    pub phase: ScanPhase,
    /// Items processed by the scanning pass.
    pub scanned: u64,
    /// Items found by the counting pass.
    pub total: u64,
    /// `scanned / total` as a rounded percentage.
    pub percentage: u8,
    /// Items per second since the scan started.
    pub speed: u64,
    /// Path of the entry being processed, if any.
    pub current_item: Option<String>,
    /// Full counter snapshot.
    pub counters: ScanProgress,
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    last_emit: Option<Instant>,
    interval: Duration,
    counters: ScanProgress,
}

impl ProgressTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            last_emit: None,
            interval,
            counters: ScanProgress::new(),
        }
    }

    pub fn record_counted(&mut self, is_dir: bool) {
        self.counters.total_items += 1;
        if is_dir {
            self.counters.folder_count += 1;
        } else {
            self.counters.file_count += 1;
        }
    }

    pub fn counted(&self) -> u64 {
        self.counters.total_items
    }

    pub fn record_scanned(&mut self) {
        self.counters.scanned_items += 1;
    }

    pub fn record_bytes(&mut self, size: u64) {
        self.counters.total_size += size;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// True when at least one interval has passed since the last emitted update.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    pub fn snapshot(&self) -> ScanProgress {
        let elapsed = self.elapsed();
        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 {
            (self.counters.scanned_items as f64 / secs).round() as u64
        } else {
            0
        };
        ScanProgress {
            elapsed,
            speed,
            ..self.counters.clone()
        }
    }

    pub fn event(&self, phase: ScanPhase, current_item: Option<&str>) -> ProgressEvent {
        let counters = self.snapshot();
        ProgressEvent {
            phase,
            scanned: counters.scanned_items,
            total: counters.total_items,
            percentage: counters.percentage(),
            speed: counters.speed,
            current_item: current_item.map(str::to_string),
            counters,
        }
    }
}
