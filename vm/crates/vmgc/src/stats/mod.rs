//! Stats Module - Collection Counters
//!
//! Running totals over every pass, fed from each pass's
//! [`CollectionReport`](crate::gc::CollectionReport):
//! - pass counts per generation
//! - objects marked, scanned, deleted and promoted
//! - weak references cleared and native handles invalidated
//! - pause time distribution

pub mod histogram;
pub mod timer;

pub use histogram::Histogram;
pub use timer::{GcTimer, PhaseTimer};

use crate::gc::{CollectionReport, GcGeneration};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters shared by every engine of one VM
#[derive(Debug)]
pub struct GcStats {
    young_cycles: AtomicU64,
    full_cycles: AtomicU64,
    objects_marked: AtomicU64,
    objects_scanned: AtomicU64,
    objects_deleted: AtomicU64,
    objects_promoted: AtomicU64,
    weak_refs_cleared: AtomicU64,
    handles_invalidated: AtomicU64,
    pause_stats: Arc<Histogram>,
    start_time: Instant,
}

impl GcStats {
    pub fn new() -> Self {
        Self {
            young_cycles: AtomicU64::new(0),
            full_cycles: AtomicU64::new(0),
            objects_marked: AtomicU64::new(0),
            objects_scanned: AtomicU64::new(0),
            objects_deleted: AtomicU64::new(0),
            objects_promoted: AtomicU64::new(0),
            weak_refs_cleared: AtomicU64::new(0),
            handles_invalidated: AtomicU64::new(0),
            pause_stats: Arc::new(Histogram::new()),
            start_time: Instant::now(),
        }
    }

    /// Fold one finished pass into the totals
    pub fn record_pass(&self, report: &CollectionReport) {
        match report.generation {
            GcGeneration::Young => self.young_cycles.fetch_add(1, Ordering::Relaxed),
            GcGeneration::Full => self.full_cycles.fetch_add(1, Ordering::Relaxed),
        };

        self.objects_marked.fetch_add(report.marked, Ordering::Relaxed);
        self.objects_scanned.fetch_add(report.scanned, Ordering::Relaxed);
        self.objects_deleted.fetch_add(report.deleted, Ordering::Relaxed);
        self.objects_promoted.fetch_add(report.promoted, Ordering::Relaxed);
        self.weak_refs_cleared
            .fetch_add(report.weak_refs_cleared, Ordering::Relaxed);
        self.handles_invalidated
            .fetch_add(report.handles_invalidated, Ordering::Relaxed);

        self.pause_stats.record(report.duration_us * 1000);
    }

    pub fn pause_histogram(&self) -> Arc<Histogram> {
        self.pause_stats.clone()
    }

    pub fn summary(&self) -> GcSummary {
        let young = self.young_cycles.load(Ordering::Relaxed);
        let full = self.full_cycles.load(Ordering::Relaxed);
        GcSummary {
            total_cycles: young + full,
            young_cycles: young,
            full_cycles: full,
            objects_marked: self.objects_marked.load(Ordering::Relaxed),
            objects_scanned: self.objects_scanned.load(Ordering::Relaxed),
            objects_deleted: self.objects_deleted.load(Ordering::Relaxed),
            objects_promoted: self.objects_promoted.load(Ordering::Relaxed),
            weak_refs_cleared: self.weak_refs_cleared.load(Ordering::Relaxed),
            handles_invalidated: self.handles_invalidated.load(Ordering::Relaxed),
            avg_pause_ms: self.pause_stats.mean() as f64 / 1_000_000.0,
            max_pause_ms: self.pause_stats.max() as f64 / 1_000_000.0,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.young_cycles,
            &self.full_cycles,
            &self.objects_marked,
            &self.objects_scanned,
            &self.objects_deleted,
            &self.objects_promoted,
            &self.weak_refs_cleared,
            &self.handles_invalidated,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.pause_stats.clear();
    }
}

impl Default for GcStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`GcStats`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct GcSummary {
    pub total_cycles: u64,
    pub young_cycles: u64,
    pub full_cycles: u64,
    pub objects_marked: u64,
    pub objects_scanned: u64,
    pub objects_deleted: u64,
    pub objects_promoted: u64,
    pub weak_refs_cleared: u64,
    pub handles_invalidated: u64,
    pub avg_pause_ms: f64,
    pub max_pause_ms: f64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(generation: GcGeneration, deleted: u64) -> CollectionReport {
        CollectionReport {
            cycle: 1,
            generation,
            deleted,
            duration_us: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_pass_accumulates() {
        let stats = GcStats::new();
        stats.record_pass(&report(GcGeneration::Young, 3));
        stats.record_pass(&report(GcGeneration::Full, 4));

        let summary = stats.summary();
        assert_eq!(summary.total_cycles, 2);
        assert_eq!(summary.young_cycles, 1);
        assert_eq!(summary.full_cycles, 1);
        assert_eq!(summary.objects_deleted, 7);
        assert_eq!(stats.pause_histogram().count(), 2);

        stats.reset();
        assert_eq!(stats.summary().total_cycles, 0);
    }

    #[test]
    fn test_summary_serializes() {
        let json = serde_json::to_string(&GcStats::new().summary()).unwrap();
        assert!(json.contains("\"young_cycles\":0"));
    }
}
