//! Histogram - Pause Time Distribution
//!
//! Power-of-two buckets over nanosecond pause times. Percentiles report the
//! upper bound of the bucket that crosses the requested rank, which is
//! coarse but never under-reports a pause.

use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Buckets {
    counts: BTreeMap<u32, u64>,
    count: u64,
    sum: u64,
    min: Option<u64>,
    max: u64,
}

#[derive(Debug, Default)]
pub struct Histogram {
    inner: Mutex<Buckets>,
}

/// Bucket index: number of significant bits
fn bucket_of(value: u64) -> u32 {
    64 - value.leading_zeros()
}

/// Largest value that still falls in `bucket`
fn bucket_limit(bucket: u32) -> u64 {
    match bucket {
        0 => 0,
        64 => u64::MAX,
        b => (1u64 << b) - 1,
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, value: u64) {
        let mut inner = self.inner.lock();
        *inner.counts.entry(bucket_of(value)).or_insert(0) += 1;
        inner.count += 1;
        inner.sum = inner.sum.saturating_add(value);
        inner.min = Some(inner.min.map_or(value, |min| min.min(value)));
        inner.max = inner.max.max(value);
    }

    /// Upper bound of the bucket holding the `p` quantile, `p` in `0.0..=1.0`
    pub fn percentile(&self, p: f64) -> u64 {
        let inner = self.inner.lock();
        if inner.count == 0 {
            return 0;
        }

        let rank = ((inner.count as f64) * p.clamp(0.0, 1.0)).ceil().max(1.0) as u64;
        let mut seen = 0;
        for (&bucket, &count) in &inner.counts {
            seen += count;
            if seen >= rank {
                return bucket_limit(bucket).min(inner.max);
            }
        }
        inner.max
    }

    pub fn p50(&self) -> u64 {
        self.percentile(0.50)
    }

    pub fn p99(&self) -> u64 {
        self.percentile(0.99)
    }

    pub fn mean(&self) -> u64 {
        let inner = self.inner.lock();
        if inner.count == 0 {
            0
        } else {
            inner.sum / inner.count
        }
    }

    pub fn min(&self) -> u64 {
        self.inner.lock().min.unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.inner.lock().max
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    pub fn clear(&self) {
        *self.inner.lock() = Buckets::default();
    }
}
