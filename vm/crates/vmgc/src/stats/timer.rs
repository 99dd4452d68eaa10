//! Timers for passes and their phases

use std::time::{Duration, Instant};

/// Wall clock timer for one pass
#[derive(Debug, Clone, Copy)]
pub struct GcTimer {
    start: Instant,
}

impl GcTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for GcTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a pass into consecutive named phases
#[derive(Debug)]
pub struct PhaseTimer {
    phase_start: Instant,
    phases: Vec<(&'static str, Duration)>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self {
            phase_start: Instant::now(),
            phases: Vec::new(),
        }
    }

    /// Close the running phase under `name` and start the next one
    pub fn finish(&mut self, name: &'static str) -> Duration {
        let now = Instant::now();
        let duration = now - self.phase_start;
        self.phases.push((name, duration));
        self.phase_start = now;
        duration
    }

    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}
