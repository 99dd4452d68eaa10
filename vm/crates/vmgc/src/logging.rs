//! GC Logging and Tracing
//!
//! Structured events for every pass, kept in memory for inspection and
//! forwarded to the `log` facade. Console output is optional and can be
//! human readable or one JSON object per line. The in-memory log is a ring:
//! once it holds `max_events` entries the oldest one is dropped.
//!
//! Log Levels:
//! - ERROR: fatal invariant violations (logged by `error::fatal`)
//! - INFO: pass start and end
//! - DEBUG: phase ends, weak reference, handle, lock and sweep totals
//! - TRACE: per-object operations (logged directly through `log::trace!`)

use chrono::{DateTime, Local};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::GcConfig;
use crate::gc::GcGeneration;

/// Log level for GC events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// GC event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GcEvent {
    /// Pass started
    CycleStart {
        cycle: u64,
        generation: GcGeneration,
        collector: String,
    },

    /// One root category or cleanup step finished
    PhaseEnd {
        cycle: u64,
        phase: String,
        duration_ms: f64,
    },

    /// Weak reference set after cleaning
    WeakRefStats {
        cycle: u64,
        tracked: usize,
        cleared: u64,
    },

    /// Native handle reconciliation
    HandleStats {
        cycle: u64,
        live: usize,
        invalidated: u64,
        cached_dropped: usize,
    },

    /// Locked objects kept across the pass
    LockedObjectStats { cycle: u64, retained: u64 },

    /// Objects deleted by the sweep
    SweepStats {
        cycle: u64,
        deleted: u64,
        cleanups: u64,
        cache_entries_dropped: usize,
    },

    /// Post-pass frame verification
    VerifyStats { cycle: u64, objects_verified: usize },

    /// Pass completed
    CycleEnd {
        cycle: u64,
        generation: GcGeneration,
        duration_ms: f64,
        marked: u64,
        deleted: u64,
        promoted: u64,
    },
}

impl GcEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            GcEvent::CycleStart { .. } | GcEvent::CycleEnd { .. } => LogLevel::Info,
            GcEvent::PhaseEnd { .. } => LogLevel::Debug,
            GcEvent::WeakRefStats { .. }
            | GcEvent::HandleStats { .. }
            | GcEvent::LockedObjectStats { .. }
            | GcEvent::SweepStats { .. }
            | GcEvent::VerifyStats { .. } => LogLevel::Debug,
        }
    }

    /// Single line, human readable
    pub fn describe(&self) -> String {
        match self {
            GcEvent::CycleStart {
                cycle,
                generation,
                collector,
            } => format!("[GC] Cycle {} started ({:?} pass, {})", cycle, generation, collector),
            GcEvent::PhaseEnd {
                cycle,
                phase,
                duration_ms,
            } => format!("[GC] Cycle {}: {} done ({:.3}ms)", cycle, phase, duration_ms),
            GcEvent::WeakRefStats {
                cycle,
                tracked,
                cleared,
            } => format!(
                "[GC] Cycle {}: weak refs {} tracked, {} cleared",
                cycle, tracked, cleared
            ),
            GcEvent::HandleStats {
                cycle,
                live,
                invalidated,
                cached_dropped,
            } => format!(
                "[GC] Cycle {}: handles {} live, {} invalidated, {} cached dropped",
                cycle, live, invalidated, cached_dropped
            ),
            GcEvent::LockedObjectStats { cycle, retained } => {
                format!("[GC] Cycle {}: {} locked objects retained", cycle, retained)
            }
            GcEvent::SweepStats {
                cycle,
                deleted,
                cleanups,
                cache_entries_dropped,
            } => format!(
                "[GC] Cycle {}: swept {} objects ({} cleanups, {} cache entries dropped)",
                cycle, deleted, cleanups, cache_entries_dropped
            ),
            GcEvent::VerifyStats {
                cycle,
                objects_verified,
            } => format!("[GC] Cycle {}: verified {} references", cycle, objects_verified),
            GcEvent::CycleEnd {
                cycle,
                generation,
                duration_ms,
                marked,
                deleted,
                promoted,
            } => format!(
                "[GC] Cycle {} completed ({:?}, {:.3}ms, {} marked, {} deleted, {} promoted)",
                cycle, generation, duration_ms, marked, deleted, promoted
            ),
        }
    }
}

/// Events retained by a default logger, about eighty passes
pub const DEFAULT_MAX_EVENTS: usize = 1024;

/// GC Logger configuration
#[derive(Debug, Clone)]
pub struct GcLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Print events to stdout
    pub console: bool,

    /// Print JSON lines instead of text
    pub json: bool,

    /// Prefix console lines with a local timestamp
    pub timestamps: bool,

    /// Events kept in memory; 0 keeps none
    pub max_events: usize,
}

impl Default for GcLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            console: false,
            json: false,
            timestamps: true,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl From<&GcConfig> for GcLoggerConfig {
    fn from(config: &GcConfig) -> Self {
        Self {
            level: if config.log_phases {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
            console: config.verbose,
            json: config.json_log,
            timestamps: true,
            max_events: config.max_log_events,
        }
    }
}

/// Records GC events
#[derive(Debug)]
pub struct GcLogger {
    config: RwLock<GcLoggerConfig>,
    events: Mutex<VecDeque<(DateTime<Local>, GcEvent)>>,
    enabled: AtomicBool,
}

impl GcLogger {
    pub fn new(config: GcLoggerConfig) -> Self {
        Self {
            config: RwLock::new(config),
            events: Mutex::new(VecDeque::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn reconfigure(&self, config: GcLoggerConfig) {
        *self.config.write() = config;
    }

    pub fn log(&self, event: GcEvent) {
        if !self.is_enabled() {
            return;
        }

        let config = self.config.read().clone();
        let level = event.level();
        if level > config.level {
            return;
        }

        let now = Local::now();
        let facade_level: log::Level = level.into();
        log::log!(facade_level, "{}", event.describe());
        if config.console {
            self.output_console(&config, now, &event);
        }
        self.record(config.max_events, now, event);
    }

    fn record(&self, max_events: usize, now: DateTime<Local>, event: GcEvent) {
        let mut events = self.events.lock();
        if max_events == 0 {
            events.clear();
            return;
        }
        while events.len() >= max_events {
            events.pop_front();
        }
        events.push_back((now, event));
    }

    fn output_console(&self, config: &GcLoggerConfig, now: DateTime<Local>, event: &GcEvent) {
        let line = if config.json {
            match serde_json::to_string(event) {
                Ok(json) => json,
                Err(err) => {
                    log::warn!("failed to encode GC event: {}", err);
                    return;
                }
            }
        } else {
            event.describe()
        };

        if config.timestamps {
            println!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), line);
        } else {
            println!("{}", line);
        }
    }

    pub fn events(&self) -> Vec<GcEvent> {
        self.events
            .lock()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Default for GcLogger {
    fn default() -> Self {
        Self::new(GcLoggerConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Arc<GcLogger> = Arc::new(GcLogger::default());
}

/// Process-wide logger used by engines built without one
pub fn global_logger() -> Arc<GcLogger> {
    GLOBAL_LOGGER.clone()
}

/// Replace the configuration of the process-wide logger
pub fn configure_logger(config: GcLoggerConfig) {
    GLOBAL_LOGGER.reconfigure(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(cycle: u64) -> GcEvent {
        GcEvent::CycleStart {
            cycle,
            generation: GcGeneration::Full,
            collector: "mark-sweep".to_string(),
        }
    }

    #[test]
    fn test_logger_records_events() {
        let logger = GcLogger::default();
        logger.log(start(1));
        logger.log(GcEvent::PhaseEnd {
            cycle: 1,
            phase: "roots".to_string(),
            duration_ms: 0.1,
        });
        assert_eq!(logger.event_count(), 2);

        logger.clear_events();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_logger_disable() {
        let logger = GcLogger::default();
        logger.disable();
        logger.log(start(1));
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_level_filter() {
        let logger = GcLogger::new(GcLoggerConfig {
            level: LogLevel::Info,
            ..Default::default()
        });
        logger.log(GcEvent::LockedObjectStats {
            cycle: 1,
            retained: 2,
        });
        logger.log(start(1));
        assert_eq!(logger.event_count(), 1);
    }

    #[test]
    fn test_event_log_is_bounded() {
        let logger = GcLogger::new(GcLoggerConfig {
            max_events: 3,
            ..Default::default()
        });
        for cycle in 1..=10 {
            logger.log(start(cycle));
        }
        assert_eq!(logger.event_count(), 3);

        // Oldest entries go first
        let cycles: Vec<u64> = logger
            .events()
            .iter()
            .map(|event| match event {
                GcEvent::CycleStart { cycle, .. } => *cycle,
                _ => 0,
            })
            .collect();
        assert_eq!(cycles, vec![8, 9, 10]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let logger = GcLogger::new(GcLoggerConfig {
            max_events: 0,
            ..Default::default()
        });
        logger.log(start(1));
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(start(7)).unwrap();
        assert_eq!(json["type"], "cycle_start");
        assert_eq!(json["cycle"], 7);
        assert_eq!(json["generation"], "Full");
    }
}
