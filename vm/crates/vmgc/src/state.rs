//! Shared State - Everything a VM Hands to the Collector
//!
//! `SharedState` owns object memory and the collaborator tables the
//! collector scans, plus one long-lived engine per generation. Each engine
//! keeps its weak reference set between passes, so weak registrations made
//! through [`SharedState::add_weak_ref`] go to both.

use crate::capi::{CachedHandles, GlobalHandles, Handles};
use crate::config::GcConfig;
use crate::error::Result;
use crate::gc::{
    CollectionReport, GarbageCollector, GcData, GcGeneration, MarkSweepCollector, YoungCollector,
};
use crate::global_cache::GlobalCache;
use crate::logging::{GcLogger, GcLoggerConfig};
use crate::memory::Memory;
use crate::object::ObjectRef;
use crate::roots::Roots;
use crate::stats::GcStats;
use crate::thread::ThreadNexus;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct SharedState {
    config: GcConfig,
    memory: Arc<Memory>,
    roots: Roots,
    handles: Handles,
    cached_handles: CachedHandles,
    global_handles: GlobalHandles,
    global_cache: GlobalCache,
    thread_nexus: ThreadNexus,
    stats: Arc<GcStats>,
    logger: Arc<GcLogger>,
    young: GarbageCollector,
    full: GarbageCollector,
    /// Serializes passes
    collecting: Mutex<()>,
}

impl SharedState {
    /// Validate `config` and build an empty VM heap
    pub fn new(config: GcConfig) -> Result<Self> {
        config.validate()?;

        let memory = Arc::new(Memory::new(&config));
        let stats = Arc::new(GcStats::new());
        let logger = Arc::new(GcLogger::new(GcLoggerConfig::from(&config)));

        let young = GarbageCollector::new(
            memory.clone(),
            Box::new(YoungCollector::new()),
            config.clone(),
        )
        .with_stats(stats.clone())
        .with_logger(logger.clone());
        let full = GarbageCollector::new(
            memory.clone(),
            Box::new(MarkSweepCollector::new()),
            config.clone(),
        )
        .with_stats(stats.clone())
        .with_logger(logger.clone());

        log::debug!(
            "vmgc heap: young {} bytes, mature {} bytes",
            config.young_space_size,
            config.mature_space_size
        );

        Ok(Self {
            config,
            memory,
            roots: Roots::new(),
            handles: Handles::new(),
            cached_handles: CachedHandles::new(),
            global_handles: GlobalHandles::new(),
            global_cache: GlobalCache::new(),
            thread_nexus: ThreadNexus::new(),
            stats,
            logger,
            young,
            full,
            collecting: Mutex::new(()),
        })
    }

    /// Borrow the collaborator tables for one pass
    pub fn gc_data(&self) -> GcData<'_> {
        GcData::new(
            &self.roots,
            &self.handles,
            &self.cached_handles,
            &self.global_cache,
            &self.thread_nexus,
            &self.global_handles,
        )
    }

    /// Run one pass of the given generation
    ///
    /// Every registered thread must be stopped at a safe point.
    pub fn collect(&self, generation: GcGeneration) -> CollectionReport {
        let _pass = self.collecting.lock();
        let data = self.gc_data();
        self.engine(generation).verify(&data)
    }

    pub fn engine(&self, generation: GcGeneration) -> &GarbageCollector {
        match generation {
            GcGeneration::Young => &self.young,
            GcGeneration::Full => &self.full,
        }
    }

    /// Register a weak reference holder with both engines
    pub fn add_weak_ref(&self, obj: ObjectRef) {
        self.young.add_weak_ref(obj);
        self.full.add_weak_ref(obj);
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn memory(&self) -> &Arc<Memory> {
        &self.memory
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn handles(&self) -> &Handles {
        &self.handles
    }

    pub fn cached_handles(&self) -> &CachedHandles {
        &self.cached_handles
    }

    pub fn global_handles(&self) -> &GlobalHandles {
        &self.global_handles
    }

    pub fn global_cache(&self) -> &GlobalCache {
        &self.global_cache
    }

    pub fn thread_nexus(&self) -> &ThreadNexus {
        &self.thread_nexus
    }

    pub fn stats(&self) -> &Arc<GcStats> {
        &self.stats
    }

    pub fn logger(&self) -> &Arc<GcLogger> {
        &self.logger
    }
}
