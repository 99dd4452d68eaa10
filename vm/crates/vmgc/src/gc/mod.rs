//! GC Engine - The Algorithm Independent Half of Every Collector
//!
//! [`GarbageCollector`] owns the tracing machinery every collection strategy
//! shares: root enumeration, object scanning, call frame and variable scope
//! walking, root buffer scanning, weak reference cleaning and locked object
//! reconciliation. What survives, and where it ends up, is decided by a
//! [`Collector`] variant:
//!
//! - [`MarkSweepCollector`]: full heap, marks in place, never moves
//! - [`YoungCollector`]: young space only, promotes survivors to the mature
//!   space and hands back their new addresses
//!
//! # Pass Structure
//!
//! ```text
//! verify(data)
//!   (a) roots            Roots slots (+ remembered set on a young pass)
//!   (b) threads          thread roots, frames, scopes, buffers, fibers, held locks
//!   (c) handles          strong native handles, cached handles, global locations
//!   (d) weak refs        clean_weakrefs, then weak native handles
//!   (e) locked objects   clean_locked_objects per thread
//!   sweep                delete_object on everything left unreached
//! ```
//!
//! The mark stack is drained after every category, so a later category
//! always sees the earlier ones fully traced and rewritten.

mod data;
mod displacement;
mod mark_stack;
pub mod mark_sweep;
mod object_mark;
pub mod young;

pub use data::GcData;
pub use displacement::AddressDisplacement;
pub use mark_stack::MarkStack;
pub use mark_sweep::MarkSweepCollector;
pub use object_mark::ObjectMark;
pub use young::YoungCollector;

use crate::config::GcConfig;
use crate::error::fatal;
use crate::logging::{global_logger, GcEvent, GcLogger};
use crate::memory::Memory;
use crate::object::{ObjectRef, ObjectType, VariableScopeLayout, WeakRefLayout, Zone};
use crate::stats::{GcStats, GcTimer, PhaseTimer};
use crate::thread::{
    CallFrame, ManagedThread, NativeStack, RootBuffers, StackVariables, VariableRootBuffers,
};
use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Which part of the heap a pass collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum GcGeneration {
    /// Young space only; the mature space is treated as live
    Young,
    /// Whole heap
    #[default]
    Full,
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionReport {
    pub cycle: u64,
    pub generation: GcGeneration,
    /// Objects scheduled for scanning
    pub marked: u64,
    pub scanned: u64,
    pub deleted: u64,
    pub promoted: u64,
    pub weak_refs_cleared: u64,
    pub handles_invalidated: u64,
    pub locked_objects_retained: u64,
    pub duration_us: u64,
}

/// Liveness policy of one collection strategy
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide what happens to `mark.object()`
    ///
    /// Returns the object's new address when it moved; `None` leaves the
    /// reference as it is. Objects that still need their slots visited are
    /// queued with [`ObjectMark::schedule`].
    fn saw_object(&self, mark: &ObjectMark<'_>) -> Option<ObjectRef>;

    /// Called once after every slot of `mark.object()` was visited
    fn scanned_object(&self, _mark: &ObjectMark<'_>) {}

    /// True for passes that trace the mature space
    fn mature_gc_in_progress(&self) -> bool;

    /// Clear per-pass counters
    fn reset_stats(&self) {}

    /// Objects moved to the mature space during the current pass
    fn objects_promoted(&self) -> u64 {
        0
    }
}

/// Shared collection engine, parameterized by a [`Collector`]
pub struct GarbageCollector {
    memory: Arc<Memory>,
    collector: Box<dyn Collector>,
    config: GcConfig,
    /// Created by the first registration
    weak_refs: Mutex<Option<IndexSet<ObjectRef>>>,
    mark_stack: MarkStack,
    scanned: AtomicU64,
    cycle: AtomicU64,
    stats: Arc<GcStats>,
    logger: Arc<GcLogger>,
}

impl GarbageCollector {
    pub fn new(memory: Arc<Memory>, collector: Box<dyn Collector>, config: GcConfig) -> Self {
        Self {
            memory,
            collector,
            config,
            weak_refs: Mutex::new(None),
            mark_stack: MarkStack::new(),
            scanned: AtomicU64::new(0),
            cycle: AtomicU64::new(0),
            stats: Arc::new(GcStats::new()),
            logger: global_logger(),
        }
    }

    /// Share counters with other engines
    pub fn with_stats(mut self, stats: Arc<GcStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_logger(mut self, logger: Arc<GcLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn stats(&self) -> &Arc<GcStats> {
        &self.stats
    }

    pub fn logger(&self) -> &Arc<GcLogger> {
        &self.logger
    }

    /// Number of the last pass started
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::Relaxed)
    }

    // === Marking ===

    /// Canonical word for `obj` after this pass has seen it
    ///
    /// Null and immediates come back unchanged without consulting the
    /// variant. Callers store the result over the slot they read from.
    pub fn mark_object(&self, obj: ObjectRef) -> ObjectRef {
        if obj.is_null() || !obj.reference_p() {
            return obj;
        }

        let mark = ObjectMark::new(self, obj);
        match self.collector.saw_object(&mark) {
            Some(moved) => moved,
            None => obj,
        }
    }

    /// Mark every strong slot of `obj` and rewrite the ones that moved
    pub fn scan_object(&self, obj: ObjectRef) {
        if !obj.reference_p() {
            return;
        }
        let obj = self.memory.resolve(obj);

        let (object_type, slots) = match self.memory.layout(obj) {
            Ok(layout) => layout,
            Err(err) => fatal(format!("scanning {:?}: {}", obj, err)),
        };

        if object_type == ObjectType::WeakRef {
            self.add_weak_ref(obj);
        }

        for index in object_type.strong_slots(slots.len()) {
            let slot = slots[index];
            let updated = self.mark_object(slot);
            if updated != slot {
                self.store(obj, index, updated);
            }
        }

        self.scanned.fetch_add(1, Ordering::Relaxed);
        self.collector.scanned_object(&ObjectMark::new(self, obj));
    }

    /// Scan queued objects until none are left
    pub fn process_mark_stack(&self) {
        while let Some(obj) = self.mark_stack.pop() {
            self.scan_object(obj);
        }
    }

    /// Release an object proven unreachable
    pub fn delete_object(&self, obj: ObjectRef) {
        let object_type = match self.memory.object_type(obj) {
            Some(object_type) => object_type,
            None => fatal(format!("deleting {:?}, which holds no object", obj)),
        };
        crate::gc_assert!(
            !self.memory.is_marked(obj),
            "deleting reachable object {:?}",
            obj
        );
        crate::gc_assert!(
            self.memory.lock_owner(obj).is_none(),
            "deleting {:?} while a thread holds its lock",
            obj
        );

        if object_type.requires_cleanup() {
            self.memory.record_cleanup();
        }
        self.memory.free(obj);
        log::trace!("deleted {} {:?}", object_type.name(), obj);
    }

    fn store(&self, obj: ObjectRef, index: usize, value: ObjectRef) {
        if let Err(err) = self.memory.set_slot(obj, index, value) {
            fatal(format!("updating slot {} of {:?}: {}", index, obj, err));
        }
    }

    // === Frames and Scopes ===

    /// Mark everything reachable from the frame chain starting at `top`
    ///
    /// Every frame address, including each `previous` link, goes through
    /// `offset` before it is looked up in `stack`.
    pub fn walk_call_frame(
        &self,
        stack: &mut NativeStack,
        top: Option<usize>,
        offset: &AddressDisplacement,
    ) -> usize {
        let limit = stack.frame_count();
        let mut walked = 0;
        let mut current = top;

        while let Some(address) = current {
            crate::gc_assert!(walked < limit, "call frame chain loops at {:#x}", address);
            let address = offset.displace(address);
            let frame = match stack.frame_mut(address) {
                Some(frame) => frame,
                None => fatal(format!("frame link {:#x} points outside the stack", address)),
            };

            current = frame.previous;
            self.walk_frame(frame);
            walked += 1;
        }
        walked
    }

    fn walk_frame(&self, frame: &mut CallFrame) {
        frame.compiled_code = self.mark_object(frame.compiled_code);
        frame.lexical_scope = self.mark_object(frame.lexical_scope);
        frame.top_scope = self.mark_object(frame.top_scope);

        for value in frame.arguments.iter_mut().chain(frame.stack.iter_mut()) {
            *value = self.mark_object(*value);
        }

        if let Some(scope) = frame.scope.as_mut() {
            self.saw_variable_scope(scope);
        }
    }

    /// Mark a scope's locals and its whole heap parent chain
    pub fn saw_variable_scope(&self, scope: &mut StackVariables) {
        scope.self_value = self.mark_object(scope.self_value);
        scope.block = self.mark_object(scope.block);
        scope.module = self.mark_object(scope.module);
        scope.last_match = self.mark_object(scope.last_match);
        for local in scope.locals.iter_mut() {
            *local = self.mark_object(*local);
        }
        scope.on_heap = self.mark_object(scope.on_heap);
        scope.parent = self.mark_object(scope.parent);

        let mut visited = IndexSet::new();
        let mut current = scope.parent;
        while current.reference_p() && visited.insert(current) {
            let parent = match self.memory.slot(current, VariableScopeLayout::PARENT) {
                Ok(parent) => parent,
                Err(err) => fatal(format!("variable scope {:?}: {}", current, err)),
            };
            let updated = self.mark_object(parent);
            if updated != parent {
                self.store(current, VariableScopeLayout::PARENT, updated);
            }
            current = updated;
        }
    }

    /// Check every reference in the frame chain names a live object
    ///
    /// Walks exactly what [`walk_call_frame`](Self::walk_call_frame) walks
    /// but never changes anything. Returns the number of references checked.
    pub fn verify_call_frame(
        &self,
        stack: &NativeStack,
        top: Option<usize>,
        offset: &AddressDisplacement,
    ) -> usize {
        let limit = stack.frame_count();
        let mut frames = 0;
        let mut verified = 0;
        let mut current = top;

        while let Some(address) = current {
            crate::gc_assert!(frames < limit, "call frame chain loops at {:#x}", address);
            let address = offset.displace(address);
            let frame = match stack.frame(address) {
                Some(frame) => frame,
                None => fatal(format!("frame link {:#x} points outside the stack", address)),
            };

            verified += self.verify_reference(frame.compiled_code, "compiled code");
            verified += self.verify_reference(frame.lexical_scope, "lexical scope");
            verified += self.verify_reference(frame.top_scope, "top scope");
            for value in frame.arguments.iter().chain(frame.stack.iter()) {
                verified += self.verify_reference(*value, "frame slot");
            }
            if let Some(scope) = frame.scope.as_ref() {
                verified += self.verify_variable_scope(scope);
            }

            current = frame.previous;
            frames += 1;
        }
        verified
    }

    /// Read-only counterpart of [`saw_variable_scope`](Self::saw_variable_scope)
    pub fn verify_variable_scope(&self, scope: &StackVariables) -> usize {
        let mut verified = 0;
        for value in [
            scope.self_value,
            scope.block,
            scope.module,
            scope.last_match,
            scope.on_heap,
        ]
        .iter()
        .chain(scope.locals.iter())
        {
            verified += self.verify_reference(*value, "scope slot");
        }

        let mut visited = IndexSet::new();
        let mut current = scope.parent;
        while current.reference_p() && visited.insert(current) {
            verified += self.verify_reference(current, "parent scope");
            crate::gc_assert!(
                self.memory.object_type(current) == Some(ObjectType::VariableScope),
                "parent scope {:?} is not a VariableScope",
                current
            );
            current = match self.memory.slot(current, VariableScopeLayout::PARENT) {
                Ok(parent) => parent,
                Err(err) => fatal(format!("variable scope {:?}: {}", current, err)),
            };
        }
        verified
    }

    fn verify_reference(&self, obj: ObjectRef, what: &str) -> usize {
        if !obj.reference_p() {
            return 0;
        }
        crate::gc_assert!(
            self.memory.contains(obj),
            "{} {:?} does not name a live object",
            what,
            obj
        );
        1
    }

    // === Threads and Buffers ===

    /// Mark every root held by one thread
    pub fn scan_thread(&self, thread: &ManagedThread, young_only: bool) {
        let mut guard = thread.state();
        let state = &mut *guard;

        state.thread_object = self.mark_object(state.thread_object);
        state.current_exception = self.mark_object(state.current_exception);

        let identity = AddressDisplacement::default();
        let top = state.stack.top();
        self.walk_call_frame(&mut state.stack, top, &identity);
        self.scan_variable_buffers(
            &state.variable_root_buffers,
            &mut state.stack,
            young_only,
            &identity,
        );
        self.scan_root_buffers(&mut state.root_buffers, young_only);

        for fiber in state.fibers.iter_mut() {
            fiber.fiber_object = self.mark_object(fiber.fiber_object);
            let top = fiber.stack.top();
            self.walk_call_frame(&mut fiber.stack, top, &fiber.displacement);
            self.scan_variable_buffers(
                &fiber.variable_root_buffers,
                &mut fiber.stack,
                young_only,
                &fiber.displacement,
            );
        }

        // Held locks keep their objects alive before weak refs are cleaned.
        for locked in state.locked_objects.iter_mut() {
            let current = self.memory.resolve(*locked);
            if self.memory.lock_owner(current) == Some(thread.id()) {
                *locked = self.mark_object(current);
            }
        }

        log::trace!("scanned thread {} ({})", thread.id(), thread.name());
    }

    /// Mark the locals recorded in `buffers`, reading them from `stack`
    pub fn scan_variable_buffers(
        &self,
        buffers: &VariableRootBuffers,
        stack: &mut NativeStack,
        young_only: bool,
        offset: &AddressDisplacement,
    ) {
        for address in buffers.cells() {
            let address = offset.displace(address);
            let cell = match stack.cell_mut(address) {
                Some(cell) => cell,
                None => fatal(format!("variable root {:#x} is not on the stack", address)),
            };

            let value = *cell;
            if !value.reference_p() || (young_only && !self.memory.is_young(value)) {
                continue;
            }
            *cell = self.mark_object(value);
        }
    }

    /// Read-only counterpart of [`scan_variable_buffers`](Self::scan_variable_buffers)
    pub fn verify_variable_buffers(
        &self,
        buffers: &VariableRootBuffers,
        stack: &NativeStack,
        offset: &AddressDisplacement,
    ) -> usize {
        let mut verified = 0;
        for address in buffers.cells() {
            let address = offset.displace(address);
            let value = match stack.cell(address) {
                Some(value) => value,
                None => fatal(format!("variable root {:#x} is not on the stack", address)),
            };
            verified += self.verify_reference(value, "variable root");
        }
        verified
    }

    pub fn scan_root_buffers(&self, buffers: &mut RootBuffers, young_only: bool) {
        for buffer in buffers.iter_mut() {
            for slot in buffer.slots.iter_mut() {
                let value = *slot;
                if !value.reference_p() || (young_only && !self.memory.is_young(value)) {
                    continue;
                }
                *slot = self.mark_object(value);
            }
        }
    }

    // === Weak References ===

    /// Track `obj` as a weak reference holder
    pub fn add_weak_ref(&self, obj: ObjectRef) {
        if !obj.reference_p() {
            return;
        }
        self.weak_refs
            .lock()
            .get_or_insert_with(IndexSet::new)
            .insert(obj);
    }

    pub fn weak_ref_count(&self) -> usize {
        self.weak_refs.lock().as_ref().map_or(0, IndexSet::len)
    }

    /// True once anything was registered
    pub fn has_weak_refs(&self) -> bool {
        self.weak_refs.lock().is_some()
    }

    /// Clear weak references whose target did not survive
    ///
    /// Without `check_forwards`, liveness is the mark bit. With it, only
    /// young objects can have died: a young referrer or target that was
    /// forwarded is rewritten to its new address, one that was not is dead.
    /// Returns the number of references cleared.
    pub fn clean_weakrefs(&self, check_forwards: bool) -> u64 {
        let mut guard = self.weak_refs.lock();
        let set = match guard.as_mut() {
            Some(set) => set,
            None => return 0,
        };

        let entries: Vec<ObjectRef> = set.drain(..).collect();
        let mut cleared = 0;

        for referrer in entries {
            let referrer = match self.survivor(referrer, check_forwards) {
                Some(referrer) => referrer,
                None => continue,
            };
            if self.memory.object_type(referrer) != Some(ObjectType::WeakRef) {
                log::warn!("dropping weak registration of non-WeakRef {:?}", referrer);
                continue;
            }

            let target = match self.memory.slot(referrer, WeakRefLayout::REFERENT) {
                Ok(target) => target,
                Err(_) => continue,
            };
            if !target.reference_p() {
                set.insert(referrer);
                continue;
            }

            match self.survivor(target, check_forwards) {
                Some(live) => {
                    if live != target {
                        self.store(referrer, WeakRefLayout::REFERENT, live);
                    }
                    set.insert(referrer);
                }
                None => {
                    self.store(referrer, WeakRefLayout::REFERENT, ObjectRef::NIL);
                    cleared += 1;
                    log::trace!("weak ref {:?} lost {:?}", referrer, target);
                }
            }
        }
        cleared
    }

    /// Where `obj` lives after the marking phase, `None` when it died
    fn survivor(&self, obj: ObjectRef, check_forwards: bool) -> Option<ObjectRef> {
        if check_forwards {
            if self.memory.is_young(obj) {
                self.memory.forwarded(obj)
            } else {
                Some(obj)
            }
        } else if self.memory.is_marked(obj) {
            Some(obj)
        } else {
            None
        }
    }

    // === Locked Objects ===

    /// Reconcile a thread's locked objects list with the heap
    ///
    /// Entries whose lock was released or whose object is gone are dropped,
    /// relocated entries are rewritten and objects still locked are kept
    /// alive. Returns the number of entries kept.
    pub fn clean_locked_objects(&self, thread: &ManagedThread, young_only: bool) -> u64 {
        let mut state = thread.state();
        let locked = std::mem::take(&mut state.locked_objects);
        let mut retained: Vec<ObjectRef> = Vec::with_capacity(locked.len());

        for obj in locked {
            let current = self.memory.resolve(obj);
            if !self.memory.contains(current) {
                log::trace!("thread {}: locked {:?} is gone", thread.id(), obj);
                continue;
            }
            if self.memory.lock_owner(current) != Some(thread.id()) {
                log::trace!("thread {}: lock on {:?} released", thread.id(), current);
                continue;
            }

            let kept = if young_only && !self.memory.is_young(current) {
                current
            } else {
                self.mark_object(current)
            };
            if !retained.contains(&kept) {
                retained.push(kept);
            }
        }

        let count = retained.len() as u64;
        state.locked_objects = retained;
        count
    }

    /// Per-pass counter reset, forwarded to the variant
    pub fn reset_stats(&self) {
        self.scanned.store(0, Ordering::Relaxed);
        self.mark_stack.reset_counters();
        self.collector.reset_stats();
    }

    // === Collection ===

    /// Run one complete pass over `data`
    pub fn verify(&self, data: &GcData<'_>) -> CollectionReport {
        let timer = GcTimer::new();
        let mut phases = PhaseTimer::new();
        let cycle = self.cycle.fetch_add(1, Ordering::Relaxed) + 1;
        let young_only = !self.collector.mature_gc_in_progress();
        let generation = if young_only {
            GcGeneration::Young
        } else {
            GcGeneration::Full
        };

        self.reset_stats();
        self.logger.log(GcEvent::CycleStart {
            cycle,
            generation,
            collector: self.collector.name().to_string(),
        });

        // (a) roots
        data.roots().update_each(|root| self.mark_object(root.value));
        if young_only {
            for obj in self.memory.remembered_set() {
                self.scan_object(obj);
            }
        }
        self.process_mark_stack();
        self.phase_done(&mut phases, cycle, "roots");

        // (b) threads
        let threads = data.thread_nexus().threads();
        for thread in &threads {
            self.scan_thread(thread, young_only);
        }
        self.process_mark_stack();
        self.phase_done(&mut phases, cycle, "threads");

        // (c) native handles and global handle locations
        self.scan_handles(data);
        self.process_mark_stack();
        self.phase_done(&mut phases, cycle, "handles");

        // (d) weak references
        let weak_refs_cleared = self.clean_weakrefs(young_only);
        self.logger.log(GcEvent::WeakRefStats {
            cycle,
            tracked: self.weak_ref_count(),
            cleared: weak_refs_cleared,
        });
        let handles_invalidated = self.reconcile_handles(data, young_only, cycle);
        self.phase_done(&mut phases, cycle, "weak_refs");

        // (e) locked objects
        let mut locked_objects_retained = 0;
        for thread in &threads {
            locked_objects_retained += self.clean_locked_objects(thread, young_only);
        }
        self.process_mark_stack();
        self.logger.log(GcEvent::LockedObjectStats {
            cycle,
            retained: locked_objects_retained,
        });
        self.phase_done(&mut phases, cycle, "locked_objects");

        let cleanups_before = self.memory.cleanups();
        let deleted = self.sweep(young_only);
        let cache_entries_dropped = self.clean_global_cache(data, young_only);
        self.logger.log(GcEvent::SweepStats {
            cycle,
            deleted,
            cleanups: self.memory.cleanups() - cleanups_before,
            cache_entries_dropped,
        });
        self.phase_done(&mut phases, cycle, "sweep");

        let marked = self.mark_stack.pushed();
        let scanned = self.scanned.load(Ordering::Relaxed);
        let promoted = self.collector.objects_promoted();

        self.memory.clear_marks();
        self.memory.clear_forwards();
        if young_only {
            self.memory.reset_young();
        }

        if self.config.verify_after_gc {
            let objects_verified = self.verify_threads(&threads);
            self.logger.log(GcEvent::VerifyStats {
                cycle,
                objects_verified,
            });
        }

        let report = CollectionReport {
            cycle,
            generation,
            marked,
            scanned,
            deleted,
            promoted,
            weak_refs_cleared,
            handles_invalidated,
            locked_objects_retained,
            duration_us: timer.elapsed_us(),
        };
        self.stats.record_pass(&report);
        self.logger.log(GcEvent::CycleEnd {
            cycle,
            generation,
            duration_ms: timer.elapsed_ms(),
            marked,
            deleted,
            promoted,
        });
        report
    }

    fn phase_done(&self, phases: &mut PhaseTimer, cycle: u64, phase: &'static str) {
        let duration = phases.finish(phase);
        if self.config.log_phases {
            self.logger.log(GcEvent::PhaseEnd {
                cycle,
                phase: phase.to_string(),
                duration_ms: duration.as_secs_f64() * 1000.0,
            });
        }
    }

    fn scan_handles(&self, data: &GcData<'_>) {
        let handles = data.handles().handles();
        let cached = data.cached_handles().handles();
        for handle in handles.iter().chain(cached.iter()) {
            if handle.is_valid() && handle.is_strong() {
                handle.set_object(self.mark_object(handle.object()));
            }
        }

        for global in data.global_handle_locations().handles() {
            let mut slot = global.location().lock();
            *slot = self.mark_object(*slot);
        }
    }

    /// Invalidate weak handles to dead objects and rewrite moved ones
    fn reconcile_handles(&self, data: &GcData<'_>, young_only: bool, cycle: u64) -> u64 {
        let mut invalidated = 0;
        for handle in data.handles().handles() {
            if !handle.is_valid() {
                continue;
            }
            let obj = handle.object();
            if !obj.reference_p() {
                continue;
            }

            match self.survivor(obj, young_only) {
                Some(live) => handle.set_object(live),
                None => {
                    handle.invalidate();
                    invalidated += 1;
                }
            }
        }

        data.handles().remove_invalid();
        let cached_dropped = data.cached_handles().prune();
        self.logger.log(GcEvent::HandleStats {
            cycle,
            live: data.handles().len(),
            invalidated,
            cached_dropped,
        });
        invalidated
    }

    /// Delete everything the pass did not reach
    fn sweep(&self, young_only: bool) -> u64 {
        let dead: Vec<ObjectRef> = if young_only {
            self.memory.objects_in(Zone::Young)
        } else {
            self.memory
                .live_objects()
                .into_iter()
                .filter(|obj| !self.memory.is_marked(*obj))
                .collect()
        };

        for obj in &dead {
            self.delete_object(*obj);
        }
        dead.len() as u64
    }

    fn clean_global_cache(&self, data: &GcData<'_>, young_only: bool) -> usize {
        let cache = data.global_cache();
        if young_only {
            cache.update_references(|obj| self.memory.resolve(obj));
        }
        cache.prune(|obj| self.memory.contains(obj))
    }

    fn verify_threads(&self, threads: &[Arc<ManagedThread>]) -> usize {
        let identity = AddressDisplacement::default();
        let mut verified = 0;

        for thread in threads {
            let state = thread.state();
            verified += self.verify_reference(state.thread_object, "thread object");
            verified += self.verify_reference(state.current_exception, "exception");
            verified += self.verify_call_frame(&state.stack, state.stack.top(), &identity);
            verified +=
                self.verify_variable_buffers(&state.variable_root_buffers, &state.stack, &identity);
            for fiber in &state.fibers {
                verified += self.verify_reference(fiber.fiber_object, "fiber");
                verified +=
                    self.verify_call_frame(&fiber.stack, fiber.stack.top(), &fiber.displacement);
                verified += self.verify_variable_buffers(
                    &fiber.variable_root_buffers,
                    &fiber.stack,
                    &fiber.displacement,
                );
            }
            for buffer in state.root_buffers.iter() {
                for slot in &buffer.slots {
                    verified += self.verify_reference(*slot, "root buffer slot");
                }
            }
            for locked in &state.locked_objects {
                verified += self.verify_reference(*locked, "locked object");
            }
        }
        verified
    }
}
