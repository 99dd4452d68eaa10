//! Young Collector - Promoting Young Pass
//!
//! Only young objects can die in a young pass. Each young object the pass
//! reaches is moved into the mature space the first time it is seen; later
//! sightings of the old address get the forwarding address back. Mature
//! objects are live by definition and are not traced, except the ones in
//! the remembered set, which the engine scans as extra roots.

use super::{Collector, ObjectMark};
use crate::error::fatal;
use crate::object::ObjectRef;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct YoungCollector {
    promoted: AtomicU64,
    promoted_bytes: AtomicU64,
}

impl YoungCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes moved to the mature space during the current pass
    pub fn promoted_bytes(&self) -> u64 {
        self.promoted_bytes.load(Ordering::Relaxed)
    }
}

impl Collector for YoungCollector {
    fn name(&self) -> &'static str {
        "young"
    }

    fn saw_object(&self, mark: &ObjectMark<'_>) -> Option<ObjectRef> {
        let obj = mark.object();
        let memory = mark.memory();

        if !memory.is_young(obj) {
            return None;
        }
        if let Some(forward) = memory.forwarded(obj) {
            return Some(forward);
        }

        let size = memory.size_of(obj).unwrap_or(0);
        let promoted = match memory.promote(obj) {
            Ok(promoted) => promoted,
            Err(err) => fatal(format!("promoting {:?}: {}", obj, err)),
        };

        self.promoted.fetch_add(1, Ordering::Relaxed);
        self.promoted_bytes.fetch_add(size as u64, Ordering::Relaxed);
        mark.schedule(promoted);
        Some(promoted)
    }

    /// A scanned object no longer points into the young space
    fn scanned_object(&self, mark: &ObjectMark<'_>) {
        let memory = mark.memory();
        if memory.is_remembered(mark.object()) {
            memory.unremember(mark.object());
        }
    }

    fn mature_gc_in_progress(&self) -> bool {
        false
    }

    fn reset_stats(&self) {
        self.promoted.store(0, Ordering::Relaxed);
        self.promoted_bytes.store(0, Ordering::Relaxed);
    }

    fn objects_promoted(&self) -> u64 {
        self.promoted.load(Ordering::Relaxed)
    }
}
