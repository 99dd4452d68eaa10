//! Mark-Sweep Collector - Full Heap, Non-Moving
//!
//! Every reachable object gets its mark bit set and is scanned once. Nothing
//! moves, so `saw_object` never hands back a new address. The engine's sweep
//! deletes whatever is still unmarked.

use super::{Collector, ObjectMark};
use crate::object::ObjectRef;

#[derive(Debug, Default)]
pub struct MarkSweepCollector;

impl MarkSweepCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Collector for MarkSweepCollector {
    fn name(&self) -> &'static str {
        "mark-sweep"
    }

    fn saw_object(&self, mark: &ObjectMark<'_>) -> Option<ObjectRef> {
        let obj = mark.object();
        if mark.memory().mark(obj) {
            mark.schedule(obj);
        }
        None
    }

    fn mature_gc_in_progress(&self) -> bool {
        true
    }
}
