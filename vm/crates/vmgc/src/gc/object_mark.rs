//! Object Mark - One Marking Step
//!
//! Collector variants decide liveness through an `ObjectMark`. It carries
//! the engine running the pass and the object being looked at, and is the
//! only way a variant reaches the engine's mark stack. Only the engine can
//! build one.

use super::GarbageCollector;
use crate::memory::Memory;
use crate::object::ObjectRef;

pub struct ObjectMark<'a> {
    gc: &'a GarbageCollector,
    obj: ObjectRef,
}

impl<'a> ObjectMark<'a> {
    pub(super) fn new(gc: &'a GarbageCollector, obj: ObjectRef) -> Self {
        Self { gc, obj }
    }

    /// Object under consideration
    pub fn object(&self) -> ObjectRef {
        self.obj
    }

    pub fn memory(&self) -> &'a Memory {
        self.gc.memory()
    }

    /// Queue `obj` for a slot scan
    pub fn schedule(&self, obj: ObjectRef) {
        self.gc.mark_stack.push(obj);
    }
}
