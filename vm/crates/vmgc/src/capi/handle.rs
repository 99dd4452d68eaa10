//! Native Handles
//!
//! A native extension never holds a raw object address. It holds a handle,
//! and the collector keeps the handle's object slot current. A handle with
//! outstanding references is strong and acts as a root; once native code
//! drops every reference the handle turns weak and is invalidated as soon
//! as its object dies.

use crate::error::{GcError, Result};
use crate::object::ObjectRef;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// One native handle
#[derive(Debug)]
pub struct Handle {
    id: u64,
    object: Mutex<ObjectRef>,
    references: AtomicUsize,
    valid: AtomicBool,
}

impl Handle {
    fn new(id: u64, object: ObjectRef) -> Self {
        Self {
            id,
            object: Mutex::new(object),
            references: AtomicUsize::new(1),
            valid: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Object behind the handle
    pub fn get(&self) -> Result<ObjectRef> {
        if !self.is_valid() {
            return Err(GcError::InvalidHandle(self.id));
        }
        Ok(*self.object.lock())
    }

    /// Raw slot value, whatever the validity
    pub fn object(&self) -> ObjectRef {
        *self.object.lock()
    }

    pub fn set_object(&self, object: ObjectRef) {
        *self.object.lock() = object;
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Strong handles keep their object alive
    pub fn is_strong(&self) -> bool {
        self.references.load(Ordering::Acquire) > 0
    }

    pub fn references(&self) -> usize {
        self.references.load(Ordering::Acquire)
    }

    pub fn retain(&self) {
        self.references.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop one reference; the handle is weak once none remain
    ///
    /// Returns false when the handle held no references to drop.
    pub fn release(&self) -> bool {
        let released = self
            .references
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if !released {
            log::warn!("handle {} released with no references held", self.id);
        }
        released
    }

    /// Mark the handle collected; later `get` calls fail
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
        *self.object.lock() = ObjectRef::NULL;
    }
}

/// Table of every native handle
#[derive(Debug, Default)]
pub struct Handles {
    table: Mutex<IndexMap<u64, Arc<Handle>>>,
    next_id: AtomicU64,
}

impl Handles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strong handle for `object`
    pub fn allocate(&self, object: ObjectRef) -> Arc<Handle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = Arc::new(Handle::new(id, object));
        self.table.lock().insert(id, handle.clone());
        handle
    }

    pub fn find(&self, id: u64) -> Result<Arc<Handle>> {
        self.table
            .lock()
            .get(&id)
            .cloned()
            .ok_or(GcError::InvalidHandle(id))
    }

    /// Snapshot of every handle in the table
    pub fn handles(&self) -> Vec<Arc<Handle>> {
        self.table.lock().values().cloned().collect()
    }

    /// Drop invalidated handles from the table; returns how many went
    pub fn remove_invalid(&self) -> usize {
        let mut table = self.table.lock();
        let before = table.len();
        table.retain(|_, handle| handle.is_valid());
        before - table.len()
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

/// Handles cached by native code between calls, revalidated each pass
#[derive(Debug, Default)]
pub struct CachedHandles {
    list: Mutex<Vec<Arc<Handle>>>,
}

impl CachedHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, handle: Arc<Handle>) {
        self.list.lock().push(handle);
    }

    pub fn handles(&self) -> Vec<Arc<Handle>> {
        self.list.lock().clone()
    }

    /// Forget handles that are no longer valid; returns how many went
    pub fn prune(&self) -> usize {
        let mut list = self.list.lock();
        let before = list.len();
        list.retain(|handle| handle.is_valid());
        before - list.len()
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }
}
