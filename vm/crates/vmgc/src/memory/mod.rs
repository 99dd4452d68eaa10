//! Memory - Object Storage for Both Generations
//!
//! `Memory` owns every heap object. Objects live in one of two spaces:
//!
//! ```text
//! ┌────────────────────────┐      promote      ┌────────────────────────┐
//! │      Young space       │ ────────────────▶ │      Mature space      │
//! │  bump, reset per pass  │                   │  bump, capacity reused │
//! └────────────────────────┘                   └────────────────────────┘
//! ```
//!
//! Promotion moves an object to a new address and leaves a forwarding
//! entry behind for the rest of the pass. Stores of young references into
//! mature objects go through the write barrier and put the mature object in
//! the remembered set, which a young pass treats as extra roots.
//!
//! # Thread Safety
//!
//! All state sits behind one lock. Every method takes the lock for the
//! duration of a single operation and never calls back out while holding it.

pub mod space;

pub use space::{Space, MATURE_BASE, WINDOW_SIZE, YOUNG_BASE};

use crate::config::GcConfig;
use crate::error::{fatal, GcError, Result};
use crate::object::{HeapObject, ObjectRef, ObjectType, Zone};
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;

/// Object memory for the VM heap
pub struct Memory {
    inner: Mutex<ObjectSpace>,
}

struct ObjectSpace {
    objects: IndexMap<usize, HeapObject>,
    /// Old address -> new address, valid until the end of the current pass
    forwards: IndexMap<usize, usize>,
    /// Mature objects holding young references
    remembered: IndexSet<usize>,
    young: Space,
    mature: Space,
    cleanups: u64,
}

/// Snapshot of memory usage
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MemoryStats {
    pub young_used: usize,
    pub young_capacity: usize,
    pub mature_used: usize,
    pub mature_capacity: usize,
    pub object_count: usize,
    pub remembered_count: usize,
}

impl ObjectSpace {
    fn get(&self, obj: ObjectRef) -> Result<&HeapObject> {
        self.objects
            .get(&obj.address())
            .ok_or(GcError::InvalidObject {
                address: obj.address(),
            })
    }

    fn get_mut(&mut self, obj: ObjectRef) -> Result<&mut HeapObject> {
        self.objects
            .get_mut(&obj.address())
            .ok_or(GcError::InvalidObject {
                address: obj.address(),
            })
    }

    fn is_young(&self, obj: ObjectRef) -> bool {
        obj.reference_p() && self.young.contains(obj.address())
    }

    fn space_mut(&mut self, zone: Zone) -> &mut Space {
        match zone {
            Zone::Young => &mut self.young,
            Zone::Mature => &mut self.mature,
        }
    }

    fn remember(&mut self, address: usize) {
        if let Some(object) = self.objects.get_mut(&address) {
            object.header.set_remembered(true);
            self.remembered.insert(address);
        }
    }
}

impl Memory {
    /// Create memory sized by the configuration
    pub fn new(config: &GcConfig) -> Self {
        Self {
            inner: Mutex::new(ObjectSpace {
                objects: IndexMap::new(),
                forwards: IndexMap::new(),
                remembered: IndexSet::new(),
                young: Space::new(Zone::Young, config.young_space_size),
                mature: Space::new(Zone::Mature, config.mature_space_size),
                cleanups: 0,
            }),
        }
    }

    // === Allocation ===

    /// Allocate a young object with the given slots
    pub fn allocate(&self, object_type: ObjectType, slots: Vec<ObjectRef>) -> Result<ObjectRef> {
        self.allocate_in(Zone::Young, object_type, slots, Vec::new())
    }

    /// Allocate directly in the mature space
    pub fn allocate_mature(
        &self,
        object_type: ObjectType,
        slots: Vec<ObjectRef>,
    ) -> Result<ObjectRef> {
        self.allocate_in(Zone::Mature, object_type, slots, Vec::new())
    }

    /// Allocate a young byte array
    pub fn allocate_bytes(&self, bytes: Vec<u8>) -> Result<ObjectRef> {
        self.allocate_in(Zone::Young, ObjectType::ByteArray, Vec::new(), bytes)
    }

    pub fn allocate_in(
        &self,
        zone: Zone,
        object_type: ObjectType,
        slots: Vec<ObjectRef>,
        bytes: Vec<u8>,
    ) -> Result<ObjectRef> {
        let object = HeapObject::new(object_type, zone, slots, bytes);
        let mut inner = self.inner.lock();

        let address = inner.space_mut(zone).allocate(object.size())?;
        let needs_barrier =
            zone == Zone::Mature && object.slots.iter().any(|slot| inner.is_young(*slot));
        inner.objects.insert(address, object);
        if needs_barrier {
            inner.remember(address);
        }

        log::trace!("allocated {} at {:#x} ({:?})", object_type.name(), address, zone);
        Ok(ObjectRef::from_address(address))
    }

    // === Queries ===

    /// True when `obj` names an object currently in memory
    pub fn contains(&self, obj: ObjectRef) -> bool {
        obj.reference_p() && self.inner.lock().objects.contains_key(&obj.address())
    }

    /// True when the address lies in the young window, live or not
    pub fn is_young(&self, obj: ObjectRef) -> bool {
        self.inner.lock().is_young(obj)
    }

    pub fn zone_of(&self, obj: ObjectRef) -> Option<Zone> {
        let inner = self.inner.lock();
        inner.get(obj).ok().map(|object| object.header.zone)
    }

    pub fn object_type(&self, obj: ObjectRef) -> Option<ObjectType> {
        let inner = self.inner.lock();
        inner.get(obj).ok().map(HeapObject::object_type)
    }

    /// Footprint of `obj` in bytes
    pub fn size_of(&self, obj: ObjectRef) -> Option<usize> {
        let inner = self.inner.lock();
        inner.get(obj).ok().map(HeapObject::size)
    }

    pub fn slot_count(&self, obj: ObjectRef) -> Result<usize> {
        Ok(self.inner.lock().get(obj)?.slots.len())
    }

    pub fn slot(&self, obj: ObjectRef, index: usize) -> Result<ObjectRef> {
        let inner = self.inner.lock();
        let object = inner.get(obj)?;
        object
            .slots
            .get(index)
            .copied()
            .ok_or(GcError::SlotOutOfBounds {
                index,
                length: object.slots.len(),
            })
    }

    /// Copy of every slot of `obj`
    pub fn slots(&self, obj: ObjectRef) -> Result<Vec<ObjectRef>> {
        Ok(self.inner.lock().get(obj)?.slots.clone())
    }

    /// Type and slot copy in one lock acquisition
    pub fn layout(&self, obj: ObjectRef) -> Result<(ObjectType, Vec<ObjectRef>)> {
        let inner = self.inner.lock();
        let object = inner.get(obj)?;
        Ok((object.object_type(), object.slots.clone()))
    }

    /// Store into a slot through the generational write barrier
    pub fn set_slot(&self, obj: ObjectRef, index: usize, value: ObjectRef) -> Result<()> {
        let mut inner = self.inner.lock();
        let value_young = inner.is_young(value);

        let object = inner.get_mut(obj)?;
        let length = object.slots.len();
        let slot = object
            .slots
            .get_mut(index)
            .ok_or(GcError::SlotOutOfBounds { index, length })?;
        *slot = value;

        if object.header.zone == Zone::Mature && value_young && !object.header.is_remembered() {
            inner.remember(obj.address());
        }
        Ok(())
    }

    // === Marking ===

    /// Set the mark bit; true when the object was not yet marked
    ///
    /// Marking an address that holds no object means something still points
    /// at a deleted object, which is fatal.
    pub fn mark(&self, obj: ObjectRef) -> bool {
        let mut inner = self.inner.lock();
        match inner.get_mut(obj) {
            Ok(object) => !object.header.set_marked(),
            Err(_) => fatal(format!("marking dangling reference {:?}", obj)),
        }
    }

    pub fn is_marked(&self, obj: ObjectRef) -> bool {
        let inner = self.inner.lock();
        inner
            .get(obj)
            .map(|object| object.header.is_marked())
            .unwrap_or(false)
    }

    pub fn clear_marks(&self) {
        let mut inner = self.inner.lock();
        for object in inner.objects.values_mut() {
            object.header.clear_mark();
        }
    }

    // === Relocation ===

    /// Move a young object into the mature space
    ///
    /// Leaves a forwarding entry so later sightings of the old address
    /// resolve to the new one. Promoting an already forwarded object returns
    /// the existing copy.
    pub fn promote(&self, obj: ObjectRef) -> Result<ObjectRef> {
        let mut inner = self.inner.lock();

        if let Some(&new_address) = inner.forwards.get(&obj.address()) {
            return Ok(ObjectRef::from_address(new_address));
        }

        let size = inner.get(obj)?.size();
        let new_address = inner.mature.allocate(size)?;
        let mut object = match inner.objects.shift_remove(&obj.address()) {
            Some(object) => object,
            None => return Err(GcError::InvalidObject { address: obj.address() }),
        };
        inner.young.release(size);

        object.header.zone = Zone::Mature;
        object.header.increment_age();
        inner.objects.insert(new_address, object);
        inner.forwards.insert(obj.address(), new_address);

        log::trace!("promoted {:#x} -> {:#x}", obj.address(), new_address);
        Ok(ObjectRef::from_address(new_address))
    }

    /// Forwarding address recorded for `obj` in this pass
    pub fn forwarded(&self, obj: ObjectRef) -> Option<ObjectRef> {
        let inner = self.inner.lock();
        inner
            .forwards
            .get(&obj.address())
            .map(|address| ObjectRef::from_address(*address))
    }

    /// `obj` after following its forwarding entry, if any
    pub fn resolve(&self, obj: ObjectRef) -> ObjectRef {
        if !obj.reference_p() {
            return obj;
        }
        self.forwarded(obj).unwrap_or(obj)
    }

    pub fn clear_forwards(&self) {
        self.inner.lock().forwards.clear();
    }

    // === Remembered Set ===

    pub fn remember(&self, obj: ObjectRef) {
        self.inner.lock().remember(obj.address());
    }

    pub fn unremember(&self, obj: ObjectRef) {
        let mut inner = self.inner.lock();
        if let Ok(object) = inner.get_mut(obj) {
            object.header.set_remembered(false);
        }
        inner.remembered.shift_remove(&obj.address());
    }

    pub fn is_remembered(&self, obj: ObjectRef) -> bool {
        self.inner.lock().remembered.contains(&obj.address())
    }

    pub fn remembered_set(&self) -> Vec<ObjectRef> {
        let inner = self.inner.lock();
        inner
            .remembered
            .iter()
            .map(|address| ObjectRef::from_address(*address))
            .collect()
    }

    // === Deletion ===

    /// Remove an object and return its contents
    pub fn free(&self, obj: ObjectRef) -> Option<HeapObject> {
        let mut inner = self.inner.lock();
        let object = inner.objects.shift_remove(&obj.address())?;
        let size = object.size();
        inner.space_mut(object.header.zone).release(size);
        inner.remembered.shift_remove(&obj.address());
        Some(object)
    }

    /// Count one native resource release
    pub fn record_cleanup(&self) {
        self.inner.lock().cleanups += 1;
    }

    /// Native resources released so far
    pub fn cleanups(&self) -> u64 {
        self.inner.lock().cleanups
    }

    /// Rewind the young space after a young pass emptied it
    pub fn reset_young(&self) {
        let mut inner = self.inner.lock();
        let remaining = inner
            .objects
            .keys()
            .filter(|address| inner.young.contains(**address))
            .count();
        crate::gc_assert!(
            remaining == 0,
            "young space reset with {} objects left",
            remaining
        );
        inner.young.reset();
    }

    // === Locking ===

    pub fn lock_owner(&self, obj: ObjectRef) -> Option<u64> {
        let inner = self.inner.lock();
        inner
            .get(obj)
            .ok()
            .map(|object| object.header.lock_owner)
            .filter(|owner| *owner != 0)
    }

    pub fn set_lock_owner(&self, obj: ObjectRef, owner: u64) -> Result<()> {
        self.inner.lock().get_mut(obj)?.header.lock_owner = owner;
        Ok(())
    }

    // === Enumeration ===

    /// Every object currently in `zone`
    pub fn objects_in(&self, zone: Zone) -> Vec<ObjectRef> {
        let inner = self.inner.lock();
        inner
            .objects
            .iter()
            .filter(|(_, object)| object.header.zone == zone)
            .map(|(address, _)| ObjectRef::from_address(*address))
            .collect()
    }

    /// Every object currently in memory
    pub fn live_objects(&self) -> Vec<ObjectRef> {
        let inner = self.inner.lock();
        inner
            .objects
            .keys()
            .map(|address| ObjectRef::from_address(*address))
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().objects.len()
    }

    pub fn stats(&self) -> MemoryStats {
        let inner = self.inner.lock();
        MemoryStats {
            young_used: inner.young.used(),
            young_capacity: inner.young.capacity(),
            mature_used: inner.mature.used(),
            mature_capacity: inner.mature.capacity(),
            object_count: inner.objects.len(),
            remembered_count: inner.remembered.len(),
        }
    }
}
