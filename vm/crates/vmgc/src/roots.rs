//! Roots - Globally Reachable Object Slots
//!
//! Roots are starting points for marking. The VM registers a slot for every
//! globally reachable value (globals, the class and module table, interned
//! objects) and the collector rewrites the slot in place when the object
//! it names moves.
//!
//! # Thread Safety
//!
//! `Roots` is thread-safe. Registration and slot updates take the table
//! lock; a collection pass walks the table under the same lock.

use crate::error::{GcError, Result};
use crate::object::ObjectRef;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Root types for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootType {
    /// Global variables
    Global,
    /// Class and module table entries
    Class,
    /// Symbol table, interned strings, singletons
    Internal,
}

impl std::fmt::Display for RootType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootType::Global => write!(f, "Global"),
            RootType::Class => write!(f, "Class"),
            RootType::Internal => write!(f, "Internal"),
        }
    }
}

/// Root descriptor - one registered root slot
#[derive(Debug, Clone)]
pub struct RootDescriptor {
    /// Current slot value
    pub value: ObjectRef,
    /// Root type
    pub root_type: RootType,
    /// Optional name for debugging
    pub name: Option<String>,
    /// Root ID for identification
    pub root_id: usize,
}

/// Identifier returned when registering a root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(usize);

impl RootId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Root statistics
#[derive(Debug, Default, Clone)]
pub struct RootStats {
    pub total_roots: usize,
    pub global_roots: usize,
    pub class_roots: usize,
    pub internal_roots: usize,
    /// Roots currently holding a heap reference
    pub reference_roots: usize,
}

/// The VM's root set
///
/// # Examples
///
/// ```
/// use vmgc::roots::{Roots, RootType};
/// use vmgc::object::ObjectRef;
///
/// let roots = Roots::new();
/// let id = roots.add(ObjectRef::fixnum(1), RootType::Global, Some("$answer"));
/// assert_eq!(roots.get(id).unwrap(), ObjectRef::fixnum(1));
/// roots.remove(id).unwrap();
/// assert!(roots.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Roots {
    slots: RwLock<IndexMap<usize, RootDescriptor>>,
    next_root_id: AtomicUsize,
}

impl Roots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root slot holding `value`
    pub fn add(&self, value: ObjectRef, root_type: RootType, name: Option<&str>) -> RootId {
        let root_id = self.next_root_id.fetch_add(1, Ordering::Relaxed);
        let descriptor = RootDescriptor {
            value,
            root_type,
            name: name.map(|s| s.to_string()),
            root_id,
        };
        self.slots.write().insert(root_id, descriptor);
        RootId(root_id)
    }

    pub fn get(&self, id: RootId) -> Result<ObjectRef> {
        self.slots
            .read()
            .get(&id.0)
            .map(|descriptor| descriptor.value)
            .ok_or_else(|| GcError::Internal(format!("unknown root {}", id.0)))
    }

    pub fn set(&self, id: RootId, value: ObjectRef) -> Result<()> {
        let mut slots = self.slots.write();
        let descriptor = slots
            .get_mut(&id.0)
            .ok_or_else(|| GcError::Internal(format!("unknown root {}", id.0)))?;
        descriptor.value = value;
        Ok(())
    }

    pub fn remove(&self, id: RootId) -> Result<ObjectRef> {
        self.slots
            .write()
            .shift_remove(&id.0)
            .map(|descriptor| descriptor.value)
            .ok_or_else(|| GcError::Internal(format!("unknown root {}", id.0)))
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Visit every root slot, storing back whatever the visitor returns
    pub fn update_each<F>(&self, mut visit: F)
    where
        F: FnMut(&RootDescriptor) -> ObjectRef,
    {
        let mut slots = self.slots.write();
        for descriptor in slots.values_mut() {
            descriptor.value = visit(descriptor);
        }
    }

    /// Snapshot of every root value
    pub fn values(&self) -> Vec<ObjectRef> {
        self.slots.read().values().map(|d| d.value).collect()
    }

    pub fn stats(&self) -> RootStats {
        let slots = self.slots.read();
        let mut stats = RootStats {
            total_roots: slots.len(),
            ..Default::default()
        };
        for descriptor in slots.values() {
            match descriptor.root_type {
                RootType::Global => stats.global_roots += 1,
                RootType::Class => stats.class_roots += 1,
                RootType::Internal => stats.internal_roots += 1,
            }
            if descriptor.value.reference_p() {
                stats.reference_roots += 1;
            }
        }
        stats
    }
}
