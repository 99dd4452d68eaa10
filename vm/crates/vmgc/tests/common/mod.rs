//! Test Utilities for the vmgc Integration Suite
//!
//! `VmFixture` wraps a `SharedState` with small helpers for building object
//! graphs, rooting them and running passes. Assertions fail with the object
//! and the pass that broke it.

#![allow(dead_code)]

use std::sync::Arc;
use vmgc::object::{ObjectRef, ObjectType, Zone};
use vmgc::roots::{RootId, RootType};
use vmgc::thread::ManagedThread;
use vmgc::{CollectionReport, GcConfig, GcGeneration, SharedState};

/// Young space for tests (256KB)
pub const TEST_YOUNG_SIZE: usize = 256 * 1024;

/// Mature space for tests (4MB)
pub const TEST_MATURE_SIZE: usize = 4 * 1024 * 1024;

pub fn test_config() -> GcConfig {
    GcConfig {
        young_space_size: TEST_YOUNG_SIZE,
        mature_space_size: TEST_MATURE_SIZE,
        verify_after_gc: true,
        verbose: false,
        ..Default::default()
    }
}

/// ============================================================================
/// VM FIXTURE
/// ============================================================================

pub struct VmFixture {
    pub state: SharedState,
}

impl VmFixture {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: GcConfig) -> Self {
        let state = SharedState::new(config).expect("test config must be valid");
        Self { state }
    }

    /// Young object of the given type
    pub fn alloc(&self, object_type: ObjectType, slots: Vec<ObjectRef>) -> ObjectRef {
        self.state
            .memory()
            .allocate(object_type, slots)
            .expect("young allocation should succeed")
    }

    /// Young plain object with no slots
    pub fn leaf(&self) -> ObjectRef {
        self.alloc(ObjectType::Object, vec![])
    }

    /// Young tuple holding `slots`
    pub fn tuple(&self, slots: Vec<ObjectRef>) -> ObjectRef {
        self.alloc(ObjectType::Tuple, slots)
    }

    pub fn alloc_mature(&self, object_type: ObjectType, slots: Vec<ObjectRef>) -> ObjectRef {
        self.state
            .memory()
            .allocate_mature(object_type, slots)
            .expect("mature allocation should succeed")
    }

    /// Weak reference object whose referent is `target`
    pub fn weak_ref(&self, target: ObjectRef) -> ObjectRef {
        self.alloc(ObjectType::WeakRef, vec![target])
    }

    pub fn root(&self, obj: ObjectRef) -> RootId {
        self.state.roots().add(obj, RootType::Global, None)
    }

    /// Current value of a root slot
    pub fn root_value(&self, id: RootId) -> ObjectRef {
        self.state.roots().get(id).expect("root should exist")
    }

    pub fn thread(&self, name: &str) -> Arc<ManagedThread> {
        self.state.thread_nexus().add_thread(name)
    }

    pub fn full(&self) -> CollectionReport {
        self.state.collect(GcGeneration::Full)
    }

    pub fn young(&self) -> CollectionReport {
        self.state.collect(GcGeneration::Young)
    }

    pub fn contains(&self, obj: ObjectRef) -> bool {
        self.state.memory().contains(obj)
    }

    pub fn slot(&self, obj: ObjectRef, index: usize) -> ObjectRef {
        self.state
            .memory()
            .slot(obj, index)
            .expect("slot read should succeed")
    }

    pub fn set_slot(&self, obj: ObjectRef, index: usize, value: ObjectRef) {
        self.state
            .memory()
            .set_slot(obj, index, value)
            .expect("slot write should succeed")
    }

    pub fn zone(&self, obj: ObjectRef) -> Option<Zone> {
        self.state.memory().zone_of(obj)
    }

    pub fn object_count(&self) -> usize {
        self.state.memory().object_count()
    }
}

/// ============================================================================
/// ASSERTIONS
/// ============================================================================

pub fn assert_alive(fixture: &VmFixture, obj: ObjectRef, context: &str) {
    assert!(
        fixture.contains(obj),
        "{}: {:?} was deleted but should be alive",
        context,
        obj
    );
}

pub fn assert_deleted(fixture: &VmFixture, obj: ObjectRef, context: &str) {
    assert!(
        !fixture.contains(obj),
        "{}: {:?} survived but should be deleted",
        context,
        obj
    );
}
