//! Thread Model - What the Collector Sees of a VM Thread
//!
//! A [`ManagedThread`] exposes everything a pass has to scan for one OS
//! thread:
//!
//! - thread-local roots (the thread object, the pending exception)
//! - the interpreter's [`NativeStack`] of call frames
//! - variable root buffers and root buffers pinned by native code
//! - suspended fibers, each a saved stack copy plus its displacement
//! - the objects the thread currently holds locks on
//!
//! All of it sits behind one mutex. The collector takes it for the duration
//! of a thread scan; the mutator takes it for every frame push and pop.

pub mod frame;
pub mod nexus;
pub mod root_buffers;

pub use frame::{
    CallFrame, NativeStack, StackVariables, FRAME_BLOCK, FRAME_LAMBDA, FRAME_MULTIPLE_SCOPES,
    FRAME_NATIVE,
};
pub use nexus::ThreadNexus;
pub use root_buffers::{RootBuffer, RootBuffers, VariableRootBuffer, VariableRootBuffers};

use crate::error::{GcError, Result};
use crate::gc::AddressDisplacement;
use crate::memory::Memory;
use crate::object::ObjectRef;
use parking_lot::{Mutex, MutexGuard};

/// A fiber whose stack was copied away while it is not running
#[derive(Debug, Clone)]
pub struct SuspendedFiber {
    pub fiber_object: ObjectRef,
    /// Saved copy, keyed by displaced addresses
    pub stack: NativeStack,
    pub variable_root_buffers: VariableRootBuffers,
    /// Maps the fiber's original stack addresses into the saved copy
    pub displacement: AddressDisplacement,
}

impl SuspendedFiber {
    /// Save `stack` through `displacement`
    pub fn suspend(
        fiber_object: ObjectRef,
        stack: &NativeStack,
        variable_root_buffers: VariableRootBuffers,
        displacement: AddressDisplacement,
    ) -> Self {
        Self {
            fiber_object,
            stack: stack.saved_copy(&displacement),
            variable_root_buffers,
            displacement,
        }
    }
}

/// Mutable per-thread state
#[derive(Debug, Default)]
pub struct ThreadState {
    pub thread_object: ObjectRef,
    pub current_exception: ObjectRef,
    pub stack: NativeStack,
    pub variable_root_buffers: VariableRootBuffers,
    pub root_buffers: RootBuffers,
    pub fibers: Vec<SuspendedFiber>,
    pub locked_objects: Vec<ObjectRef>,
}

/// One VM thread registered with the [`ThreadNexus`]
#[derive(Debug)]
pub struct ManagedThread {
    id: u64,
    name: String,
    state: Mutex<ThreadState>,
}

impl ManagedThread {
    pub(crate) fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            state: Mutex::new(ThreadState::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exclusive access to the thread's scannable state
    pub fn state(&self) -> MutexGuard<'_, ThreadState> {
        self.state.lock()
    }

    /// Take the lock on `obj` for this thread
    ///
    /// Re-locking an object this thread already holds is a no-op.
    pub fn lock_object(&self, memory: &Memory, obj: ObjectRef) -> Result<()> {
        match memory.lock_owner(obj) {
            Some(owner) if owner == self.id => return Ok(()),
            Some(owner) => {
                return Err(GcError::Internal(format!(
                    "object {:#x} already locked by thread {}",
                    obj.address(),
                    owner
                )))
            }
            None => {}
        }

        memory.set_lock_owner(obj, self.id)?;
        self.state.lock().locked_objects.push(obj);
        log::trace!("thread {} locked {:?}", self.id, obj);
        Ok(())
    }

    /// Release the lock on `obj`
    pub fn unlock_object(&self, memory: &Memory, obj: ObjectRef) -> Result<()> {
        if memory.lock_owner(obj) != Some(self.id) {
            return Err(GcError::LockNotHeld {
                address: obj.address(),
                thread: self.id,
            });
        }

        memory.set_lock_owner(obj, 0)?;
        self.state.lock().locked_objects.retain(|locked| *locked != obj);
        log::trace!("thread {} unlocked {:?}", self.id, obj);
        Ok(())
    }

    /// Drop every lock this thread still holds
    ///
    /// Called when the thread exits. Returns the number of locks released.
    pub fn release_locks(&self, memory: &Memory) -> usize {
        let locked = std::mem::take(&mut self.state.lock().locked_objects);
        let mut released = 0;
        for obj in locked {
            if memory.lock_owner(obj) == Some(self.id) && memory.set_lock_owner(obj, 0).is_ok() {
                released += 1;
            }
        }
        log::trace!("thread {} released {} locks", self.id, released);
        released
    }

    /// Snapshot of the locked objects list
    pub fn locked_objects(&self) -> Vec<ObjectRef> {
        self.state.lock().locked_objects.clone()
    }
}
