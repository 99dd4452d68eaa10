//! Thread Nexus - Registry of Live VM Threads

use super::ManagedThread;
use crate::error::{GcError, Result};
use crate::memory::Memory;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ThreadNexus {
    threads: RwLock<Vec<Arc<ManagedThread>>>,
    next_id: AtomicU64,
}

impl ThreadNexus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new thread; ids start at 1 so 0 can mean "unlocked"
    pub fn add_thread(&self, name: &str) -> Arc<ManagedThread> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let thread = Arc::new(ManagedThread::new(id, name));
        self.threads.write().push(thread.clone());
        log::debug!("thread {} ({}) registered", id, name);
        thread
    }

    /// Unregister an exiting thread, releasing the locks it still holds
    pub fn remove_thread(&self, id: u64, memory: &Memory) -> Result<Arc<ManagedThread>> {
        let thread = {
            let mut threads = self.threads.write();
            let index = threads
                .iter()
                .position(|thread| thread.id() == id)
                .ok_or(GcError::UnknownThread(id))?;
            threads.remove(index)
        };
        let released = thread.release_locks(memory);
        log::debug!(
            "thread {} ({}) removed, {} locks released",
            id,
            thread.name(),
            released
        );
        Ok(thread)
    }

    pub fn find(&self, id: u64) -> Result<Arc<ManagedThread>> {
        self.threads
            .read()
            .iter()
            .find(|thread| thread.id() == id)
            .cloned()
            .ok_or(GcError::UnknownThread(id))
    }

    /// Snapshot of the registered threads
    pub fn threads(&self) -> Vec<Arc<ManagedThread>> {
        self.threads.read().clone()
    }

    pub fn len(&self) -> usize {
        self.threads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.read().is_empty()
    }
}
