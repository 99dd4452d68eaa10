//! GC Data - What One Pass Reads
//!
//! A borrow of the VM structures a pass scans. The lifetime ties the bundle
//! to the pass: it cannot be stored past the `verify` call it was built for.

use crate::capi::{CachedHandles, GlobalHandles, Handles};
use crate::global_cache::GlobalCache;
use crate::roots::Roots;
use crate::thread::ThreadNexus;

#[derive(Clone, Copy)]
pub struct GcData<'a> {
    roots: &'a Roots,
    handles: &'a Handles,
    cached_handles: &'a CachedHandles,
    global_cache: &'a GlobalCache,
    thread_nexus: &'a ThreadNexus,
    global_handle_locations: &'a GlobalHandles,
}

impl<'a> GcData<'a> {
    pub fn new(
        roots: &'a Roots,
        handles: &'a Handles,
        cached_handles: &'a CachedHandles,
        global_cache: &'a GlobalCache,
        thread_nexus: &'a ThreadNexus,
        global_handle_locations: &'a GlobalHandles,
    ) -> Self {
        Self {
            roots,
            handles,
            cached_handles,
            global_cache,
            thread_nexus,
            global_handle_locations,
        }
    }

    pub fn roots(&self) -> &'a Roots {
        self.roots
    }

    pub fn handles(&self) -> &'a Handles {
        self.handles
    }

    pub fn cached_handles(&self) -> &'a CachedHandles {
        self.cached_handles
    }

    pub fn global_cache(&self) -> &'a GlobalCache {
        self.global_cache
    }

    pub fn thread_nexus(&self) -> &'a ThreadNexus {
        self.thread_nexus
    }

    pub fn global_handle_locations(&self) -> &'a GlobalHandles {
        self.global_handle_locations
    }
}
